use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

/// One item line in a store-summary email.
#[derive(Debug, Clone)]
pub struct EmailProduct {
    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image_url: Option<String>,
}

/// Everything needed to render one consolidated (user, store) alert.
#[derive(Debug, Clone)]
pub struct StoreSummaryEmail {
    pub to: String,
    pub store_name: String,
    pub store_address: Option<String>,
    pub distance_km: Option<f64>,
    pub fuel_cost: Option<f64>,
    pub fuel_price_per_liter: Option<f64>,
    pub fuel_usage: Option<f64>,
    pub products: Vec<EmailProduct>,
}

#[derive(Debug, Deserialize)]
struct MailApiError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MailApiResponse {
    error: Option<MailApiError>,
}

/// Sends rendered alerts through a Resend-compatible JSON mail API.
pub struct MailerService {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    from: String,
    site_url: String,
}

impl MailerService {
    pub fn new(api_base: String, api_key: Option<String>, from: String, site_url: String) -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            api_base,
            api_key,
            from,
            site_url,
        }
    }

    /// Send one consolidated store alert. Returns true only on a
    /// confirmed accepted send; the caller treats anything else as
    /// "not sent" and leaves the matches pending.
    pub async fn send_store_summary(&self, email: &StoreSummaryEmail) -> bool {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("MAIL_API_KEY missing, cannot send alert email");
            return false;
        };

        let subject = format!(
            "Second-chance deal alert: {} item(s) at {}",
            email.products.len(),
            email.store_name
        );
        let html = render_store_summary_html(email, &self.site_url);

        let body =
            json!({
            "from": self.from,
            "to": [email.to],
            "subject": subject,
            "html": html,
        });

        let response = match
            self.client
                .post(format!("{}/emails", self.api_base))
                .bearer_auth(api_key)
                .json(&body)
                .send().await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(to = %email.to, "mail API request failed: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::error!(to = %email.to, status = %response.status(), "mail API rejected send");
            return false;
        }

        // The API can still report a structured error on a 200.
        match response.json::<MailApiResponse>().await {
            Ok(parsed) => {
                if let Some(error) = parsed.error {
                    tracing::error!(
                        to = %email.to,
                        "mail API error: {}",
                        error.message.unwrap_or_default()
                    );
                    return false;
                }
                true
            }
            Err(_) => true,
        }
    }
}

fn format_currency(value: f64) -> String {
    format!("€{:.2}", value)
}

fn render_store_summary_html(email: &StoreSummaryEmail, site_url: &str) -> String {
    let mut product_blocks = String::new();
    let mut total_price = 0.0;
    let mut total_original = 0.0;
    let mut all_have_original = true;

    for product in &email.products {
        total_price += product.price;
        match product.original_price.filter(|&p| p > 0.0) {
            Some(original) => {
                total_original += original;
            }
            None => {
                all_have_original = false;
            }
        }

        let image = product.image_url
            .as_deref()
            .map(|url|
                format!(
                    r#"<img src="{}" alt="{}" class="product-image">"#,
                    url,
                    html_escape(&product.name)
                )
            )
            .unwrap_or_default();
        let original_line = product.original_price
            .filter(|&p| p > 0.0)
            .map(|p| format!("<p>Original price: <s>{}</s></p>", format_currency(p)))
            .unwrap_or_default();

        product_blocks.push_str(
            &format!(
                r#"<div class="product">{image}<h2>{name}</h2><p class="price">{price}</p>{original_line}</div>"#,
                image = image,
                name = html_escape(&product.name),
                price = format_currency(product.price),
                original_line = original_line
            )
        );
    }

    let address_line = email.store_address
        .as_deref()
        .map(|address| format!("<p><strong>Address:</strong> {}</p>", html_escape(address)))
        .unwrap_or_default();

    let fuel_cost = email.fuel_cost.filter(|&c| c > 0.0);
    let mut breakdown = String::new();
    if all_have_original && total_original > 0.0 {
        breakdown.push_str(
            &format!(
                "<li>Original price: <strong>{}</strong></li>",
                format_currency(total_original)
            )
        );
    }
    breakdown.push_str(
        &format!("<li>Second-chance price: <strong>{}</strong></li>", format_currency(total_price))
    );
    if let Some(cost) = fuel_cost {
        let mut trip_details = Vec::new();
        if let Some(km) = email.distance_km.filter(|&v| v > 0.0) {
            trip_details.push(format!("{:.1} km round trip", km));
        }
        if let Some(usage) = email.fuel_usage.filter(|&v| v > 0.0) {
            trip_details.push(format!("{:.1} L/100km", usage));
        }
        if let Some(per_liter) = email.fuel_price_per_liter.filter(|&v| v > 0.0) {
            trip_details.push(format!("fuel price {:.2} €/L", per_liter));
        }
        let details = if trip_details.is_empty() {
            String::new()
        } else {
            format!(" ({})", trip_details.join(", "))
        };
        breakdown.push_str(
            &format!(
                "<li>Estimated fuel cost: <strong>{}</strong>{}</li>",
                format_currency(cost),
                details
            )
        );

        if all_have_original && total_original > 0.0 {
            let savings = total_original - total_price - cost;
            breakdown.push_str(
                &format!(
                    "<li>Estimated savings after fuel: <strong>{}</strong></li>",
                    format_currency(savings)
                )
            );
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <style>
      body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
      .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
      .header {{ background-color: #0051BA; color: white; padding: 20px; text-align: center; }}
      .content {{ background-color: #f9f9f9; padding: 20px; }}
      .product {{ background-color: white; padding: 20px; margin: 20px 0; border-radius: 8px; }}
      .product-image {{ max-width: 100%; height: auto; margin-bottom: 15px; }}
      .price {{ font-size: 24px; font-weight: bold; color: #0051BA; }}
      .breakdown {{ background-color: #fff7d6; padding: 20px; margin: 20px 0; border-radius: 8px; }}
      .footer {{ text-align: center; padding: 20px; color: #666; font-size: 12px; }}
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header"><h1>Second-chance deal alert!</h1></div>
      <div class="content">
        <p>Products you are watching are now available at <strong>{store_name}</strong>:</p>
        {address_line}
        {product_blocks}
        <div class="breakdown">
          <h3>Price breakdown</h3>
          <ul>{breakdown}</ul>
        </div>
        <p>These are limited one-off items. Visit the store's as-is corner to purchase.</p>
      </div>
      <div class="footer">
        <p>You received this email because you set up a watch for these products.</p>
        <p><a href="{site_url}/manage">Manage your watches</a></p>
      </div>
    </div>
  </body>
</html>"#,
        store_name = html_escape(&email.store_name),
        address_line = address_line,
        product_blocks = product_blocks,
        breakdown = breakdown,
        site_url = site_url
    )
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> StoreSummaryEmail {
        StoreSummaryEmail {
            to: "user@example.com".to_string(),
            store_name: "Amsterdam".to_string(),
            store_address: Some("Hullenbergweg 2, Amsterdam-Zuidoost".to_string()),
            distance_km: Some(24.6),
            fuel_cost: Some(3.2),
            fuel_price_per_liter: Some(2.1),
            fuel_usage: Some(6.5),
            products: vec![
                EmailProduct {
                    name: "BILLY boekenkast".to_string(),
                    price: 49.0,
                    original_price: Some(89.0),
                    image_url: Some("https://img.example/billy.jpg".to_string()),
                },
                EmailProduct {
                    name: "PAX kast".to_string(),
                    price: 120.0,
                    original_price: Some(250.0),
                    image_url: None,
                }
            ],
        }
    }

    #[test]
    fn test_render_lists_every_product() {
        let html = render_store_summary_html(&email(), "https://example.com");

        assert!(html.contains("BILLY boekenkast"));
        assert!(html.contains("PAX kast"));
        assert!(html.contains("€49.00"));
        assert!(html.contains("€120.00"));
        assert!(html.contains("Amsterdam"));
    }

    #[test]
    fn test_render_includes_fuel_section() {
        let html = render_store_summary_html(&email(), "https://example.com");

        assert!(html.contains("Estimated fuel cost"));
        assert!(html.contains("24.6 km round trip"));
        // 89 + 250 - 49 - 120 - 3.2
        assert!(html.contains("€166.80"));
    }

    #[test]
    fn test_render_without_fuel_info() {
        let mut e = email();
        e.distance_km = None;
        e.fuel_cost = None;
        e.fuel_price_per_liter = None;
        e.fuel_usage = None;

        let html = render_store_summary_html(&e, "https://example.com");

        assert!(!html.contains("Estimated fuel cost"));
        assert!(html.contains("Second-chance price"));
    }

    #[test]
    fn test_render_escapes_markup_in_names() {
        let mut e = email();
        e.products[0].name = "BILLY <script>".to_string();

        let html = render_store_summary_html(&e, "https://example.com");

        assert!(html.contains("BILLY &lt;script&gt;"));
        assert!(!html.contains("BILLY <script>"));
    }
}
