use std::time::Duration;

use serde::{ Deserialize, Serialize };

const PAGE_SIZE: u32 = 100;
// Hard ceiling so a looping or misbehaving feed cannot keep us paginating forever.
const MAX_PAGES: u32 = 20;

/// One as-is inventory offer for one store and one polling cycle.
/// Transient: lives only for the duration of a single pass.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image_url: Option<String>,
    pub store_id: String,
    pub article_numbers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMedia {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiOffer {
    id: Option<i64>,
    #[serde(rename = "offerNumber")]
    offer_number: Option<String>,
    description: Option<String>,
    price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiEntry {
    #[serde(rename = "articleNumbers")]
    article_numbers: Option<Vec<String>>,
    #[serde(rename = "storeId")]
    store_id: Option<String>,
    title: Option<String>,
    #[serde(rename = "heroImage")]
    hero_image: Option<String>,
    media: Option<Vec<ApiMedia>>,
    #[serde(rename = "originalPrice")]
    original_price: Option<f64>,
    #[serde(rename = "minPrice")]
    min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    max_price: Option<f64>,
    offers: Option<Vec<ApiOffer>>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    content: Option<Vec<ApiEntry>>,
    #[serde(rename = "totalPages")]
    total_pages: Option<u32>,
}

pub struct CatalogService {
    client: reqwest::Client,
    api_base: String,
    language: String,
}

impl CatalogService {
    pub fn new(api_base: String, language: String) -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            api_base,
            language,
        }
    }

    /// Fetch the complete current offer list for one store, paginating
    /// until the feed reports no further pages.
    ///
    /// Network-level failures are soft: whatever was accumulated before
    /// the failing page is returned, which is an empty list when the
    /// feed errors immediately.
    pub async fn fetch_store_catalog(&self, store_id: &str) -> Vec<CatalogItem> {
        let mut items = Vec::new();

        for page in 0..MAX_PAGES {
            let url = format!(
                "{}/offers/grouped/search?languageCode={}&size={}&storeIds={}&page={}",
                self.api_base,
                self.language,
                PAGE_SIZE,
                urlencoding::encode(store_id),
                page
            );

            let response = match self.client.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(store_id, page, "catalog fetch failed: {}", e);
                    break;
                }
            };

            if !response.status().is_success() {
                tracing::warn!(
                    store_id,
                    page,
                    status = %response.status(),
                    "catalog feed returned error status"
                );
                break;
            }

            let data: ApiPage = match response.json().await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(store_id, page, "catalog page parse failed: {}", e);
                    break;
                }
            };

            let content = data.content.unwrap_or_default();
            if content.is_empty() {
                break;
            }

            for entry in &content {
                items.extend(expand_entry(entry, store_id, page));
            }

            if let Some(total_pages) = data.total_pages {
                if page + 1 >= total_pages {
                    break;
                }
            }
        }

        items
    }
}

/// Expand one feed entry into per-offer catalog items. An entry with no
/// offers still yields one item from the entry-level fields.
fn expand_entry(entry: &ApiEntry, fallback_store_id: &str, page: u32) -> Vec<CatalogItem> {
    let article_numbers = entry.article_numbers.clone().unwrap_or_default();
    let store_id = entry.store_id
        .clone()
        .unwrap_or_else(|| fallback_store_id.to_string());

    let no_offers = [None];
    let offers: Vec<Option<&ApiOffer>> = match entry.offers.as_deref() {
        Some(offers) if !offers.is_empty() => offers.iter().map(Some).collect(),
        _ => no_offers.to_vec(),
    };

    offers
        .into_iter()
        .enumerate()
        .map(|(index, offer)| {
            let id = synthesize_item_id(offer, &article_numbers, &store_id, page, index);

            let name = entry.title
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| offer.and_then(|o| o.description.clone()))
                .unwrap_or_else(|| "Onbekend product".to_string());

            // Price fallback chain: offer price, then entry min/max/original, then zero.
            let price = offer
                .and_then(|o| o.price)
                .or(entry.min_price)
                .or(entry.max_price)
                .or(entry.original_price)
                .unwrap_or(0.0);

            // Reference price for savings display prefers the entry-level fields.
            let original_price = entry.original_price
                .or(entry.max_price)
                .or(entry.min_price)
                .or(offer.and_then(|o| o.price));

            let image_url = entry.hero_image
                .clone()
                .filter(|u| !u.is_empty())
                .or_else(|| {
                    entry.media
                        .as_ref()
                        .and_then(|media| media.first())
                        .and_then(|m| m.url.clone())
                });

            CatalogItem {
                id,
                name,
                price,
                original_price,
                image_url,
                store_id: store_id.clone(),
                article_numbers: article_numbers.clone(),
            }
        })
        .collect()
}

/// Deterministic item id: offer number, else offer id, else first article
/// number plus offer index, else store+page+index.
fn synthesize_item_id(
    offer: Option<&ApiOffer>,
    article_numbers: &[String],
    store_id: &str,
    page: u32,
    index: usize
) -> String {
    if let Some(offer_number) = offer.and_then(|o| o.offer_number.clone()) {
        return offer_number;
    }
    if let Some(offer_id) = offer.and_then(|o| o.id) {
        return offer_id.to_string();
    }
    if let Some(first) = article_numbers.first() {
        return format!("{}-{}", first, index);
    }
    format!("{}-{}-{}", store_id, page, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ApiEntry {
        ApiEntry {
            article_numbers: Some(vec!["50487857".to_string()]),
            store_id: Some("088".to_string()),
            title: Some("BILLY boekenkast".to_string()),
            hero_image: Some("https://img.example/billy.jpg".to_string()),
            media: None,
            original_price: Some(89.0),
            min_price: Some(49.0),
            max_price: Some(59.0),
            offers: None,
        }
    }

    #[test]
    fn test_entry_without_offers_yields_one_item() {
        let items = expand_entry(&entry(), "088", 0);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "BILLY boekenkast");
        // No offer price, so the entry minimum wins.
        assert_eq!(items[0].price, 49.0);
        assert_eq!(items[0].original_price, Some(89.0));
        assert_eq!(items[0].id, "50487857-0");
    }

    #[test]
    fn test_each_offer_becomes_an_item() {
        let mut e = entry();
        e.offers = Some(vec![
            ApiOffer {
                id: Some(11),
                offer_number: Some("OFF-11".to_string()),
                description: None,
                price: Some(45.0),
            },
            ApiOffer {
                id: Some(12),
                offer_number: None,
                description: None,
                price: Some(39.0),
            }
        ]);

        let items = expand_entry(&e, "088", 0);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "OFF-11");
        assert_eq!(items[0].price, 45.0);
        assert_eq!(items[1].id, "12");
        assert_eq!(items[1].price, 39.0);
        // Offers share the entry's codes and image.
        assert_eq!(items[1].article_numbers, vec!["50487857".to_string()]);
    }

    #[test]
    fn test_price_fallback_chain() {
        let mut e = entry();
        e.min_price = None;

        let items = expand_entry(&e, "088", 0);
        assert_eq!(items[0].price, 59.0);

        e.max_price = None;
        let items = expand_entry(&e, "088", 0);
        assert_eq!(items[0].price, 89.0);

        e.original_price = None;
        let items = expand_entry(&e, "088", 0);
        assert_eq!(items[0].price, 0.0);
        assert_eq!(items[0].original_price, None);
    }

    #[test]
    fn test_original_price_fallback_chain() {
        let mut e = entry();
        e.original_price = None;

        let items = expand_entry(&e, "088", 0);
        assert_eq!(items[0].original_price, Some(59.0));

        e.max_price = None;
        let items = expand_entry(&e, "088", 0);
        assert_eq!(items[0].original_price, Some(49.0));
    }

    #[test]
    fn test_id_synthesis_without_codes() {
        let mut e = entry();
        e.article_numbers = None;
        e.store_id = None;

        let items = expand_entry(&e, "378", 3);
        assert_eq!(items[0].id, "378-3-0");
        assert_eq!(items[0].store_id, "378");
    }

    #[test]
    fn test_offer_description_used_when_title_missing() {
        let mut e = entry();
        e.title = None;
        e.offers = Some(
            vec![ApiOffer {
                id: None,
                offer_number: Some("OFF-1".to_string()),
                description: Some("BILLY kast, licht beschadigd".to_string()),
                price: Some(30.0),
            }]
        );

        let items = expand_entry(&e, "088", 0);
        assert_eq!(items[0].name, "BILLY kast, licht beschadigd");
    }
}
