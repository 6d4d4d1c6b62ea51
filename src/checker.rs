use std::collections::{ HashMap, HashSet };
use std::sync::Arc;

use serde::Serialize;
use tokio::time::{ interval, Duration };
use uuid::Uuid;

use crate::db::entity::{ profile, watch };
use crate::error::Result;
use crate::matching::{ matches_article_number, matches_legacy_name };
use crate::services::catalog_service::{ CatalogItem, CatalogService };
use crate::services::geo_service::{ Coordinates, GeoService };
use crate::services::mailer_service::{ EmailProduct, MailerService, StoreSummaryEmail };
use crate::services::notification_service::{ NotificationService, PlannedNotification };
use crate::services::{ ProfileService, WatchService };
use crate::stores::{ get_store, Store };

const DEFAULT_FUEL_PRICE_PER_LITER: f64 = 2.0;

/// Advisory round-trip cost estimate attached to an alert. Never gates
/// whether the alert is sent.
#[derive(Debug, Clone, Copy)]
pub struct FuelInfo {
    pub fuel_cost: f64,
    pub distance_km: f64,
    pub fuel_price_per_liter: f64,
    pub fuel_usage: f64,
}

pub fn fuel_info_from_distance(
    one_way_km: f64,
    gas_usage: f64,
    fuel_price: Option<f64>
) -> FuelInfo {
    let distance_km = one_way_km * 2.0;
    let liters_used = (distance_km * gas_usage) / 100.0;
    let fuel_price_per_liter = fuel_price
        .filter(|&p| p > 0.0)
        .unwrap_or(DEFAULT_FUEL_PRICE_PER_LITER);

    FuelInfo {
        fuel_cost: liters_used * fuel_price_per_liter,
        distance_km,
        fuel_price_per_liter,
        fuel_usage: gas_usage,
    }
}

/// Estimate the round-trip fuel cost from the user's home to the store.
/// Missing profile, coordinates, or consumption rate yields no estimate.
pub async fn compute_fuel_info(
    geo: &GeoService,
    profile: Option<&profile::Model>,
    store: &Store
) -> Option<FuelInfo> {
    let profile = profile?;
    let lat = profile.address_lat?;
    let lng = profile.address_lng?;
    let gas_usage = profile.gas_usage.filter(|&g| g > 0.0)?;

    let one_way_km = geo.driving_distance_km(Coordinates { lat, lng }, Coordinates {
        lat: store.lat,
        lng: store.lng,
    }).await;

    Some(fuel_info_from_distance(one_way_km, gas_usage, profile.fuel_price))
}

/// One watch evaluated against one catalog snapshot.
#[derive(Debug, Clone)]
pub struct WatchComputation {
    pub watch_id: Uuid,
    pub desired_quantity: usize,
    /// Every item satisfying the watch, in catalog order.
    pub matches: Vec<CatalogItem>,
    /// The subset of `matches` with no ledger record yet.
    pub new_matches: Vec<CatalogItem>,
}

/// The aggregated outcome for one (user, store) group: what to show in
/// the single email and which ledger rows to write after it is sent.
#[derive(Debug, Default)]
pub struct StorePlan {
    pub display_items: Vec<CatalogItem>,
    pub planned_records: Vec<PlannedNotification>,
    pub available_matches: usize,
    pub requirement_met: bool,
}

/// Quantity gate plus aggregation. A watch contributes only when it has
/// at least `desired_quantity` new matches; it then contributes exactly
/// that many, in catalog order. Items are de-duplicated by id for
/// display while one ledger record per (watch, item) is planned.
pub fn build_store_plan(computations: &[WatchComputation]) -> StorePlan {
    let mut plan = StorePlan::default();
    let mut seen_item_ids: HashSet<String> = HashSet::new();

    for computation in computations {
        plan.available_matches += computation.matches.len().min(computation.desired_quantity);

        if computation.new_matches.len() < computation.desired_quantity {
            continue;
        }
        plan.requirement_met = true;

        for item in computation.new_matches.iter().take(computation.desired_quantity) {
            if seen_item_ids.insert(item.id.clone()) {
                plan.display_items.push(item.clone());
            }

            plan.planned_records.push(PlannedNotification {
                watch_id: computation.watch_id,
                item_id: item.id.clone(),
                product_name: item.name.clone(),
                product_price: item.price,
                product_image: item.image_url.clone(),
            });
        }
    }

    plan
}

/// Which items satisfy this watch's criterion, in catalog order. The
/// article-number mode is authoritative; the free-text mode only kicks
/// in for items the primary mode did not match (legacy watches).
pub fn match_watch(watch: &watch::Model, catalog: &[CatalogItem]) -> Vec<CatalogItem> {
    catalog
        .iter()
        .filter(|item| {
            matches_article_number(&watch.article_number, &item.article_numbers) ||
                matches_legacy_name(&watch.article_number, &item.name)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Serialize)]
pub struct GroupResult {
    pub email: String,
    pub store_id: String,
    pub store_name: String,
    pub watches: usize,
    pub products_checked: usize,
    pub available_matches: usize,
    pub new_matches_available: usize,
    pub requirement_met: bool,
    pub notifications_sent: usize,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub total_active_watches: usize,
    pub total_matches: usize,
    pub total_notifications_sent: usize,
    pub processed_groups: usize,
    pub results: Vec<GroupResult>,
}

/// Caches scoped to a single polling pass: one catalog fetch per store,
/// one fuel estimate per (user, store). Discarded when the run ends.
struct RunContext {
    catalogs: HashMap<String, Arc<Vec<CatalogItem>>>,
    fuel_estimates: HashMap<(String, String), Option<FuelInfo>>,
    profiles: HashMap<String, Option<profile::Model>>,
}

impl RunContext {
    fn new() -> Self {
        Self {
            catalogs: HashMap::new(),
            fuel_estimates: HashMap::new(),
            profiles: HashMap::new(),
        }
    }
}

pub struct WatchChecker {
    watch_service: WatchService,
    notification_service: NotificationService,
    profile_service: ProfileService,
    catalog_service: Arc<CatalogService>,
    geo_service: Arc<GeoService>,
    mailer: Arc<MailerService>,
}

impl WatchChecker {
    pub fn new(
        watch_service: WatchService,
        notification_service: NotificationService,
        profile_service: ProfileService,
        catalog_service: Arc<CatalogService>,
        geo_service: Arc<GeoService>,
        mailer: Arc<MailerService>
    ) -> Self {
        Self {
            watch_service,
            notification_service,
            profile_service,
            catalog_service,
            geo_service,
            mailer,
        }
    }

    /// Background loop driving a full pass at a fixed interval.
    pub async fn start(self: Arc<Self>, interval_secs: u64) {
        let mut ticker = interval(Duration::from_secs(interval_secs));

        loop {
            ticker.tick().await;

            match self.run_pass().await {
                Ok(summary) => {
                    tracing::info!(
                        watches = summary.total_active_watches,
                        matches = summary.total_matches,
                        sent = summary.total_notifications_sent,
                        "polling pass completed"
                    );
                }
                Err(e) => {
                    tracing::error!("polling pass failed: {}", e);
                }
            }
        }
    }

    /// Run one full polling pass over every active watch. Idempotent:
    /// safe to invoke repeatedly, the ledger prevents duplicate sends.
    pub async fn run_pass(&self) -> Result<RunSummary> {
        let watches = self.watch_service.get_active_watches().await?;
        Ok(self.process_watches(watches).await)
    }

    /// Run a pass limited to one store's active watches.
    pub async fn run_store_pass(&self, store_id: &str) -> Result<RunSummary> {
        let watches = self.watch_service.get_active_watches_for_store(store_id).await?;
        Ok(self.process_watches(watches).await)
    }

    /// Run a pass limited to one user's watches at one store, for
    /// on-demand checks triggered from the watch API.
    pub async fn run_user_store_pass(&self, email: &str, store_id: &str) -> Result<RunSummary> {
        let watches: Vec<watch::Model> = self.watch_service
            .get_active_watches_for_store(store_id).await?
            .into_iter()
            .filter(|w| w.email == email)
            .collect();
        Ok(self.process_watches(watches).await)
    }

    async fn process_watches(&self, watches: Vec<watch::Model>) -> RunSummary {
        let total_active_watches = watches.len();

        // Group by (email, store); each group gets at most one email.
        let mut groups: HashMap<(String, String), Vec<watch::Model>> = HashMap::new();
        for watch in watches {
            if watch.email.is_empty() {
                continue;
            }
            groups
                .entry((watch.email.clone(), watch.store_id.clone()))
                .or_default()
                .push(watch);
        }

        let mut ctx = RunContext::new();
        let mut summary = RunSummary {
            total_active_watches,
            total_matches: 0,
            total_notifications_sent: 0,
            processed_groups: 0,
            results: Vec::new(),
        };

        for ((email, store_id), group) in groups {
            match self.check_group(&mut ctx, &email, &store_id, &group).await {
                Ok(result) => {
                    summary.total_matches += result.available_matches;
                    summary.total_notifications_sent += result.notifications_sent;
                    summary.processed_groups += 1;
                    summary.results.push(result);
                }
                Err(e) => {
                    tracing::error!(%email, %store_id, "group check failed: {}", e);
                }
            }
        }

        summary
    }

    async fn check_group(
        &self,
        ctx: &mut RunContext,
        email: &str,
        store_id: &str,
        group: &[watch::Model]
    ) -> Result<GroupResult> {
        let store_name = group
            .first()
            .map(|w| w.store_name.clone())
            .unwrap_or_default();

        let catalog = match ctx.catalogs.get(store_id) {
            Some(catalog) => catalog.clone(),
            None => {
                let fetched = Arc::new(self.catalog_service.fetch_store_catalog(store_id).await);
                ctx.catalogs.insert(store_id.to_string(), fetched.clone());
                fetched
            }
        };

        let mut computations = Vec::with_capacity(group.len());
        for watch in group {
            let matches = match_watch(watch, &catalog);

            let mut new_matches = Vec::with_capacity(matches.len());
            for item in &matches {
                if !self.notification_service.already_notified(watch.id, &item.id).await {
                    new_matches.push(item.clone());
                }
            }

            computations.push(WatchComputation {
                watch_id: watch.id,
                desired_quantity: watch.desired_quantity.max(1) as usize,
                matches,
                new_matches,
            });
        }

        let plan = build_store_plan(&computations);

        let mut result = GroupResult {
            email: email.to_string(),
            store_id: store_id.to_string(),
            store_name: store_name.clone(),
            watches: group.len(),
            products_checked: catalog.len(),
            available_matches: plan.available_matches,
            new_matches_available: plan.display_items.len(),
            requirement_met: plan.requirement_met,
            notifications_sent: 0,
        };

        if plan.display_items.is_empty() {
            return Ok(result);
        }

        let store = get_store(store_id);
        let fuel_info = self.fuel_info_for(ctx, email, store_id, store).await;

        let payload = StoreSummaryEmail {
            to: email.to_string(),
            store_name,
            store_address: store.map(|s| s.address.to_string()),
            distance_km: fuel_info.map(|f| f.distance_km),
            fuel_cost: fuel_info.map(|f| f.fuel_cost),
            fuel_price_per_liter: fuel_info.map(|f| f.fuel_price_per_liter),
            fuel_usage: fuel_info.map(|f| f.fuel_usage),
            products: plan.display_items
                .iter()
                .map(|item| EmailProduct {
                    name: item.name.clone(),
                    price: item.price,
                    original_price: item.original_price,
                    image_url: item.image_url.clone(),
                })
                .collect(),
        };

        // Send first, record after: at-least-once by design. A failed
        // send leaves the matches pending for the next pass.
        if !self.mailer.send_store_summary(&payload).await {
            return Ok(result);
        }

        match self.notification_service.record_batch(&plan.planned_records).await {
            Ok(written) => {
                result.notifications_sent = written;
            }
            Err(e) => {
                // The email went out; the missing rows may cause one
                // duplicate alert on a later pass.
                tracing::error!(email, store_id, "ledger write failed after send: {}", e);
            }
        }

        Ok(result)
    }

    async fn fuel_info_for(
        &self,
        ctx: &mut RunContext,
        email: &str,
        store_id: &str,
        store: Option<&'static Store>
    ) -> Option<FuelInfo> {
        let Some(store) = store else {
            return None;
        };

        let key = (email.to_string(), store_id.to_string());
        if let Some(cached) = ctx.fuel_estimates.get(&key) {
            return *cached;
        }

        let profile = match ctx.profiles.get(email) {
            Some(profile) => profile.clone(),
            None => {
                let loaded = match self.profile_service.get_profile_by_email(email).await {
                    Ok(profile) => profile,
                    Err(e) => {
                        tracing::warn!(email, "profile lookup failed: {}", e);
                        None
                    }
                };
                ctx.profiles.insert(email.to_string(), loaded.clone());
                loaded
            }
        };

        let estimate = compute_fuel_info(&self.geo_service, profile.as_ref(), store).await;
        ctx.fuel_estimates.insert(key, estimate);
        estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str, codes: &[&str], name: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            price: 49.0,
            original_price: Some(89.0),
            image_url: None,
            store_id: "088".to_string(),
            article_numbers: codes
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    fn computation(
        desired: usize,
        matches: Vec<CatalogItem>,
        new_matches: Vec<CatalogItem>
    ) -> WatchComputation {
        WatchComputation {
            watch_id: Uuid::new_v4(),
            desired_quantity: desired,
            matches,
            new_matches,
        }
    }

    fn a_watch(criterion: &str) -> watch::Model {
        let now = Utc::now();
        watch::Model {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            store_id: "088".to_string(),
            store_name: "Amsterdam".to_string(),
            article_number: criterion.to_string(),
            desired_quantity: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_single_new_match_triggers_with_default_quantity() {
        let i = item("a", &["50487857"], "BILLY");
        let plan = build_store_plan(&[computation(1, vec![i.clone()], vec![i])]);

        assert!(plan.requirement_met);
        assert_eq!(plan.display_items.len(), 1);
        assert_eq!(plan.planned_records.len(), 1);
    }

    #[test]
    fn test_gate_blocks_below_threshold() {
        let i = item("a", &["50487857"], "BILLY");
        let plan = build_store_plan(&[computation(2, vec![i.clone()], vec![i])]);

        assert!(!plan.requirement_met);
        assert!(plan.display_items.is_empty());
        assert!(plan.planned_records.is_empty());
    }

    #[test]
    fn test_cap_selects_exactly_desired_quantity() {
        let items: Vec<CatalogItem> = ["a", "b", "c"]
            .iter()
            .map(|id| item(id, &["50487857"], "BILLY"))
            .collect();
        let plan = build_store_plan(&[computation(2, items.clone(), items)]);

        assert!(plan.requirement_met);
        assert_eq!(plan.display_items.len(), 2);
        assert_eq!(plan.planned_records.len(), 2);
        // Catalog order preserved; the third item stays eligible.
        assert_eq!(plan.display_items[0].id, "a");
        assert_eq!(plan.display_items[1].id, "b");
    }

    #[test]
    fn test_already_notified_matches_do_not_resend() {
        let i = item("a", &["50487857"], "BILLY");
        let plan = build_store_plan(&[computation(1, vec![i], vec![])]);

        assert!(!plan.requirement_met);
        assert!(plan.planned_records.is_empty());
        // Still counted as an available match for the run summary.
        assert_eq!(plan.available_matches, 1);
    }

    #[test]
    fn test_aggregation_dedupes_display_but_not_ledger() {
        let shared = item("a", &["50487857"], "BILLY");
        let plan = build_store_plan(
            &[
                computation(1, vec![shared.clone()], vec![shared.clone()]),
                computation(1, vec![shared.clone()], vec![shared]),
            ]
        );

        assert_eq!(plan.display_items.len(), 1);
        assert_eq!(plan.planned_records.len(), 2);
        let watch_ids: Vec<Uuid> = plan.planned_records
            .iter()
            .map(|r| r.watch_id)
            .collect();
        assert_ne!(watch_ids[0], watch_ids[1]);
    }

    #[test]
    fn test_mixed_group_only_satisfied_watches_contribute() {
        let a = item("a", &["50487857"], "BILLY");
        let b = item("b", &["11122233"], "PAX");
        let plan = build_store_plan(
            &[
                computation(1, vec![a.clone()], vec![a]),
                computation(3, vec![b.clone()], vec![b]),
            ]
        );

        assert_eq!(plan.display_items.len(), 1);
        assert_eq!(plan.display_items[0].id, "a");
        assert_eq!(plan.planned_records.len(), 1);
    }

    #[test]
    fn test_match_watch_by_article_number() {
        let catalog = vec![
            item("a", &["504.878.57"], "BILLY boekenkast"),
            item("b", &["11122233"], "PAX kast")
        ];

        let matched = match_watch(&a_watch("50487857"), &catalog);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "a");
    }

    #[test]
    fn test_match_watch_legacy_name_fallback() {
        let catalog = vec![
            item("a", &[], "IKEA BILLY boekenkast wit 80x28x202cm"),
            item("b", &[], "BILLY deur")
        ];

        let matched = match_watch(&a_watch("BILLY boekenkast"), &catalog);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "a");
    }

    #[test]
    fn test_fuel_info_arithmetic() {
        // 20 km one way, 40 round trip; 5 L/100km -> 2 L; at €1.90 -> €3.80.
        let info = fuel_info_from_distance(20.0, 5.0, Some(1.9));

        assert!((info.distance_km - 40.0).abs() < 1e-9);
        assert!((info.fuel_cost - 3.8).abs() < 1e-9);
        assert!((info.fuel_price_per_liter - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_fuel_price_falls_back_to_default() {
        let info = fuel_info_from_distance(10.0, 8.0, None);
        assert!((info.fuel_price_per_liter - 2.0).abs() < 1e-9);

        let info = fuel_info_from_distance(10.0, 8.0, Some(-1.0));
        assert!((info.fuel_price_per_liter - 2.0).abs() < 1e-9);
    }
}
