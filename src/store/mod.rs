//! Application-facing data store
//!
//! [`LogisticsStore`] pairs the active [`LogisticsApi`] provider with a
//! [`QueryClient`], giving consumers typed read operations that go through
//! the cache and typed mutations that invalidate the right key prefixes.
//! Consumers never build query keys or loaders by hand.

use std::sync::Arc;

use crate::provider::{
    ApiResult, CargoOwner, FilterSet, FreightBooking, FreightQuote, FreightQuoteParams,
    HealthStatus, LogisticsApi, NewCargoOwner, NewFreightBooking, NewShipment, Page, PageRequest,
    Port, Route, RouteSearchParams, Shipment, ShipmentDetail, ShipmentUpdate, ShippingCompany,
};
use crate::query::{
    keys, FetchOptions, Freshness, QueryClient, QueryConfig, QueryKey, QuerySubscription,
};

pub mod selectors;

pub use selectors::{
    page_summary, shipment_rows, voyage_summary, ShipmentRow, ViewState, VoyageSummary,
};

/// Key-space domains, one per resource.
mod domain {
    pub const SHIPMENTS: &str = "shipments";
    pub const ROUTES: &str = "routes";
    pub const PORTS: &str = "ports";
    pub const CARGO_OWNERS: &str = "cargo-owners";
    pub const SHIPPING_COMPANIES: &str = "shipping-companies";
    pub const FREIGHT_BOOKINGS: &str = "freight-bookings";
    pub const HEALTH: &str = "health";
}

/// Cached, typed access to the logistics data.
#[derive(Clone)]
pub struct LogisticsStore {
    api: Arc<dyn LogisticsApi>,
    queries: QueryClient,
}

impl LogisticsStore {
    pub fn new(api: Arc<dyn LogisticsApi>) -> Self {
        Self {
            api,
            queries: QueryClient::new(QueryConfig {
                retain_for: Freshness::RETAIN,
                ..QueryConfig::default()
            }),
        }
    }

    /// Same store over a caller-supplied query client, for tests that
    /// need custom freshness or retry defaults.
    pub fn with_queries(api: Arc<dyn LogisticsApi>, queries: QueryClient) -> Self {
        Self { api, queries }
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    // ----- shipments -----

    pub async fn shipments(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Arc<Page<Shipment>>> {
        let key = keys::list(domain::SHIPMENTS, filters, page);
        let api = self.api.clone();
        let filters = filters.clone();
        let page = page.clone();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let filters = filters.clone();
                    let page = page.clone();
                    async move { api.list_shipments(&filters, &page).await }
                },
                FetchOptions::new().fresh_for(Freshness::LIST),
            )
            .await
    }

    pub async fn shipment(&self, id: &str) -> ApiResult<Arc<ShipmentDetail>> {
        let key = keys::detail(domain::SHIPMENTS, id);
        let api = self.api.clone();
        let id = id.to_string();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let id = id.clone();
                    async move { api.get_shipment(&id).await }
                },
                FetchOptions::new().fresh_for(Freshness::DETAIL),
            )
            .await
    }

    pub async fn create_shipment(&self, draft: &NewShipment) -> ApiResult<Shipment> {
        let created = self.api.create_shipment(draft).await?;
        self.queries.invalidate(&keys::lists(domain::SHIPMENTS));
        Ok(created)
    }

    pub async fn update_shipment(
        &self,
        id: &str,
        update: &ShipmentUpdate,
    ) -> ApiResult<Shipment> {
        let updated = self.api.update_shipment(id, update).await?;
        self.queries.invalidate(&keys::lists(domain::SHIPMENTS));
        self.queries.invalidate(&keys::detail(domain::SHIPMENTS, id));
        Ok(updated)
    }

    pub async fn delete_shipment(&self, id: &str) -> ApiResult<bool> {
        let deleted = self.api.delete_shipment(id).await?;
        if deleted {
            self.queries.invalidate(&keys::all(domain::SHIPMENTS));
        }
        Ok(deleted)
    }

    // ----- routes -----

    pub async fn search_routes(
        &self,
        params: &RouteSearchParams,
        page: &PageRequest,
    ) -> ApiResult<Arc<Page<Route>>> {
        let key = keys::list(domain::ROUTES, &params.as_filters(), page);
        let api = self.api.clone();
        let params = params.clone();
        let page = page.clone();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let params = params.clone();
                    let page = page.clone();
                    async move { api.search_routes(&params, &page).await }
                },
                FetchOptions::new().fresh_for(Freshness::REFERENCE),
            )
            .await
    }

    pub async fn route(&self, id: &str) -> ApiResult<Arc<Route>> {
        let key = keys::detail(domain::ROUTES, id);
        let api = self.api.clone();
        let id = id.to_string();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let id = id.clone();
                    async move { api.get_route(&id).await }
                },
                FetchOptions::new().fresh_for(Freshness::REFERENCE),
            )
            .await
    }

    // ----- ports -----

    pub async fn ports(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Arc<Page<Port>>> {
        let key = keys::list(domain::PORTS, filters, page);
        let api = self.api.clone();
        let filters = filters.clone();
        let page = page.clone();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let filters = filters.clone();
                    let page = page.clone();
                    async move { api.list_ports(&filters, &page).await }
                },
                FetchOptions::new().fresh_for(Freshness::REFERENCE),
            )
            .await
    }

    pub async fn port(&self, id: &str) -> ApiResult<Arc<Port>> {
        let key = keys::detail(domain::PORTS, id);
        let api = self.api.clone();
        let id = id.to_string();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let id = id.clone();
                    async move { api.get_port(&id).await }
                },
                FetchOptions::new().fresh_for(Freshness::REFERENCE),
            )
            .await
    }

    // ----- cargo owners -----

    pub async fn cargo_owners(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Arc<Page<CargoOwner>>> {
        let key = keys::list(domain::CARGO_OWNERS, filters, page);
        let api = self.api.clone();
        let filters = filters.clone();
        let page = page.clone();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let filters = filters.clone();
                    let page = page.clone();
                    async move { api.list_cargo_owners(&filters, &page).await }
                },
                FetchOptions::new().fresh_for(Freshness::LIST),
            )
            .await
    }

    pub async fn cargo_owner(&self, id: &str) -> ApiResult<Arc<CargoOwner>> {
        let key = keys::detail(domain::CARGO_OWNERS, id);
        let api = self.api.clone();
        let id = id.to_string();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let id = id.clone();
                    async move { api.get_cargo_owner(&id).await }
                },
                FetchOptions::new().fresh_for(Freshness::DETAIL),
            )
            .await
    }

    pub async fn create_cargo_owner(&self, draft: &NewCargoOwner) -> ApiResult<CargoOwner> {
        let created = self.api.create_cargo_owner(draft).await?;
        self.queries.invalidate(&keys::lists(domain::CARGO_OWNERS));
        Ok(created)
    }

    // ----- shipping companies -----

    pub async fn shipping_companies(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Arc<Page<ShippingCompany>>> {
        let key = keys::list(domain::SHIPPING_COMPANIES, filters, page);
        let api = self.api.clone();
        let filters = filters.clone();
        let page = page.clone();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let filters = filters.clone();
                    let page = page.clone();
                    async move { api.list_shipping_companies(&filters, &page).await }
                },
                FetchOptions::new().fresh_for(Freshness::REFERENCE),
            )
            .await
    }

    pub async fn shipping_company(&self, id: &str) -> ApiResult<Arc<ShippingCompany>> {
        let key = keys::detail(domain::SHIPPING_COMPANIES, id);
        let api = self.api.clone();
        let id = id.to_string();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let id = id.clone();
                    async move { api.get_shipping_company(&id).await }
                },
                FetchOptions::new().fresh_for(Freshness::REFERENCE),
            )
            .await
    }

    // ----- freight bookings -----

    pub async fn freight_bookings(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Arc<Page<FreightBooking>>> {
        let key = keys::list(domain::FREIGHT_BOOKINGS, filters, page);
        let api = self.api.clone();
        let filters = filters.clone();
        let page = page.clone();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let filters = filters.clone();
                    let page = page.clone();
                    async move { api.list_freight_bookings(&filters, &page).await }
                },
                FetchOptions::new().fresh_for(Freshness::LIST),
            )
            .await
    }

    pub async fn freight_booking(&self, id: &str) -> ApiResult<Arc<FreightBooking>> {
        let key = keys::detail(domain::FREIGHT_BOOKINGS, id);
        let api = self.api.clone();
        let id = id.to_string();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    let id = id.clone();
                    async move { api.get_freight_booking(&id).await }
                },
                FetchOptions::new().fresh_for(Freshness::DETAIL),
            )
            .await
    }

    pub async fn create_freight_booking(
        &self,
        draft: &NewFreightBooking,
    ) -> ApiResult<FreightBooking> {
        let created = self.api.create_freight_booking(draft).await?;
        self.queries.invalidate(&keys::lists(domain::FREIGHT_BOOKINGS));
        Ok(created)
    }

    /// Quotes are priced per request and never cached.
    pub async fn quote_freight(&self, params: &FreightQuoteParams) -> ApiResult<FreightQuote> {
        self.api.quote_freight(params).await
    }

    // ----- health -----

    pub async fn health(&self) -> ApiResult<Arc<HealthStatus>> {
        let key = keys::all(domain::HEALTH);
        let api = self.api.clone();
        self.queries
            .fetch(
                key,
                move || {
                    let api = api.clone();
                    async move { api.health().await }
                },
                FetchOptions::new().fresh_for(Freshness::HEALTH),
            )
            .await
    }

    // ----- subscriptions -----

    /// Watch everything under a key prefix.
    pub fn watch(&self, key: &QueryKey) -> QuerySubscription {
        self.queries.subscribe(key)
    }

    /// Watch every shipment list query.
    pub fn watch_shipments(&self) -> QuerySubscription {
        self.queries.subscribe(&keys::lists(domain::SHIPMENTS))
    }

    /// Watch one shipment's detail.
    pub fn watch_shipment(&self, id: &str) -> QuerySubscription {
        self.queries.subscribe(&keys::detail(domain::SHIPMENTS, id))
    }

    /// Current view state of a shipment list query, without fetching.
    pub fn shipments_view(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ViewState<Arc<Page<Shipment>>> {
        let key = keys::list(domain::SHIPMENTS, filters, page);
        selectors::page_view(
            self.queries.status(&key),
            self.queries.get::<Page<Shipment>>(&key),
            self.queries.error(&key),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;
    use crate::query::QueryStatus;

    fn store() -> LogisticsStore {
        LogisticsStore::new(Arc::new(MockProvider::seeded().with_latency(
            std::time::Duration::ZERO,
        )))
    }

    #[tokio::test]
    async fn test_shipment_list_round_trip() {
        let store = store();
        let page = store
            .shipments(&FilterSet::new(), &PageRequest::new())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.pagination.total, 3);
    }

    #[tokio::test]
    async fn test_create_invalidates_list() {
        let store = store();
        let before = store
            .shipments(&FilterSet::new(), &PageRequest::new())
            .await
            .unwrap();
        assert_eq!(before.data.len(), 3);

        store
            .create_shipment(&NewShipment {
                origin: "Oakland".to_string(),
                destination: "Busan".to_string(),
                estimated_arrival: "2024-02-01".to_string(),
                cargo_type: "Machinery".to_string(),
                weight: None,
                volume: None,
                container_type: None,
            })
            .await
            .unwrap();

        // The list was invalidated, so this refetches and sees the insert.
        let after = store
            .shipments(&FilterSet::new(), &PageRequest::new())
            .await
            .unwrap();
        assert_eq!(after.data.len(), 4);
    }

    #[tokio::test]
    async fn test_detail_survives_unrelated_invalidation() {
        let store = store();
        let detail = store.shipment("1").await.unwrap();
        assert_eq!(detail.shipment.tracking_number, "OFLP-2024-001");

        store
            .create_cargo_owner(&NewCargoOwner {
                name: "New Owner".to_string(),
                email: "owner@example.test".to_string(),
                phone: "+1-555-0100".to_string(),
                address: "1 Pier Rd".to_string(),
                company_name: "Owner Co".to_string(),
            })
            .await
            .unwrap();

        let key = keys::detail("shipments", "1");
        assert_eq!(store.queries().status(&key), Some(QueryStatus::Success));
    }

    #[tokio::test]
    async fn test_view_state_progression() {
        let store = store();
        let filters = FilterSet::new();
        let page = PageRequest::new();

        assert!(matches!(
            store.shipments_view(&filters, &page),
            ViewState::Loading
        ));

        store.shipments(&filters, &page).await.unwrap();
        assert!(matches!(
            store.shipments_view(&filters, &page),
            ViewState::Ready(_)
        ));

        let none = FilterSet::new().with("status", "Lost At Sea");
        store.shipments(&none, &page).await.unwrap();
        assert!(matches!(store.shipments_view(&none, &page), ViewState::Empty));
    }

    #[tokio::test]
    async fn test_quote_is_not_cached() {
        let store = store();
        let params = FreightQuoteParams {
            origin_port_id: "port-1".to_string(),
            destination_port_id: "port-2".to_string(),
            cargo_type: "Electronics".to_string(),
            weight: Some(1000.0),
            volume: Some(20.0),
            container_type: None,
        };
        let quote = store.quote_freight(&params).await.unwrap();
        assert!(quote.quote > 0.0);
        assert_eq!(store.queries().entry_count(), 0);
    }
}
