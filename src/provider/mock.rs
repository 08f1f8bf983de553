//! In-memory data provider
//!
//! Serves the seed data from [`fixtures`] behind the same trait, envelope
//! and filter semantics as the REST client, so consumers cannot tell which
//! provider is active. Used when no backend is configured.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::fixtures;
use super::models::{
    CargoOwner, FilterSet, FreightBooking, FreightQuote, FreightQuoteParams, HealthStatus,
    MatchesFilters, NewCargoOwner, NewFreightBooking, NewShipment, Page, PageRequest, Port,
    Route, RouteSearchParams, Shipment, ShipmentDetail, ShipmentUpdate, ShippingCompany,
};
use super::{ApiResult, LogisticsApi};
use crate::error::ApiError;

/// Default simulated network latency.
const DEFAULT_LATENCY: Duration = Duration::from_millis(50);

/// In-memory state backing the mock provider.
///
/// Creates append here so list and detail reads observe them, like a real
/// backend would.
struct MockState {
    shipments: Vec<Shipment>,
    routes: Vec<Route>,
    ports: Vec<Port>,
    cargo_owners: Vec<CargoOwner>,
    shipping_companies: Vec<ShippingCompany>,
    freight_bookings: Vec<FreightBooking>,
}

/// Deterministic in-memory implementation of [`LogisticsApi`].
pub struct MockProvider {
    state: Mutex<MockState>,
    latency: Duration,
    next_id: AtomicU64,
    started_at: Instant,
}

impl MockProvider {
    /// Provider pre-seeded with the fixture data set.
    pub fn seeded() -> Self {
        Self {
            state: Mutex::new(MockState {
                shipments: fixtures::shipments(),
                routes: fixtures::routes(),
                ports: fixtures::ports(),
                cargo_owners: fixtures::cargo_owners(),
                shipping_companies: fixtures::shipping_companies(),
                freight_bookings: fixtures::freight_bookings(),
            }),
            latency: DEFAULT_LATENCY,
            next_id: AtomicU64::new(100),
            started_at: Instant::now(),
        }
    }

    /// Override the simulated latency. Zero disables the delay entirely,
    /// which tests rely on.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

fn filtered_page<T: MatchesFilters + Clone>(
    items: &[T],
    filters: &FilterSet,
    page: &PageRequest,
) -> Page<T> {
    let matching: Vec<T> = items
        .iter()
        .filter(|item| item.matches(filters))
        .cloned()
        .collect();
    Page::from_items(matching, page)
}

#[async_trait]
impl LogisticsApi for MockProvider {
    async fn list_shipments(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<Shipment>> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        Ok(filtered_page(&state.shipments, filters, page))
    }

    async fn get_shipment(&self, id: &str) -> ApiResult<ShipmentDetail> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        state
            .shipments
            .iter()
            .find(|s| s.id == id)
            .map(fixtures::shipment_detail)
            .ok_or_else(|| ApiError::not_found(format!("Shipment {}", id)))
    }

    async fn create_shipment(&self, draft: &NewShipment) -> ApiResult<Shipment> {
        self.simulate_latency().await;
        let id = self.next_id();
        let now = Utc::now();
        let shipment = Shipment {
            id: id.to_string(),
            tracking_number: format!("OFLP-2024-{:03}", id),
            status: "Pending".to_string(),
            origin: draft.origin.clone(),
            destination: draft.destination.clone(),
            estimated_arrival: draft.estimated_arrival.clone(),
            cargo_type: draft.cargo_type.clone(),
            weight: draft.weight,
            volume: draft.volume,
            container_type: draft.container_type.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };

        let mut state = self.state.lock().await;
        state.shipments.push(shipment.clone());
        Ok(shipment)
    }

    async fn update_shipment(&self, id: &str, update: &ShipmentUpdate) -> ApiResult<Shipment> {
        self.simulate_latency().await;
        let mut state = self.state.lock().await;
        let shipment = state
            .shipments
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ApiError::not_found(format!("Shipment {}", id)))?;

        if let Some(ref status) = update.status {
            shipment.status = status.clone();
        }
        if let Some(ref destination) = update.destination {
            shipment.destination = destination.clone();
        }
        if let Some(ref eta) = update.estimated_arrival {
            shipment.estimated_arrival = eta.clone();
        }
        if let Some(ref cargo) = update.cargo_type {
            shipment.cargo_type = cargo.clone();
        }
        shipment.updated_at = Some(Utc::now());

        Ok(shipment.clone())
    }

    async fn delete_shipment(&self, id: &str) -> ApiResult<bool> {
        self.simulate_latency().await;
        let mut state = self.state.lock().await;
        let before = state.shipments.len();
        state.shipments.retain(|s| s.id != id);
        Ok(state.shipments.len() < before)
    }

    async fn search_routes(
        &self,
        params: &RouteSearchParams,
        page: &PageRequest,
    ) -> ApiResult<Page<Route>> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        Ok(filtered_page(&state.routes, &params.as_filters(), page))
    }

    async fn get_route(&self, id: &str) -> ApiResult<Route> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        state
            .routes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Route {}", id)))
    }

    async fn list_ports(&self, filters: &FilterSet, page: &PageRequest) -> ApiResult<Page<Port>> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        Ok(filtered_page(&state.ports, filters, page))
    }

    async fn get_port(&self, id: &str) -> ApiResult<Port> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        state
            .ports
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Port {}", id)))
    }

    async fn list_cargo_owners(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<CargoOwner>> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        Ok(filtered_page(&state.cargo_owners, filters, page))
    }

    async fn get_cargo_owner(&self, id: &str) -> ApiResult<CargoOwner> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        state
            .cargo_owners
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Cargo owner {}", id)))
    }

    async fn create_cargo_owner(&self, draft: &NewCargoOwner) -> ApiResult<CargoOwner> {
        self.simulate_latency().await;
        let owner = CargoOwner {
            id: format!("owner-{}", self.next_id()),
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            address: draft.address.clone(),
            company_name: draft.company_name.clone(),
        };

        let mut state = self.state.lock().await;
        state.cargo_owners.push(owner.clone());
        Ok(owner)
    }

    async fn list_shipping_companies(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<ShippingCompany>> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        Ok(filtered_page(&state.shipping_companies, filters, page))
    }

    async fn get_shipping_company(&self, id: &str) -> ApiResult<ShippingCompany> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        state
            .shipping_companies
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Shipping company {}", id)))
    }

    async fn list_freight_bookings(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<FreightBooking>> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        Ok(filtered_page(&state.freight_bookings, filters, page))
    }

    async fn get_freight_booking(&self, id: &str) -> ApiResult<FreightBooking> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        state
            .freight_bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("Freight booking {}", id)))
    }

    async fn create_freight_booking(
        &self,
        draft: &NewFreightBooking,
    ) -> ApiResult<FreightBooking> {
        self.simulate_latency().await;
        let booking = FreightBooking {
            id: format!("booking-{}", self.next_id()),
            cargo_owner_id: draft.cargo_owner_id.clone(),
            shipping_company_id: draft.shipping_company_id.clone(),
            route_id: draft.route_id.clone(),
            status: "Pending".to_string(),
            booking_date: Utc::now().format("%Y-%m-%d").to_string(),
            departure_date: draft.departure_date.clone(),
            arrival_date: draft.arrival_date.clone(),
            total_cost: 0.0,
            currency: "USD".to_string(),
        };

        let mut state = self.state.lock().await;
        state.freight_bookings.push(booking.clone());
        Ok(booking)
    }

    async fn quote_freight(&self, params: &FreightQuoteParams) -> ApiResult<FreightQuote> {
        self.simulate_latency().await;

        // Deterministic flat-rate formula so repeated quotes agree.
        let base = 500.0;
        let weight_cost = params.weight.unwrap_or(0.0) * 0.85;
        let volume_cost = params.volume.unwrap_or(0.0) * 12.0;
        let quote = base + weight_cost + volume_cost;

        let valid_until = Utc::now() + chrono::Duration::days(7);
        Ok(FreightQuote {
            quote,
            currency: "USD".to_string(),
            valid_until: valid_until.format("%Y-%m-%d").to_string(),
        })
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        self.simulate_latency().await;
        Ok(HealthStatus {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            uptime: self.started_at.elapsed().as_secs_f64(),
            environment: "mock".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MockProvider {
        MockProvider::seeded().with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_list_shipments_unfiltered() {
        let mock = provider();
        let page = mock
            .list_shipments(&FilterSet::new(), &PageRequest::new())
            .await
            .unwrap();

        assert_eq!(page.data.len(), 3);
        assert_eq!(page.pagination.total, 3);
    }

    #[tokio::test]
    async fn test_status_filter_is_exact() {
        let mock = provider();
        let page = mock
            .list_shipments(
                &FilterSet::new().with("status", "Delivered"),
                &PageRequest::new(),
            )
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].tracking_number, "OFLP-2024-003");

        // Case-sensitive: lowercase matches nothing
        let page = mock
            .list_shipments(
                &FilterSet::new().with("status", "delivered"),
                &PageRequest::new(),
            )
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_get_shipment_detail() {
        let mock = provider();
        let detail = mock.get_shipment("1").await.unwrap();

        assert_eq!(detail.shipment.tracking_number, "OFLP-2024-001");
        assert_eq!(detail.route.progress, 75);
    }

    #[tokio::test]
    async fn test_get_unknown_shipment_is_404() {
        let mock = provider();
        let err = mock.get_shipment("no-such-id").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_create_shipment_visible_in_list() {
        let mock = provider();
        let created = mock
            .create_shipment(&NewShipment {
                origin: "Busan".to_string(),
                destination: "Oakland".to_string(),
                estimated_arrival: "2024-02-01".to_string(),
                cargo_type: "Machinery".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.status, "Pending");
        assert!(created.tracking_number.starts_with("OFLP-2024-"));

        let page = mock
            .list_shipments(&FilterSet::new(), &PageRequest::new())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 4);
    }

    #[tokio::test]
    async fn test_update_and_delete_shipment() {
        let mock = provider();

        let updated = mock
            .update_shipment(
                "2",
                &ShipmentUpdate {
                    status: Some("Departed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, "Departed");
        assert!(updated.updated_at.is_some());

        assert!(mock.delete_shipment("2").await.unwrap());
        assert!(!mock.delete_shipment("2").await.unwrap());
    }

    #[tokio::test]
    async fn test_search_routes_by_origin() {
        let mock = provider();
        let params = RouteSearchParams {
            origin_port: Some("port-1".to_string()),
            ..Default::default()
        };

        let page = mock.search_routes(&params, &PageRequest::new()).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, "route-1");
    }

    #[tokio::test]
    async fn test_list_ports_by_country() {
        let mock = provider();
        let page = mock
            .list_ports(
                &FilterSet::new().with("country", "United States"),
                &PageRequest::new(),
            )
            .await
            .unwrap();

        assert_eq!(page.data.len(), 2);
    }

    #[tokio::test]
    async fn test_quote_is_deterministic() {
        let mock = provider();
        let params = FreightQuoteParams {
            origin_port_id: "port-1".to_string(),
            destination_port_id: "port-2".to_string(),
            cargo_type: "Electronics".to_string(),
            weight: Some(2000.0),
            volume: Some(40.0),
            ..Default::default()
        };

        let first = mock.quote_freight(&params).await.unwrap();
        let second = mock.quote_freight(&params).await.unwrap();
        assert_eq!(first.quote, second.quote);
        assert_eq!(first.quote, 500.0 + 2000.0 * 0.85 + 40.0 * 12.0);
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let mock = provider();
        let health = mock.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.environment, "mock");
    }

    #[tokio::test]
    async fn test_pagination_envelope() {
        let mock = provider();
        let page = mock
            .list_shipments(&FilterSet::new(), &PageRequest::new().page(1).limit(2))
            .await
            .unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(page.pagination.has_next);
        assert!(!page.pagination.has_prev);
    }
}
