//! Data providers for the OFLP REST surface
//!
//! The [`LogisticsApi`] trait is the single capability the rest of the crate
//! depends on. Two implementations exist: [`RestClient`] talks to a real
//! backend, [`MockProvider`] serves deterministic seed data. Which one is
//! active is decided once at startup and injected; consumer code never
//! branches on it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::ApiError;

pub mod fixtures;
pub mod mock;
pub mod models;
pub mod rest;

pub use mock::MockProvider;
pub use models::{
    CargoOwner, Envelope, FilterSet, FilterValue, FreightBooking, FreightQuote,
    FreightQuoteParams, HealthStatus, MatchesFilters, NewCargoOwner, NewFreightBooking,
    NewShipment, Page, PageMeta, PageRequest, Port, Route, RouteSearchParams, Shipment,
    ShipmentDetail, ShipmentUpdate, ShippingCompany,
};
pub use rest::RestClient;

/// Result type for provider operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The OFLP data provider capability.
///
/// Collection operations take a [`FilterSet`] (exact-match on provided
/// fields) plus pagination, and always return the canonical [`Page`]
/// envelope. Detail operations return the unwrapped resource.
#[async_trait]
pub trait LogisticsApi: Send + Sync {
    // Shipments
    async fn list_shipments(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<Shipment>>;

    async fn get_shipment(&self, id: &str) -> ApiResult<ShipmentDetail>;

    async fn create_shipment(&self, draft: &NewShipment) -> ApiResult<Shipment>;

    async fn update_shipment(&self, id: &str, update: &ShipmentUpdate) -> ApiResult<Shipment>;

    /// Returns `true` when the shipment existed and was deleted.
    async fn delete_shipment(&self, id: &str) -> ApiResult<bool>;

    // Routes
    async fn search_routes(
        &self,
        params: &RouteSearchParams,
        page: &PageRequest,
    ) -> ApiResult<Page<Route>>;

    async fn get_route(&self, id: &str) -> ApiResult<Route>;

    // Ports
    async fn list_ports(&self, filters: &FilterSet, page: &PageRequest) -> ApiResult<Page<Port>>;

    async fn get_port(&self, id: &str) -> ApiResult<Port>;

    // Cargo owners
    async fn list_cargo_owners(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<CargoOwner>>;

    async fn get_cargo_owner(&self, id: &str) -> ApiResult<CargoOwner>;

    async fn create_cargo_owner(&self, draft: &NewCargoOwner) -> ApiResult<CargoOwner>;

    // Shipping companies
    async fn list_shipping_companies(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<ShippingCompany>>;

    async fn get_shipping_company(&self, id: &str) -> ApiResult<ShippingCompany>;

    // Freight bookings
    async fn list_freight_bookings(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<FreightBooking>>;

    async fn get_freight_booking(&self, id: &str) -> ApiResult<FreightBooking>;

    async fn create_freight_booking(&self, draft: &NewFreightBooking)
        -> ApiResult<FreightBooking>;

    async fn quote_freight(&self, params: &FreightQuoteParams) -> ApiResult<FreightQuote>;

    // Health
    async fn health(&self) -> ApiResult<HealthStatus>;
}

/// Which provider backs the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Real REST backend.
    Rest,
    /// Deterministic in-memory data, for development without a backend.
    Mock,
}

/// Build the active provider.
///
/// Selection happens here, once; everything downstream holds the trait
/// object and stays agnostic.
pub fn build_provider(
    kind: ProviderKind,
    config: &ClientConfig,
) -> crate::error::Result<Arc<dyn LogisticsApi>> {
    match kind {
        ProviderKind::Rest => Ok(Arc::new(RestClient::new(config.clone())?)),
        ProviderKind::Mock => Ok(Arc::new(MockProvider::seeded())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rest_provider() {
        let provider = build_provider(ProviderKind::Rest, &ClientConfig::default());
        assert!(provider.is_ok());
    }

    #[test]
    fn test_build_mock_provider() {
        let provider = build_provider(ProviderKind::Mock, &ClientConfig::default());
        assert!(provider.is_ok());
    }
}
