//! Domain models and response envelopes for the OFLP REST surface
//!
//! Field names follow the wire format (camelCase). Collection endpoints
//! always use the same paginated envelope, regardless of which provider
//! produced them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// FILTERS
// ============================================================================

/// A single filter value: scalar or list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    Str(String),
    Int(i64),
    Bool(bool),
    StrList(Vec<String>),
    IntList(Vec<i64>),
}

impl FilterValue {
    /// Wire representation, used for query strings and key serialization.
    pub fn to_param(&self) -> String {
        match self {
            FilterValue::Str(s) => s.clone(),
            FilterValue::Int(n) => n.to_string(),
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::StrList(items) => items.join(","),
            FilterValue::IntList(items) => items
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Str(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Str(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// A mapping of field name to filter value.
///
/// Backed by a `BTreeMap` so iteration order (and therefore key
/// serialization) is deterministic regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSet(BTreeMap<String, FilterValue>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    /// Convert to query string parameters, sorted by field name.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_param()))
            .collect()
    }

    /// Exact match against a record field: the filter passes when the
    /// record value equals the filter's wire representation.
    pub fn field_matches(&self, field: &str, value: &str) -> bool {
        match self.0.get(field) {
            Some(filter) => filter.to_param() == value,
            None => true,
        }
    }
}

// ============================================================================
// PAGINATION
// ============================================================================

/// Default page size for collection endpoints.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Pagination parameters for collection requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.page.is_none() && self.limit.is_none()
    }

    /// Convert to query string parameters.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Pagination metadata included in every collection response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Canonical collection envelope: data plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Page<T> {
    /// Paginate an already-filtered item set.
    ///
    /// Used by the mock provider so its envelope is byte-compatible with
    /// what the real backend is expected to return.
    pub fn from_items(items: Vec<T>, request: &PageRequest) -> Self {
        let page = request.page.unwrap_or(1).max(1);
        let limit = request.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
        let total = items.len() as u32;
        let total_pages = total.div_ceil(limit).max(1);

        let start = (page as usize - 1).saturating_mul(limit as usize);
        let data: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Self {
            data,
            pagination: PageMeta {
                page,
                limit,
                total,
                total_pages,
                has_next: page < total_pages,
                has_prev: page > 1,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Single-item response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            message: None,
            success: true,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// A shipment as returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    pub tracking_number: String,
    pub status: String,
    pub origin: String,
    pub destination: String,
    /// Estimated arrival date (calendar date, not a timestamp).
    pub estimated_arrival: String,
    pub cargo_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Voyage progress for a shipment detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoyageProgress {
    /// Ports along the route, in sailing order.
    pub ports: Vec<String>,
    pub current_port: String,
    /// Progress percentage, 0-100.
    pub progress: u8,
}

/// A dated event in a shipment's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub date: String,
    pub event: String,
    pub location: String,
}

/// Full shipment detail, including voyage progress and event timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDetail {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub route: VoyageProgress,
    pub timeline: Vec<TimelineEvent>,
}

/// Payload for creating a shipment. The backend assigns id, tracking
/// number, initial status and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewShipment {
    pub origin: String,
    pub destination: String,
    pub estimated_arrival: String,
    pub cargo_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
}

/// Partial update for a shipment. Unset fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_arrival: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo_type: Option<String>,
}

/// A shipping lane between two ports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub name: String,
    pub origin_port_id: String,
    pub destination_port_id: String,
    /// Nautical miles.
    pub distance: f64,
    /// Estimated transit time in days.
    pub estimated_duration: u32,
    pub is_active: bool,
}

/// Search parameters for route lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RouteSearchParams {
    pub origin_port: Option<String>,
    pub destination_port: Option<String>,
    pub cargo_type: Option<String>,
    pub departure_date: Option<String>,
}

impl RouteSearchParams {
    /// Convert to a filter set so route searches share the query-key and
    /// query-string conventions of other collections.
    pub fn as_filters(&self) -> FilterSet {
        let mut filters = FilterSet::new();
        if let Some(ref origin) = self.origin_port {
            filters = filters.with("originPort", origin.as_str());
        }
        if let Some(ref destination) = self.destination_port {
            filters = filters.with("destinationPort", destination.as_str());
        }
        if let Some(ref cargo) = self.cargo_type {
            filters = filters.with("cargoType", cargo.as_str());
        }
        if let Some(ref date) = self.departure_date {
            filters = filters.with("departureDate", date.as_str());
        }
        filters
    }
}

/// Geographic coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A seaport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: String,
    pub name: String,
    /// UN/LOCODE-style port code.
    pub code: String,
    pub country: String,
    pub city: String,
    pub coordinates: Coordinates,
}

/// A cargo owner account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CargoOwner {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company_name: String,
}

/// Payload for registering a cargo owner.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewCargoOwner {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company_name: String,
}

/// A shipping company account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingCompany {
    pub id: String,
    pub name: String,
    pub code: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub fleet_size: u32,
}

/// A freight booking between a cargo owner and a shipping company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FreightBooking {
    pub id: String,
    pub cargo_owner_id: String,
    pub shipping_company_id: String,
    pub route_id: String,
    pub status: String,
    pub booking_date: String,
    pub departure_date: String,
    pub arrival_date: String,
    pub total_cost: f64,
    pub currency: String,
}

/// Payload for creating a freight booking.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewFreightBooking {
    pub cargo_owner_id: String,
    pub shipping_company_id: String,
    pub route_id: String,
    pub departure_date: String,
    pub arrival_date: String,
}

/// Parameters for a freight quote request.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FreightQuoteParams {
    pub origin_port_id: String,
    pub destination_port_id: String,
    pub cargo_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
}

/// A freight quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FreightQuote {
    pub quote: f64,
    pub currency: String,
    pub valid_until: String,
}

/// Service health, as reported by `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since service start.
    pub uptime: f64,
    pub environment: String,
}

// ============================================================================
// FILTER MATCHING
// ============================================================================

/// Exact-match filter semantics the backend is expected to apply.
///
/// Implementations check the filter fields they understand and ignore the
/// rest, so mock and real providers stay interchangeable.
pub trait MatchesFilters {
    fn matches(&self, filters: &FilterSet) -> bool;
}

impl MatchesFilters for Shipment {
    fn matches(&self, filters: &FilterSet) -> bool {
        filters.field_matches("status", &self.status)
            && filters.field_matches("cargoType", &self.cargo_type)
            && filters.field_matches("origin", &self.origin)
            && filters.field_matches("destination", &self.destination)
    }
}

impl MatchesFilters for Route {
    fn matches(&self, filters: &FilterSet) -> bool {
        filters.field_matches("originPort", &self.origin_port_id)
            && filters.field_matches("destinationPort", &self.destination_port_id)
            && filters.field_matches("isActive", &self.is_active.to_string())
    }
}

impl MatchesFilters for Port {
    fn matches(&self, filters: &FilterSet) -> bool {
        filters.field_matches("country", &self.country)
            && filters.field_matches("city", &self.city)
            && filters.field_matches("code", &self.code)
    }
}

impl MatchesFilters for CargoOwner {
    fn matches(&self, filters: &FilterSet) -> bool {
        filters.field_matches("companyName", &self.company_name)
            && filters.field_matches("name", &self.name)
    }
}

impl MatchesFilters for ShippingCompany {
    fn matches(&self, filters: &FilterSet) -> bool {
        filters.field_matches("code", &self.code) && filters.field_matches("name", &self.name)
    }
}

impl MatchesFilters for FreightBooking {
    fn matches(&self, filters: &FilterSet) -> bool {
        filters.field_matches("status", &self.status)
            && filters.field_matches("cargoOwnerId", &self.cargo_owner_id)
            && filters.field_matches("shippingCompanyId", &self.shipping_company_id)
            && filters.field_matches("routeId", &self.route_id)
    }
}
