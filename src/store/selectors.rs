//! View selectors
//!
//! Pure functions that turn cached query results into the shapes views
//! render: list rows with a lane label, voyage summaries, and a
//! loading/empty/error state for a query.

use std::sync::Arc;

use crate::error::ApiError;
use crate::provider::{Page, PageMeta, Shipment, ShipmentDetail};
use crate::query::QueryStatus;

/// What a view should render for a query right now.
#[derive(Debug, Clone)]
pub enum ViewState<T> {
    /// No result yet.
    Loading,
    /// The query succeeded but matched nothing.
    Empty,
    /// A value is available (possibly stale while a refetch runs).
    Ready(T),
    /// The last load failed and there is no earlier value to show.
    Failed(ApiError),
}

impl<T> ViewState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }
}

/// Combine a page query's cached pieces into a view state.
///
/// A stale value beats an error banner: if data exists it is shown even
/// when the latest refetch failed.
pub fn page_view<T>(
    status: Option<QueryStatus>,
    page: Option<Arc<Page<T>>>,
    error: Option<ApiError>,
) -> ViewState<Arc<Page<T>>> {
    match (status, page) {
        (_, Some(page)) if page.data.is_empty() => ViewState::Empty,
        (_, Some(page)) => ViewState::Ready(page),
        (Some(QueryStatus::Error), None) => match error {
            Some(error) => ViewState::Failed(error),
            None => ViewState::Loading,
        },
        _ => ViewState::Loading,
    }
}

/// One row of the shipments table.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentRow {
    pub id: String,
    pub tracking_number: String,
    pub status: String,
    /// "Origin → Destination".
    pub lane: String,
    pub estimated_arrival: String,
    pub cargo_type: String,
}

/// Lane label shown in lists and headers.
pub fn lane_label(origin: &str, destination: &str) -> String {
    format!("{} → {}", origin, destination)
}

/// Project a shipment page into table rows, preserving order.
pub fn shipment_rows(page: &Page<Shipment>) -> Vec<ShipmentRow> {
    page.data
        .iter()
        .map(|shipment| ShipmentRow {
            id: shipment.id.clone(),
            tracking_number: shipment.tracking_number.clone(),
            status: shipment.status.clone(),
            lane: lane_label(&shipment.origin, &shipment.destination),
            estimated_arrival: shipment.estimated_arrival.clone(),
            cargo_type: shipment.cargo_type.clone(),
        })
        .collect()
}

/// Voyage header for the shipment detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct VoyageSummary {
    pub lane: String,
    pub current_port: String,
    /// Port after the current one, absent once the voyage is over.
    pub next_port: Option<String>,
    pub progress: u8,
    pub progress_label: String,
    pub delivered: bool,
}

/// Summarize a shipment detail's voyage.
pub fn voyage_summary(detail: &ShipmentDetail) -> VoyageSummary {
    let route = &detail.route;
    let next_port = route
        .ports
        .iter()
        .position(|port| *port == route.current_port)
        .and_then(|i| route.ports.get(i + 1))
        .cloned();

    VoyageSummary {
        lane: lane_label(&detail.shipment.origin, &detail.shipment.destination),
        current_port: route.current_port.clone(),
        next_port,
        progress: route.progress,
        progress_label: format!("{}% complete", route.progress),
        delivered: detail.shipment.status == "Delivered",
    }
}

/// Pager caption, e.g. "Page 2 of 5 (47 total)".
pub fn page_summary(meta: &PageMeta) -> String {
    format!("Page {} of {} ({} total)", meta.page, meta.total_pages, meta.total)
}
