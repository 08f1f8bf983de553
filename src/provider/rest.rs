//! REST transport client for the OFLP backend
//!
//! Wraps every outbound call with the fixed base address and timeout,
//! attaches tracing headers and the bearer credential, and normalizes all
//! failures into [`ApiError`]. Callers never see a raw transport error.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{
    CargoOwner, Envelope, FilterSet, FreightBooking, FreightQuote, FreightQuoteParams,
    HealthStatus, NewCargoOwner, NewFreightBooking, NewShipment, Page, PageRequest, Port, Route,
    RouteSearchParams, Shipment, ShipmentDetail, ShipmentUpdate, ShippingCompany,
};
use super::{ApiResult, LogisticsApi};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

use async_trait::async_trait;

/// Error body the backend attaches to non-2xx responses, when it does.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<serde_json::Value>,
}

/// Body of a delete response.
#[derive(Debug, Deserialize)]
struct DeleteResult {
    deleted: bool,
}

/// REST implementation of [`LogisticsApi`].
pub struct RestClient {
    http: HttpClient,
    base_url: String,
    auth_token: Option<String>,
}

impl RestClient {
    /// Create a new client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ApiError::request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            auth_token: config.auth_token,
        })
    }

    /// Fresh correlation identifier, one per request.
    fn correlation_id() -> String {
        let fragment = Uuid::new_v4().simple().to_string();
        format!("oflp-{}-{}", Utc::now().timestamp_millis(), &fragment[..9])
    }

    /// Build a request with the tracing headers and credential attached.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, &url)
            .header("X-Request-Time", Utc::now().to_rfc3339())
            .header("X-Correlation-ID", Self::correlation_id());

        if let Some(ref token) = self.auth_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }

    /// Dispatch a request and decode the response, normalizing failures.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::request(format!("Failed to parse response: {}", e)));
        }

        // Non-2xx: carry the server-supplied message when the body parses.
        let text = response.text().await.unwrap_or_default();
        let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
        let message = body
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| default_status_message(status));

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
            code: body.as_ref().and_then(|b| b.code.clone()),
            details: body.and_then(|b| b.details),
            timestamp: Utc::now(),
        })
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<T>> {
        let mut params = filters.to_query_params();
        params.extend(page.to_query_params());
        self.send(self.request(Method::GET, path).query(&params)).await
    }

    /// Fetch a single resource and unwrap the item envelope.
    async fn get_item<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let envelope: Envelope<T> = self.send(self.request(Method::GET, path)).await?;
        Ok(envelope.data)
    }

    async fn post_item<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let envelope: Envelope<T> =
            self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(envelope.data)
    }

    async fn put_item<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let envelope: Envelope<T> =
            self.send(self.request(Method::PUT, path).json(body)).await?;
        Ok(envelope.data)
    }
}

fn default_status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {} Error", status.as_u16()),
    }
}

#[async_trait]
impl LogisticsApi for RestClient {
    async fn list_shipments(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<Shipment>> {
        self.get_page("/shipments", filters, page).await
    }

    async fn get_shipment(&self, id: &str) -> ApiResult<ShipmentDetail> {
        self.get_item(&format!("/shipments/{}", id)).await
    }

    async fn create_shipment(&self, draft: &NewShipment) -> ApiResult<Shipment> {
        self.post_item("/shipments", draft).await
    }

    async fn update_shipment(&self, id: &str, update: &ShipmentUpdate) -> ApiResult<Shipment> {
        self.put_item(&format!("/shipments/{}", id), update).await
    }

    async fn delete_shipment(&self, id: &str) -> ApiResult<bool> {
        let envelope: Envelope<DeleteResult> = self
            .send(self.request(Method::DELETE, &format!("/shipments/{}", id)))
            .await?;
        Ok(envelope.data.deleted)
    }

    async fn search_routes(
        &self,
        params: &RouteSearchParams,
        page: &PageRequest,
    ) -> ApiResult<Page<Route>> {
        self.get_page("/routes/search", &params.as_filters(), page).await
    }

    async fn get_route(&self, id: &str) -> ApiResult<Route> {
        self.get_item(&format!("/routes/{}", id)).await
    }

    async fn list_ports(&self, filters: &FilterSet, page: &PageRequest) -> ApiResult<Page<Port>> {
        self.get_page("/ports", filters, page).await
    }

    async fn get_port(&self, id: &str) -> ApiResult<Port> {
        self.get_item(&format!("/ports/{}", id)).await
    }

    async fn list_cargo_owners(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<CargoOwner>> {
        self.get_page("/cargo-owners", filters, page).await
    }

    async fn get_cargo_owner(&self, id: &str) -> ApiResult<CargoOwner> {
        self.get_item(&format!("/cargo-owners/{}", id)).await
    }

    async fn create_cargo_owner(&self, draft: &NewCargoOwner) -> ApiResult<CargoOwner> {
        self.post_item("/cargo-owners", draft).await
    }

    async fn list_shipping_companies(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<ShippingCompany>> {
        self.get_page("/shipping-companies", filters, page).await
    }

    async fn get_shipping_company(&self, id: &str) -> ApiResult<ShippingCompany> {
        self.get_item(&format!("/shipping-companies/{}", id)).await
    }

    async fn list_freight_bookings(
        &self,
        filters: &FilterSet,
        page: &PageRequest,
    ) -> ApiResult<Page<FreightBooking>> {
        self.get_page("/freight-bookings", filters, page).await
    }

    async fn get_freight_booking(&self, id: &str) -> ApiResult<FreightBooking> {
        self.get_item(&format!("/freight-bookings/{}", id)).await
    }

    async fn create_freight_booking(
        &self,
        draft: &NewFreightBooking,
    ) -> ApiResult<FreightBooking> {
        self.post_item("/freight-bookings", draft).await
    }

    async fn quote_freight(&self, params: &FreightQuoteParams) -> ApiResult<FreightQuote> {
        self.post_item("/freight-bookings/quote", params).await
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        // The health endpoint returns its body bare, without the item envelope.
        self.send(self.request(Method::GET, "/health")).await
    }
}
