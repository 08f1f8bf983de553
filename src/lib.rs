//! OFLP: ocean freight logistics platform client stack
//!
//! The crate is a data layer for logistics views. [`provider`] speaks to a
//! backend (real or mock) behind one trait, [`query`] caches and
//! deduplicates the calls, [`store`] exposes typed operations and
//! selectors on top, and [`server`] is the small API service the REST
//! provider talks to in development.

pub mod config;
pub mod error;
pub mod provider;
pub mod query;
pub mod server;
pub mod store;

pub use config::{ClientConfig, ServerConfig};
pub use error::{ApiError, Error, Result};
pub use provider::{build_provider, LogisticsApi, ProviderKind};
pub use query::{QueryClient, QueryKey};
pub use store::LogisticsStore;
