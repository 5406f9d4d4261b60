// Explore Services Core
//
// Shared building blocks for every discover adapter:
// - models: MediaInfo records and the DiscoverMediaSource descriptor
// - source: the DiscoverSource contract and the SourceRegistry
// - http / cache: the outbound Fetcher and the TTL response cache
// - ui: filter-UI tree builders rendered by the host

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod source;
pub mod ui;

pub use cache::{CacheKey, ResponseCache};
pub use config::Config;
pub use error::{Error, FetchError, Result};
pub use http::{Fetcher, ParamMap};
pub use models::{DiscoverMediaSource, MediaInfo, MediaType, PageParams};
pub use source::{resolve_filters, DiscoverSource, RouteSpec, SourceRegistry};
