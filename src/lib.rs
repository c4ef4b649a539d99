// Library root
// -----------
// The binary (`main.rs`) is a thin shell around these modules.
//
// Module responsibilities:
// - `api`: builds the authenticated search request, classifies the
//   response and returns typed results or a typed `SearchError`.
// - `models`: the JSON shapes returned by the search endpoint.
// - `rate_limit`: rate-limit header extraction and reset-time formatting.
// - `config`: reads the API key and endpoint from the environment / `.env`.
// - `ui`: prompts, spinner and coloured output.
//
// Only `config` and `ui` touch the environment or the terminal, so the
// client can be exercised in tests with fabricated keys and transports.
pub mod api;
pub mod config;
pub mod models;
pub mod rate_limit;
pub mod ui;

pub use api::{ApiClient, CancelToken, SearchError, SearchRequest};
pub use models::{Photo, PhotoSources, SearchResult};
pub use rate_limit::{format_reset_time, RateLimitInfo};
