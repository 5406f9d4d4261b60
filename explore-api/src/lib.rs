// Explore Services HTTP API
//
// Exposes every registered discover source as a GET route under the shared
// plugin prefix, plus the descriptor listing, the inbound webhook relay and
// the medal wall.

pub mod http;

pub use http::{create_router, AppState};
