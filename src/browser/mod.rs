//! Browser Driver interface and its HTTP implementation
//!
//! The crawler only ever talks to the `BrowserDriver` trait. `HttpDriver`
//! implements it over `reqwest`, treating every page as the static document
//! the server delivered.

mod driver;
mod http;

pub use driver::{
    BrowserDriver, DriverError, Locator, NavigationResponse, Visibility, WaitCondition,
};
pub use http::{build_http_client, HttpDriver, HISTORY_DEPTH};
