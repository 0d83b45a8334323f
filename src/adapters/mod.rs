//! Concrete implementations of the trait abstractions in `crate::traits`.
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`mock::MockHttpClient`] - test double with canned responses

pub mod mock;
pub mod reqwest_http;

pub use mock::MockHttpClient;
pub use reqwest_http::ReqwestHttpClient;
