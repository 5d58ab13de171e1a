//! REST API client module for the AlumNet backend.
//!
//! Provides the `ApiClient` request executor and the `ApiError` failure
//! type. Requests are issued against `{base_url}/api{endpoint}` and
//! authenticated with either a standard bearer token or the dev-token
//! header, depending on the identity mode.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{codes, ApiError};
