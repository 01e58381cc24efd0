//! Auth Service client for the opsdeck backend.
//!
//! This module provides the `AuthApi` trait consumed by the session manager
//! and `AuthClient`, its production implementation over HTTP.

pub mod client;
pub mod error;

pub use client::{AuthApi, AuthClient};
pub use error::ApiError;
