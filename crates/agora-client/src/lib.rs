//! Client library for the Agora JSON API.

pub mod client;

pub use client::{ApiClient, ApiConfig, ClientError};
