//! Control plane API interaction module
//!
//! This module provides the typed client for the LiteLLM control plane:
//! authenticated transport, wire records, and the per-entity CRUD gateways.
//!
//! # Module Structure
//!
//! - [`client`] - Main client holding the provider configuration
//! - [`http`] - HTTP transport and error classification
//! - [`gateway`] - Model and Key CRUD façades
//! - [`types`] - Wire records
//!
//! # Example
//!
//! ```ignore
//! use llmctl::api::ApiClient;
//! use llmctl::config::ProviderConfig;
//!
//! async fn example() -> llmctl::Result<()> {
//!     let client = ApiClient::new(ProviderConfig::new("sk-admin", "http://localhost:4000")?)?;
//!     let model = client.models().get("gpt-test").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod gateway;
pub mod http;
pub mod types;

pub use client::ApiClient;
pub use gateway::{Entity, Gateway, KeyGateway, ModelGateway};
pub use types::{Key, Model, ModelProvider};
