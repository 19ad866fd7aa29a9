//! llmctl - reconcile declared LiteLLM models and API keys against the
//! control plane.
//!
//! - [`api`] - typed client: transport, wire records, entity gateways
//! - [`validation`] - pure field validators
//! - [`resource`] - schemas and the per-instance lifecycle controller
//! - [`manifest`] - a file-driven front-end over the controllers
//! - [`config`] - provider configuration resolution

pub mod api;
pub mod config;
pub mod error;
pub mod manifest;
pub mod resource;
pub mod validation;

pub use error::{Error, RemoteError, Result};
