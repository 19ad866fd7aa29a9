//! Entity Gateways
//!
//! One CRUD façade per entity kind, each mapping a typed record onto a single
//! REST collection. Every call is attempted exactly once.

use super::client::{collection_path, item_path, ApiClient};
use super::http::read_json;
use super::types::{Key, Model};
use crate::error::{Error, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A record the control plane stores under `/api/<KIND>s/<id>`
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Singular resource kind, used in paths and messages
    const KIND: &'static str;
    /// Name of the immutable identifier field
    const ID_FIELD: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: &str);

    /// Entity-level required fields, checked before any request is built.
    /// Returns every missing field.
    fn missing_fields(&self) -> Vec<String>;
}

impl Entity for Model {
    const KIND: &'static str = "model";
    const ID_FIELD: &'static str = "name";

    fn id(&self) -> &str {
        &self.name
    }

    fn set_id(&mut self, id: &str) {
        self.name = id.to_string();
    }

    fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("model name cannot be empty".to_string());
        }
        if self.model_provider.is_empty() {
            missing.push("model provider cannot be empty".to_string());
        }
        if self.model_name.is_empty() {
            missing.push("underlying model name cannot be empty".to_string());
        }
        missing
    }
}

impl Entity for Key {
    const KIND: &'static str = "key";
    const ID_FIELD: &'static str = "key_alias";

    fn id(&self) -> &str {
        &self.key_alias
    }

    fn set_id(&mut self, id: &str) {
        self.key_alias = id.to_string();
    }

    fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.key_alias.is_empty() {
            missing.push("key alias cannot be empty".to_string());
        }
        if self.team_id.is_empty() {
            missing.push("team ID cannot be empty".to_string());
        }
        missing
    }
}

/// CRUD façade for one entity kind
pub struct Gateway<'a, E> {
    client: &'a ApiClient,
    _entity: PhantomData<fn() -> E>,
}

pub type ModelGateway<'a> = Gateway<'a, Model>;
pub type KeyGateway<'a> = Gateway<'a, Key>;

impl<E> Clone for Gateway<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Gateway<'_, E> {}

impl<'a, E: Entity> Gateway<'a, E> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    /// POST the entity and decode the echoed (possibly enriched) record
    pub async fn create(&self, entity: &E) -> Result<E> {
        check_required(entity)?;
        tracing::info!("Creating {} {}", E::KIND, entity.id());

        let response = self
            .client
            .execute(Method::POST, &collection_path(E::KIND), Some(entity))
            .await?;
        read_json(response).await
    }

    /// Fetch by identifier; `Ok(None)` when the service answers 404
    pub async fn get(&self, id: &str) -> Result<Option<E>> {
        require_id::<E>(id)?;

        match self
            .client
            .execute::<()>(Method::GET, &item_path(E::KIND, id), None)
            .await
        {
            Ok(response) => read_json(response).await.map(Some),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} not found", E::KIND, id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// PUT the entity at its immutable identifier and decode the echo
    pub async fn update(&self, entity: &E) -> Result<E> {
        check_required(entity)?;
        tracing::info!("Updating {} {}", E::KIND, entity.id());

        let response = self
            .client
            .execute(Method::PUT, &item_path(E::KIND, entity.id()), Some(entity))
            .await?;
        read_json(response).await
    }

    /// DELETE by identifier; the response body is ignored
    pub async fn delete(&self, id: &str) -> Result<()> {
        require_id::<E>(id)?;
        tracing::info!("Deleting {} {}", E::KIND, id);

        self.client
            .execute::<()>(Method::DELETE, &item_path(E::KIND, id), None)
            .await?;
        Ok(())
    }
}

fn check_required<E: Entity>(entity: &E) -> Result<()> {
    let missing = entity.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(missing))
    }
}

fn require_id<E: Entity>(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::precondition(format!("{} {} cannot be empty", E::KIND, E::ID_FIELD)));
    }
    Ok(())
}
