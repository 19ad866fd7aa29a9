//! Data sources
//!
//! Read-only lookups of entities managed elsewhere. Unlike a resource read,
//! a missing entity is an error here: the caller asked for something that has
//! to exist.

use super::schema::Attributes;
use super::Resource;
use crate::api::{ApiClient, Gateway};
use crate::error::{Error, Result};

/// Fetch an existing entity and return its readable attributes.
///
/// Write-only fields are never part of the result.
pub async fn lookup<E: Resource>(client: &ApiClient, id: &str) -> Result<Attributes> {
    let entity = Gateway::<E>::new(client)
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            kind: E::KIND,
            id: id.to_string(),
        })?;

    let mut attrs = entity.to_attributes();
    for field in E::SCHEMA.iter().filter(|f| f.write_only) {
        attrs.remove(field.name);
    }
    Ok(attrs)
}
