//! In-memory field-mapping store.
//!
//! Default backing for the `FieldMappingStore` port. Reads and writes go
//! through defensive copies: callers never share a reference with the stored
//! table, so `update` followed by `get` returns a deeply equal but distinct
//! value.
//!
//! Safe within a single process only. Each instance of the service sees its
//! own table; externalize the storage before running more than one.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{CrmError, FieldMapping, FieldMappingStore};

/// In-memory `FieldMappingStore`.
#[derive(Debug, Default)]
pub struct InMemoryFieldMappingStore {
    table: RwLock<Vec<FieldMapping>>,
}

impl InMemoryFieldMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an initial table, for boot-time defaults.
    pub fn with_mappings(mappings: Vec<FieldMapping>) -> Self {
        Self {
            table: RwLock::new(mappings),
        }
    }
}

#[async_trait]
impl FieldMappingStore for InMemoryFieldMappingStore {
    async fn get(&self) -> Result<Vec<FieldMapping>, CrmError> {
        Ok(self.table.read().await.clone())
    }

    async fn replace(&self, mappings: Vec<FieldMapping>) -> Result<(), CrmError> {
        *self.table.write().await = mappings;
        Ok(())
    }
}
