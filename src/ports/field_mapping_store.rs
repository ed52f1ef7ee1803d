//! Field-mapping store port.
//!
//! The CRM field-mapping table is the only cross-request state this layer
//! holds. It lives behind this small port so connector logic never touches
//! storage directly and a real datastore can replace the in-memory adapter
//! without touching the connector.
//!
//! The bundled in-memory adapter is safe within one process only. Running
//! multiple instances against it means each instance sees its own table;
//! externalize the storage before scaling out.

use async_trait::async_trait;

use super::crm_connector::{CrmError, FieldMapping};

/// Port for reading and replacing the CRM field-mapping table.
#[async_trait]
pub trait FieldMappingStore: Send + Sync {
    /// Current mapping table. Implementations return a defensive copy.
    async fn get(&self) -> Result<Vec<FieldMapping>, CrmError>;

    /// Replace the table wholesale. Implementations store a defensive copy.
    async fn replace(&self, mappings: Vec<FieldMapping>) -> Result<(), CrmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_mapping_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn FieldMappingStore) {}
    }
}
