use std::sync::Arc;
use std::time::Instant;

use crate::access::Principal;
use crate::collections::CollectionSchema;
use crate::database::{Record, Store};
use crate::observer::error::{ObserverError, ObserverWarning};
use crate::observer::traits::ObserverRing;
use crate::types::{Document, Operation, RecordId};

/// The data structure that flows through the observer pipeline
#[derive(Clone)]
pub struct ObserverContext {
    pub operation: Operation,
    pub collection: &'static CollectionSchema,

    /// Caller; `None` only for system writes
    pub principal: Option<Principal>,
    /// Writes issued by the server itself (registration), exempt from caller checks
    pub system: bool,

    pub store: Arc<dyn Store>,
    pub records: Vec<Record>,

    /// Stored documents after ring 5
    pub result: Option<Vec<Document>>,

    pub start_time: Instant,
    pub current_ring: Option<ObserverRing>,

    pub errors: Vec<ObserverError>,
    pub warnings: Vec<ObserverWarning>,
}

impl ObserverContext {
    pub fn new(
        operation: Operation,
        collection: &'static CollectionSchema,
        principal: Option<Principal>,
        store: Arc<dyn Store>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            operation,
            collection,
            principal,
            system: false,
            store,
            records,
            result: None,
            start_time: Instant::now(),
            current_ring: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Mark this context as a server-issued write
    pub fn as_system(mut self) -> Self {
        self.system = true;
        self
    }

    /// Caller may write across businesses
    pub fn is_privileged(&self) -> bool {
        self.system || self.principal.as_ref().map(Principal::is_privileged).unwrap_or(false)
    }

    pub fn principal_tenant(&self) -> Option<RecordId> {
        self.principal.as_ref().and_then(Principal::tenant_id)
    }

    pub fn add_error(&mut self, error: ObserverError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ObserverWarning) {
        self.warnings.push(warning);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn execution_time(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Records where a field differs from the stored version
    pub fn records_with_field_changes(&self, field: &str) -> Vec<&Record> {
        self.records.iter().filter(|record| record.changed(field)).collect()
    }
}

impl std::fmt::Debug for ObserverContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverContext")
            .field("operation", &self.operation)
            .field("collection", &self.collection.slug)
            .field("principal", &self.principal.as_ref().map(|p| p.user_id))
            .field("system", &self.system)
            .field("records", &self.records.len())
            .field("current_ring", &self.current_ring)
            .field("errors", &self.errors)
            .finish()
    }
}
