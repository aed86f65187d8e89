use std::time::Duration;

use async_trait::async_trait;

use crate::collections::CollectionSchema;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::types::Operation;

/// Observer rings with semantic meaning - synchronous (0-6) and asynchronous (7-9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObserverRing {
    DataPreparation = 0, // Tenant stamping, normalisation
    InputValidation = 1, // Required fields, closed value sets
    Security = 2,        // Tenant integrity, role escalation
    Business = 3,        // Domain rules: uniqueness, unit consistency
    Enrichment = 4,      // Password hashing, defaults
    Database = 5,        // Store writes
    PostDatabase = 6,    // Immediate processing after the write
    Audit = 7,           // Change tracking (async)
    Integration = 8,     // External APIs, webhooks (async)
    Notification = 9,    // User notifications (async)
}

impl ObserverRing {
    pub const ALL: [ObserverRing; 10] = [
        ObserverRing::DataPreparation,
        ObserverRing::InputValidation,
        ObserverRing::Security,
        ObserverRing::Business,
        ObserverRing::Enrichment,
        ObserverRing::Database,
        ObserverRing::PostDatabase,
        ObserverRing::Audit,
        ObserverRing::Integration,
        ObserverRing::Notification,
    ];

    /// Check if ring executes synchronously (blocking)
    pub fn is_synchronous(&self) -> bool {
        (*self as u8) <= 6
    }

    pub fn is_asynchronous(&self) -> bool {
        (*self as u8) >= 7
    }

    /// Errors in these rings stop the pipeline before anything is written
    pub fn is_pre_database(&self) -> bool {
        (*self as u8) < 5
    }

    /// Rings that run once the write is stored; their failures cannot undo it
    pub fn is_post_database(&self) -> bool {
        (*self as u8) > 5
    }

    /// Rings that run for an operation; reads are served directly by the store
    pub fn for_operation(operation: Operation) -> &'static [ObserverRing] {
        match operation {
            Operation::Read => &[],
            Operation::Create | Operation::Update | Operation::Delete => &Self::ALL,
        }
    }
}

/// A step of the write pipeline
#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    fn ring(&self) -> ObserverRing;

    fn applies_to_operation(&self, op: Operation) -> bool;

    fn applies_to_collection(&self, _collection: &CollectionSchema) -> bool {
        true
    }

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}
