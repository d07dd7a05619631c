//! Loop-Guard Entity Lifecycle
//!
//! Saving a content entity writes to the CRM, and the CRM fires its own
//! post-save hooks, which would normally push the change back to the content
//! side. To break that cycle, every content-side save/delete marks the entity
//! for the duration of the call:
//!
//! ```text
//! IDLE ──save()/delete()──▶ IN_PROGRESS ──any exit──▶ IDLE
//! ```
//!
//! The mark is held by a [`LifecycleGuard`] and released in its `Drop`, so it
//! is cleared on success, on error, and when the future is dropped mid-call.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use core_kernel::PortError;

use crate::entity::CrmEntity;
use crate::error::EntityError;
use crate::storage::{EntityStorage, SaveStatus};

/// Instance-scoped "content-side mutation in progress" flag
#[derive(Debug, Default)]
pub struct LifecycleFlag(Arc<AtomicBool>);

impl LifecycleFlag {
    /// True only while a content-side save or delete is running
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raises the flag, or returns None if it is already raised
    pub fn acquire(&self) -> Option<LifecycleGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| LifecycleGuard {
                flag: Arc::clone(&self.0),
            })
    }
}

/// Holds the lifecycle flag raised; lowers it when dropped
#[must_use = "the flag is lowered as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LifecycleGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for LifecycleGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// The wrapped operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOperation {
    Save,
    Delete,
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleOperation::Save => f.write_str("save"),
            LifecycleOperation::Delete => f.write_str("delete"),
        }
    }
}

/// Content-side save/delete entry point
pub struct EntityLifecycle {
    storage: Arc<dyn EntityStorage>,
}

impl EntityLifecycle {
    pub fn new(storage: Arc<dyn EntityStorage>) -> Self {
        Self { storage }
    }

    /// Saves the entity with its lifecycle flag raised
    ///
    /// # Errors
    ///
    /// - `EntityError::LifecycleInvariantViolation` if a save/delete of this
    ///   instance is already in progress
    /// - `EntityError::Port` if the storage fails; the flag is lowered first
    #[instrument(skip_all, fields(entity_type = %entity.entity_type_id(), uuid = %entity.uuid()))]
    pub async fn save(&self, entity: &mut CrmEntity) -> Result<SaveStatus, EntityError> {
        let _guard = Self::enter(entity, LifecycleOperation::Save)?;
        let status = self
            .storage
            .save(entity)
            .await
            .map_err(|err| Self::storage_failure(LifecycleOperation::Save, err))?;
        debug!(?status, id = ?entity.id(), "Entity saved");
        Ok(status)
    }

    /// Deletes the entity with its lifecycle flag raised
    ///
    /// # Errors
    ///
    /// Same as [`EntityLifecycle::save`].
    #[instrument(skip_all, fields(entity_type = %entity.entity_type_id(), uuid = %entity.uuid()))]
    pub async fn delete(&self, entity: &CrmEntity) -> Result<(), EntityError> {
        let _guard = Self::enter(entity, LifecycleOperation::Delete)?;
        self.storage
            .delete(entity)
            .await
            .map_err(|err| Self::storage_failure(LifecycleOperation::Delete, err))?;
        debug!(id = ?entity.id(), "Entity deleted");
        Ok(())
    }

    fn storage_failure(operation: LifecycleOperation, err: PortError) -> EntityError {
        let err = EntityError::from(err);
        warn!(
            %operation,
            transient = err.is_transient(),
            error = %err,
            "Storage rejected content-side mutation"
        );
        err
    }

    fn enter(
        entity: &CrmEntity,
        operation: LifecycleOperation,
    ) -> Result<LifecycleGuard, EntityError> {
        entity.lifecycle().acquire().ok_or_else(|| {
            error!(%operation, "Re-entrant content-side mutation");
            EntityError::LifecycleInvariantViolation {
                entity_type: entity.entity_type_id().to_string(),
                operation,
            }
        })
    }
}
