//! CRM post-operation hooks
//!
//! After the CRM writes a record it notifies the content side so the
//! matching content entity can be saved or deleted too. When that write was
//! itself caused by a content-side save, doing so would start the cycle
//! again. The hook consults the entity's lifecycle flag to tell the two apart.

use std::fmt;

use tracing::debug;

use crate::entity::CrmEntity;

/// CRM operation that fired the hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmOperation {
    Create,
    Edit,
    Delete,
}

impl fmt::Display for CrmOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrmOperation::Create => f.write_str("create"),
            CrmOperation::Edit => f.write_str("edit"),
            CrmOperation::Delete => f.write_str("delete"),
        }
    }
}

/// Whether a CRM-side change should be mirrored onto the content entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationDecision {
    Propagate,
    /// The change came from the content side; mirroring it would loop
    Suppress,
}

pub struct CrmPostHook;

impl CrmPostHook {
    pub fn decide(operation: CrmOperation, entity: &CrmEntity) -> PropagationDecision {
        if entity.is_content_originated() {
            debug!(%operation, entity_type = %entity.entity_type_id(), "Suppressing content-originated CRM change");
            PropagationDecision::Suppress
        } else {
            PropagationDecision::Propagate
        }
    }
}
