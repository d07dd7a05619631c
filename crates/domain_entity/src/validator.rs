//! Cross-System Validator
//!
//! Runs the local constraints, then asks the CRM to validate the normalized
//! parameters. CRM violations are keyed by CRM field name and phrased with
//! raw machine names ("email is invalid"); before they reach the content
//! side, every occurrence of the machine name in the message is replaced by
//! the field's label ("Email Address is invalid").

use std::sync::Arc;

use tracing::{debug, instrument};

use domain_schema::CrmApi;

use crate::constraints::LocalValidator;
use crate::entity::CrmEntity;
use crate::error::EntityError;
use crate::normalizer::ValueNormalizer;
use crate::violation::{FieldViolation, ViolationList};

/// Validates entities on both sides of the bridge
pub struct CrossSystemValidator {
    crm: Arc<dyn CrmApi>,
    normalizer: ValueNormalizer,
}

impl CrossSystemValidator {
    pub fn new(crm: Arc<dyn CrmApi>, normalizer: ValueNormalizer) -> Self {
        Self { crm, normalizer }
    }

    /// Returns local violations followed by CRM violations
    ///
    /// An invalid entity is `Ok` with a non-empty list.
    ///
    /// # Errors
    ///
    /// `EntityError::Port` if the CRM validate call fails.
    #[instrument(skip_all, fields(entity_type = %entity.entity_type_id()))]
    pub async fn validate(&self, entity: &CrmEntity) -> Result<ViolationList, EntityError> {
        let mut violations = LocalValidator::validate(entity);

        let params = self.normalizer.normalize(entity);
        let crm_violations = self.crm.validate(entity.crm_entity(), &params).await?;

        for (field_name, reported) in crm_violations {
            let label = entity
                .schema()
                .label_of(&field_name)
                .unwrap_or(field_name.as_str());
            for violation in reported {
                violations.add(FieldViolation::crm(
                    field_name.as_str(),
                    substitute_label(&violation.message, &field_name, label),
                    params.get(&field_name).cloned(),
                ));
            }
        }

        debug!(violations = violations.len(), "Validated entity");
        Ok(violations)
    }
}

fn substitute_label(message: &str, field_name: &str, label: &str) -> String {
    if field_name.is_empty() {
        return message.to_string();
    }
    message.replace(field_name, label)
}
