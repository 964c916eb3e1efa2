//! Resource info entity model.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use resdao_core::traits::Entity;
use resdao_core::types::{ResourceId, TenantId};
use resdao_core::{AppError, AppResult};

use super::resource_type::ResourceType;

/// Metadata of a tenant-owned resource (the payload itself is stored elsewhere).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    /// Unique resource identifier.
    pub id: ResourceId,
    /// When the resource was created.
    pub created_at: DateTime<Utc>,
    /// Owning tenant. [`TenantId::SYSTEM`] marks a shared resource.
    pub tenant_id: TenantId,
    /// Human-readable title; the target of text search.
    #[validate(
        length(min = 1, max = 255, message = "Resource title should be specified"),
        custom(function = "not_blank")
    )]
    pub title: String,
    /// Kind of artefact.
    pub resource_type: ResourceType,
    /// Key unique per tenant and resource type.
    #[validate(
        length(min = 1, max = 255, message = "Resource key should be specified"),
        custom(function = "not_blank")
    )]
    pub resource_key: String,
}

impl ResourceInfo {
    /// Create a new resource owned by `tenant_id`, stamped with a fresh id
    /// and the current time.
    pub fn new(
        tenant_id: TenantId,
        title: impl Into<String>,
        resource_type: ResourceType,
        resource_key: impl Into<String>,
    ) -> Self {
        Self {
            id: ResourceId::new(),
            // PostgreSQL keeps microseconds.
            created_at: Utc::now().trunc_subsecs(6),
            tenant_id,
            title: title.into(),
            resource_type,
            resource_key: resource_key.into(),
        }
    }

    /// Whether this resource belongs to the system tenant.
    pub fn is_system(&self) -> bool {
        self.tenant_id.is_system()
    }

    /// Natural key: at most one resource per tenant, type and key.
    pub fn natural_key(&self) -> (TenantId, ResourceType, &str) {
        (self.tenant_id, self.resource_type, self.resource_key.as_str())
    }

    /// Validate field constraints, mapping failures to a validation error.
    pub fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid resource {}: {e}", self.id)))
    }

    /// Whether the title contains `term`, ignoring case.
    pub fn title_matches(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(&term.to_lowercase())
    }
}

impl Entity for ResourceInfo {
    type Id = ResourceId;

    fn id(&self) -> ResourceId {
        self.id
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resdao_core::ErrorKind;

    fn sample() -> ResourceInfo {
        ResourceInfo::new(
            TenantId::new(),
            "Temperature sensor",
            ResourceType::Lwm2mModel,
            "3303_1.0",
        )
    }

    #[test]
    fn test_valid_resource_passes() {
        assert!(sample().check().is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut resource = sample();
        resource.title = String::new();
        assert_eq!(resource.check().unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_blank_key_rejected() {
        let mut resource = sample();
        resource.resource_key = "   ".to_string();
        assert_eq!(resource.check().unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_overlong_title_rejected() {
        let mut resource = sample();
        resource.title = "x".repeat(256);
        assert!(resource.check().is_err());
    }

    #[test]
    fn test_title_matches_ignores_case() {
        let resource = sample();
        assert!(resource.title_matches("SENSOR"));
        assert!(!resource.title_matches("humidity"));
    }

    #[test]
    fn test_created_at_has_microsecond_precision() {
        let resource = sample();
        assert_eq!(resource.created_at.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("tenantId").is_some());
        assert_eq!(json["resourceType"], "LWM2M_MODEL");
    }
}
