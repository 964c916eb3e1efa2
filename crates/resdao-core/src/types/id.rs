//! Newtype wrappers around [`uuid::Uuid`] for entity and partition identifiers.
//!
//! Distinct types prevent passing a `TenantId` where a `ResourceId` is
//! expected. With the `sqlx` feature each id also implements `sqlx::Type`,
//! `sqlx::Encode` and `sqlx::Decode` for PostgreSQL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create an identifier from an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|e| {
                    AppError::with_source(
                        crate::error::ErrorKind::Validation,
                        format!("Malformed {} '{s}': {e}", stringify!($name)),
                        e,
                    )
                })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

define_id!(
    /// Partition identifier: the tenant that owns a set of entities.
    TenantId
);

define_id!(
    /// Unique identifier for a resource.
    ResourceId
);

impl TenantId {
    /// The system tenant. Its resources are visible to every tenant.
    pub const SYSTEM: TenantId = TenantId::from_uuid(Uuid::nil());

    /// Whether this is the system tenant.
    pub fn is_system(&self) -> bool {
        self.0.is_nil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_resource_id_new_is_unique() {
        let id1 = ResourceId::new();
        let id2 = ResourceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_tenant_id_display() {
        let uuid = Uuid::new_v4();
        let id = TenantId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_from_str() {
        let uuid = Uuid::new_v4();
        let id: ResourceId = uuid.to_string().parse().expect("should parse");
        assert_eq!(id.0, uuid);
    }

    #[test]
    fn test_malformed_id_is_validation_error() {
        let err = "1234-not-a-uuid".parse::<TenantId>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("TenantId"));
    }

    #[test]
    fn test_system_tenant() {
        assert!(TenantId::SYSTEM.is_system());
        assert!(!TenantId::new().is_system());
        assert_eq!(
            TenantId::SYSTEM.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = ResourceId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let parsed: ResourceId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
