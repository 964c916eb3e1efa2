//! Resource type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use resdao_core::AppError;

/// Kind of artefact a resource holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "resource_type")]
pub enum ResourceType {
    /// LwM2M object model (XML).
    #[serde(rename = "LWM2M_MODEL")]
    #[sqlx(rename = "LWM2M_MODEL")]
    Lwm2mModel,
    /// Java key store.
    #[serde(rename = "JKS")]
    #[sqlx(rename = "JKS")]
    Jks,
    /// PKCS #12 key store.
    #[serde(rename = "PKCS_12")]
    #[sqlx(rename = "PKCS_12")]
    Pkcs12,
    /// JavaScript module.
    #[serde(rename = "JS_MODULE")]
    #[sqlx(rename = "JS_MODULE")]
    JsModule,
}

impl ResourceType {
    /// All resource types.
    pub const ALL: [ResourceType; 4] = [Self::Lwm2mModel, Self::Jks, Self::Pkcs12, Self::JsModule];

    /// Return the type as its canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lwm2mModel => "LWM2M_MODEL",
            Self::Jks => "JKS",
            Self::Pkcs12 => "PKCS_12",
            Self::JsModule => "JS_MODULE",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Invalid resource type: '{s}'. Expected one of: LWM2M_MODEL, JKS, PKCS_12, JS_MODULE"
                ))
            })
    }
}
