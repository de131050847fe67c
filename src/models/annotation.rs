// Payload of the "created-by" annotation (serialized owner reference)

use serde::{Deserialize, Serialize};

/// Annotation default used when the config does not override it.
pub const CREATED_BY_ANNOTATION: &str = "kubernetes.io/created-by";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedByAnnotation {
    #[serde(default, alias = "Kind")]
    pub kind: String,
    #[serde(default, alias = "APIVersion")]
    pub api_version: String,
    #[serde(alias = "Reference")]
    pub reference: ObjectReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default, alias = "Kind")]
    pub kind: String,
    #[serde(default, alias = "Namespace")]
    pub namespace: String,
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default, alias = "UID")]
    pub uid: String,
    #[serde(default, alias = "APIVersion")]
    pub api_version: String,
    #[serde(default, alias = "ResourceVersion")]
    pub resource_version: String,
}

impl CreatedByAnnotation {
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
