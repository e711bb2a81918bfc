use crate::{chem::StructureRecord, error::ErrorKind, service::INVALID_SMILES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ValidateSmilesRequest {
    #[serde(default)]
    pub smiles: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecognizeStructureRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MolfileRequest {
    #[serde(default)]
    pub molfile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureResponse {
    pub smiles: String,
    pub inchi: String,
    /// `data:image/png;base64,...`
    pub structure_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molblock: Option<String>,
}

impl StructureResponse {
    /// Response shape of the molfile endpoint, which does not echo a molblock.
    pub fn without_molblock(record: StructureRecord) -> Self {
        Self {
            molblock: None,
            ..Self::from(record)
        }
    }
}

impl From<StructureRecord> for StructureResponse {
    fn from(record: StructureRecord) -> Self {
        Self {
            structure_image: record.image_data_url(),
            smiles: record.smiles,
            inchi: record.inchi,
            molblock: Some(record.molblock),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateSmilesResponse {
    pub valid: bool,
    #[serde(flatten)]
    pub structure: Option<StructureResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateSmilesResponse {
    pub fn valid(record: StructureRecord) -> Self {
        Self {
            valid: true,
            structure: Some(record.into()),
            error: None,
        }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            structure: None,
            error: Some(INVALID_SMILES.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }
}
