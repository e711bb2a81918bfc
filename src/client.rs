//! Typed HTTP client for the structure service.

use crate::{
    Error, Result,
    server::types::{
        ErrorResponse, HealthResponse, MolfileRequest, RecognizeStructureRequest,
        StructureResponse, ValidateSmilesRequest, ValidateSmilesResponse,
    },
};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Result of asking the service to validate a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmilesCheck {
    Valid(StructureResponse),
    Invalid { error: String },
}

pub struct ChemServiceClient {
    client: Client,
    base_url: String,
}

impl ChemServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn validate_smiles(&self, smiles: &str) -> Result<SmilesCheck> {
        let request = ValidateSmilesRequest {
            smiles: Some(smiles.to_string()),
        };
        let response: ValidateSmilesResponse = self.post("/api/validate-smiles", &request).await?;

        match (response.valid, response.structure) {
            (true, Some(structure)) => Ok(SmilesCheck::Valid(structure)),
            (true, None) => Err(Error::upstream(
                "Service reported a valid SMILES without structure data",
            )),
            (false, _) => Ok(SmilesCheck::Invalid {
                error: response.error.unwrap_or_default(),
            }),
        }
    }

    /// `image` may be bare base64 or a data URL.
    pub async fn recognize_structure(&self, image: &str) -> Result<StructureResponse> {
        let request = RecognizeStructureRequest {
            image: Some(image.to_string()),
        };
        self.post("/api/recognize-structure", &request).await
    }

    pub async fn molfile_to_structure(&self, molfile: &str) -> Result<StructureResponse> {
        let request = MolfileRequest {
            molfile: Some(molfile.to_string()),
        };
        self.post("/api/molfile-to-structure", &request).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(Error::upstream(format!("{}: {}", status, message)))
    }
}

impl Default for ChemServiceClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
