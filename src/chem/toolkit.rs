use super::process;
use crate::{Error, Result, config::ToolkitConfig};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A structure as submitted by a caller, before the toolkit has seen it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "data", rename_all = "snake_case")]
pub enum StructureInput {
    Smiles(String),
    Molblock(String),
}

impl fmt::Display for StructureInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smiles(smiles) => write!(f, "SMILES {}", smiles),
            Self::Molblock(block) => write!(f, "molblock ({} lines)", block.lines().count()),
        }
    }
}

/// Everything the toolkit derives from a successfully parsed molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureRecord {
    /// Canonical isomeric SMILES.
    pub smiles: String,
    pub inchi: String,
    /// PNG rendering of the 2D depiction.
    pub png: Vec<u8>,
    pub molblock: String,
}

impl StructureRecord {
    pub fn image_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

#[async_trait]
pub trait MoleculeToolkit: Send + Sync {
    /// Parses `input` and derives its representations.
    ///
    /// `Ok(None)` means the toolkit rejected the input as a molecule; `Err`
    /// is reserved for the toolkit itself failing.
    async fn describe(&self, input: &StructureInput) -> Result<Option<StructureRecord>>;
}

/// Reply line written by the toolkit bridge process.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum BridgeReply {
    Ok {
        smiles: String,
        inchi: String,
        png: String,
        molblock: String,
    },
    Unparseable,
    Error {
        message: String,
    },
}

/// Toolkit backed by an external bridge process, started once per call.
pub struct ProcessToolkit {
    config: ToolkitConfig,
}

impl ProcessToolkit {
    pub fn new(config: ToolkitConfig) -> Self {
        Self { config }
    }

    fn decode_reply(stdout: &str) -> Result<Option<StructureRecord>> {
        let line = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| Error::upstream("Toolkit produced no output"))?;

        let reply: BridgeReply = serde_json::from_str(line)
            .map_err(|e| Error::upstream(format!("Failed to parse toolkit reply: {}", e)))?;

        match reply {
            BridgeReply::Ok {
                smiles,
                inchi,
                png,
                molblock,
            } => {
                let png = STANDARD
                    .decode(png.as_bytes())
                    .map_err(|e| Error::upstream(format!("Toolkit returned invalid PNG data: {}", e)))?;
                Ok(Some(StructureRecord {
                    smiles,
                    inchi,
                    png,
                    molblock,
                }))
            }
            BridgeReply::Unparseable => Ok(None),
            BridgeReply::Error { message } => Err(Error::upstream(message)),
        }
    }
}

#[async_trait]
impl MoleculeToolkit for ProcessToolkit {
    async fn describe(&self, input: &StructureInput) -> Result<Option<StructureRecord>> {
        debug!("Describing {} via toolkit process", input);

        let mut request = serde_json::to_vec(input)?;
        request.push(b'\n');

        let output = process::run(
            "toolkit",
            &self.config.command,
            &self.config.args,
            &self.config.env,
            Some(&request),
            self.config.timeout(),
        )
        .await?;

        Self::decode_reply(&output.stdout)
    }
}
