//! Request pipeline shared by the HTTP handlers.
//!
//! Each operation decodes its input, delegates to the toolkit and the
//! recognizer, and hands back a [`StructureRecord`]. Nothing here outlives a
//! single call apart from the collaborators and the admission semaphore.

use crate::{
    Error, Result,
    chem::{
        ImagePayload, MoleculeToolkit, ProcessRecognizer, ProcessToolkit, ScratchImage,
        StructureInput, StructureRecognizer, StructureRecord,
    },
    config::Config,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Span, info, warn};

pub const INVALID_SMILES: &str = "Invalid SMILES";
pub const INVALID_PREDICTION: &str = "Invalid predicted SMILES structure";
pub const INVALID_MOLFILE: &str = "Invalid molfile structure";

/// Outcome of validating a caller-supplied SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmilesValidation {
    Valid(StructureRecord),
    Invalid,
}

#[derive(Clone)]
pub struct StructureService {
    toolkit: Arc<dyn MoleculeToolkit>,
    recognizer: Arc<dyn StructureRecognizer>,
    admission: Option<Arc<Semaphore>>,
    scratch_dir: Option<PathBuf>,
}

impl StructureService {
    pub fn new(toolkit: Arc<dyn MoleculeToolkit>, recognizer: Arc<dyn StructureRecognizer>) -> Self {
        Self {
            toolkit,
            recognizer,
            admission: None,
            scratch_dir: None,
        }
    }

    /// Builds the service with process-backed collaborators.
    pub fn from_config(config: &Config) -> Result<Self> {
        let toolkit = Arc::new(ProcessToolkit::new(config.toolkit.clone()));
        let recognizer = Arc::new(ProcessRecognizer::new(config.recognizer.clone()));

        let mut service = Self::new(toolkit, recognizer);
        if let Some(limit) = config.recognizer.max_concurrent {
            service = service.with_max_concurrent_recognitions(limit)?;
        }
        if let Some(dir) = &config.recognizer.scratch_dir {
            service = service.with_scratch_dir(dir.clone());
        }
        Ok(service)
    }

    /// Caps concurrent recognizer runs; further requests wait their turn.
    pub fn with_max_concurrent_recognitions(mut self, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::config("recognizer.max_concurrent must be at least 1"));
        }
        self.admission = Some(Arc::new(Semaphore::new(limit)));
        Ok(self)
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub async fn validate_smiles(&self, smiles: &str) -> Result<SmilesValidation> {
        info!("Validating SMILES: {}", smiles);

        let input = StructureInput::Smiles(smiles.to_string());
        match self.toolkit.describe(&input).await? {
            Some(record) => {
                info!("Generated InChI: {}", record.inchi);
                Ok(SmilesValidation::Valid(record))
            }
            None => {
                warn!("Invalid SMILES string: {}", smiles);
                Ok(SmilesValidation::Invalid)
            }
        }
    }

    pub async fn recognize_structure(&self, image: &str) -> Result<StructureRecord> {
        let scratch = self.stage_image(image.to_string()).await?;
        let predicted = self.predict(&scratch).await?;
        drop(scratch);

        info!("Recognizer predicted SMILES: {}", predicted);
        if predicted.is_empty() {
            warn!("Recognizer returned an empty prediction");
            return Err(Error::validation(INVALID_PREDICTION));
        }

        let input = StructureInput::Smiles(predicted);
        self.toolkit.describe(&input).await?.ok_or_else(|| {
            warn!("Toolkit could not parse predicted {}", input);
            Error::validation(INVALID_PREDICTION)
        })
    }

    pub async fn molfile_to_structure(&self, molfile: &str) -> Result<StructureRecord> {
        let input = StructureInput::Molblock(molfile.to_string());
        self.toolkit.describe(&input).await?.ok_or_else(|| {
            warn!("Invalid molfile structure");
            Error::validation(INVALID_MOLFILE)
        })
    }

    /// Decodes the upload and writes it as PNG to a scratch file on the
    /// blocking pool. The guard comes back to the caller, who drops it.
    async fn stage_image(&self, image: String) -> Result<ScratchImage> {
        let scratch_dir = self.scratch_dir.clone();
        let span = Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let png = {
                let payload = ImagePayload::from_base64(&image)?;
                let (width, height) = payload.dimensions();
                info!("Image decoded successfully: {}x{} pixels", width, height);
                payload.to_png()?
            };
            ScratchImage::write(&png, scratch_dir.as_deref())
        })
        .await
        .map_err(|e| Error::internal(format!("Image staging task failed: {}", e)))?
    }

    async fn predict(&self, scratch: &ScratchImage) -> Result<String> {
        let _permit = match &self.admission {
            Some(semaphore) => Some(
                semaphore
                    .acquire()
                    .await
                    .map_err(|e| Error::internal(format!("Recognizer admission closed: {}", e)))?,
            ),
            None => None,
        };

        info!("Starting SMILES prediction");
        self.recognizer.predict_smiles(scratch.path()).await
    }
}
