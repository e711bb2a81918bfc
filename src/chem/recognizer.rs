use super::process;
use crate::{Result, config::RecognizerConfig};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

const IMAGE_PLACEHOLDER: &str = "{image}";

#[async_trait]
pub trait StructureRecognizer: Send + Sync {
    /// Predicts a SMILES string for the structure drawn in the image at `image_path`.
    async fn predict_smiles(&self, image_path: &Path) -> Result<String>;
}

/// Recognizer backed by an external model process, started once per call.
pub struct ProcessRecognizer {
    config: RecognizerConfig,
}

impl ProcessRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self { config }
    }

    fn build_args(&self, image_path: &Path) -> Vec<String> {
        let path = image_path.to_string_lossy();
        let mut substituted = false;
        let mut args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|arg| {
                if arg.contains(IMAGE_PLACEHOLDER) {
                    substituted = true;
                    arg.replace(IMAGE_PLACEHOLDER, &path)
                } else {
                    arg.clone()
                }
            })
            .collect();

        if !substituted {
            args.push(path.into_owned());
        }
        args
    }
}

#[async_trait]
impl StructureRecognizer for ProcessRecognizer {
    async fn predict_smiles(&self, image_path: &Path) -> Result<String> {
        let args = self.build_args(image_path);
        debug!("Running recognizer on {}", image_path.display());

        let output = process::run(
            "recognizer",
            &self.config.command,
            &args,
            &self.config.env,
            None,
            self.config.timeout(),
        )
        .await?;

        // Model frameworks tend to log on stdout; the prediction is the last line.
        let prediction = output
            .stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();

        Ok(prediction)
    }
}
