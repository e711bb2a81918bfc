use async_trait::async_trait;
use molstruct::{
    Error, Result,
    chem::{MoleculeToolkit, StructureInput, StructureRecognizer, StructureRecord},
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Mock toolkit that knows a handful of molecules by their spellings.
///
/// Molblocks it emits carry the canonical SMILES on their title line, so a
/// molblock returned by one call can be fed back into another.
#[derive(Debug)]
pub struct MockToolkit {
    aliases: HashMap<String, String>,
    pub requests: Arc<Mutex<Vec<StructureInput>>>,
    pub error: Option<String>,
}

impl MockToolkit {
    pub fn new() -> Self {
        let mut aliases = HashMap::new();
        for (canonical, spellings) in [
            ("CCO", &["CCO", "OCC", "C(O)C"][..]),
            ("c1ccccc1", &["c1ccccc1", "C1=CC=CC=C1"][..]),
            ("C[C@H](N)C(=O)O", &["C[C@H](N)C(=O)O", "N[C@@H](C)C(=O)O"][..]),
        ] {
            for spelling in spellings {
                aliases.insert(spelling.to_string(), canonical.to_string());
            }
        }

        Self {
            aliases,
            requests: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn get_requests(&self) -> Vec<StructureInput> {
        self.requests.lock().unwrap().clone()
    }

    pub fn molblock_for(canonical: &str) -> String {
        format!(
            "{}\n     MockKit\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n",
            canonical
        )
    }

    pub fn inchi_for(canonical: &str) -> String {
        format!("InChI=1S/mock/{}", canonical)
    }

    fn record(canonical: &str) -> StructureRecord {
        StructureRecord {
            smiles: canonical.to_string(),
            inchi: Self::inchi_for(canonical),
            png: format!("png:{}", canonical).into_bytes(),
            molblock: Self::molblock_for(canonical),
        }
    }
}

impl Default for MockToolkit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MoleculeToolkit for MockToolkit {
    async fn describe(&self, input: &StructureInput) -> Result<Option<StructureRecord>> {
        self.requests.lock().unwrap().push(input.clone());

        if let Some(ref error) = self.error {
            return Err(Error::upstream(error.clone()));
        }

        let canonical = match input {
            StructureInput::Smiles(smiles) => self.aliases.get(smiles).cloned(),
            StructureInput::Molblock(block) => {
                let title = block.lines().next().unwrap_or_default().trim();
                if block.contains("M  END") && self.aliases.values().any(|c| c == title) {
                    Some(title.to_string())
                } else {
                    None
                }
            }
        };

        Ok(canonical.as_deref().map(Self::record))
    }
}

/// Mock recognizer returning a fixed prediction and recording the paths it saw.
#[derive(Debug)]
pub struct MockRecognizer {
    pub prediction: String,
    pub error: Option<String>,
    pub seen: Arc<Mutex<Vec<PathBuf>>>,
    pub images: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockRecognizer {
    pub fn predicting(smiles: &str) -> Self {
        Self {
            prediction: smiles.to_string(),
            error: None,
            seen: Arc::new(Mutex::new(Vec::new())),
            images: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::predicting("")
        }
    }

    pub fn seen_paths(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }

    pub fn seen_images(&self) -> Vec<Vec<u8>> {
        self.images.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructureRecognizer for MockRecognizer {
    async fn predict_smiles(&self, image_path: &Path) -> Result<String> {
        let bytes = std::fs::read(image_path)?;
        self.seen.lock().unwrap().push(image_path.to_path_buf());
        self.images.lock().unwrap().push(bytes);

        if let Some(ref error) = self.error {
            return Err(Error::upstream(error.clone()));
        }
        Ok(self.prediction.clone())
    }
}
