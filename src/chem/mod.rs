mod payload;
mod process;
mod recognizer;
mod scratch;
mod toolkit;

pub use payload::{ImagePayload, decode_base64};
pub use recognizer::{ProcessRecognizer, StructureRecognizer};
pub use scratch::ScratchImage;
pub use toolkit::{MoleculeToolkit, ProcessToolkit, StructureInput, StructureRecord};
