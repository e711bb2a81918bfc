//! Decoding of base64 image payloads submitted for recognition.

use crate::{Error, Result};
use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

const DATA_URL_MARKER: &str = "base64,";

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded raster image ready to be handed to the recognizer.
#[derive(Debug)]
pub struct ImagePayload {
    image: DynamicImage,
}

impl ImagePayload {
    /// Decodes a bare base64 string or a `data:<mime>;base64,` URL.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = decode_base64(encoded)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| Error::unsupported_input(format!("Unsupported image data: {}", e)))?;
        Ok(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Re-encodes the image as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

/// Strips an optional data-URL header and any embedded whitespace, then decodes.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let body = strip_data_url(encoded);
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    LENIENT
        .decode(compact.as_bytes())
        .map_err(|e| Error::unsupported_input(format!("Invalid base64 image data: {}", e)))
}

fn strip_data_url(encoded: &str) -> &str {
    match encoded.split_once(DATA_URL_MARKER) {
        Some((_, body)) => body,
        None => encoded,
    }
}
