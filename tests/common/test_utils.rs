use super::mocks::{MockRecognizer, MockToolkit};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use molstruct::{
    config::ServerConfig,
    server::{self, handlers::AppState},
    service::StructureService,
};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

pub struct TestApp {
    pub router: Router,
    pub toolkit: Arc<MockToolkit>,
    pub recognizer: Arc<MockRecognizer>,
    pub scratch_dir: TempDir,
}

impl TestApp {
    pub fn new(toolkit: MockToolkit, recognizer: MockRecognizer) -> Self {
        Self::build(toolkit, recognizer, true)
    }

    pub fn build(toolkit: MockToolkit, recognizer: MockRecognizer, expose_internal_errors: bool) -> Self {
        let server = ServerConfig {
            expose_internal_errors,
            ..ServerConfig::default()
        };
        Self::with_server_config(toolkit, recognizer, &server)
    }

    pub fn with_server_config(
        toolkit: MockToolkit,
        recognizer: MockRecognizer,
        server: &ServerConfig,
    ) -> Self {
        let scratch_dir = TempDir::new().unwrap();
        let toolkit = Arc::new(toolkit);
        let recognizer = Arc::new(recognizer);

        let service = StructureService::new(toolkit.clone(), recognizer.clone())
            .with_scratch_dir(scratch_dir.path());
        let state = AppState::with_config(service, server);

        Self {
            router: server::router(state),
            toolkit,
            recognizer,
            scratch_dir,
        }
    }

    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch_dir.path()).unwrap().count()
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new(MockToolkit::new(), MockRecognizer::predicting("OCC"))
    }
}

/// Small PNG drawing, base64 encoded without a data-URL header.
pub fn sample_png_base64() -> String {
    let img = RgbImage::from_fn(8, 6, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    STANDARD.encode(buffer.into_inner())
}

/// Noisy RGB PNG that compresses poorly, base64 encoded. A 1000x1000 image
/// comes out at roughly 4 MB of base64 text.
pub fn noisy_png_base64(width: u32, height: u32) -> String {
    let mut seed: u32 = 0x2545_f491;
    let img = RgbImage::from_fn(width, height, |_, _| {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let [r, g, b, _] = seed.to_le_bytes();
        Rgb([r, g, b])
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    STANDARD.encode(buffer.into_inner())
}
