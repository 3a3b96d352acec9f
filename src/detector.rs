use std::path::{Path, PathBuf};

use ndarray::Array1;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::TensorRef;

use crate::error::DetectError;

/// Name of the model input slot: raw encoded image bytes.
pub const INPUT_IMAGE: &str = "image";
/// Name of the consumed output slot: the annotated image, re-encoded.
pub const OUTPUT_IMAGE: &str = "image_out";
/// Name of the second output slot. The model computes it on every run but
/// this crate does not consume it.
pub const OUTPUT_BOXES: &str = "scaled_box_out_next";

/// Session construction options.
#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    /// Path to a custom-operator library, such as the ONNX Runtime
    /// extensions package providing the image decode/encode ops the model's
    /// graph starts and ends with. `None` when the ops are built in.
    pub ops_library: Option<PathBuf>,
    /// Intra-op thread count override. `None` keeps the runtime default.
    pub intra_threads: Option<usize>,
}

/// A completed detection: the input image re-encoded with the detection
/// result drawn onto it.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Encoded image bytes, ready for display or storage.
    pub image: Vec<u8>,
}

impl Detection {
    /// Decodes the output bytes into an image.
    pub fn decode(&self) -> Result<image::DynamicImage, DetectError> {
        Ok(image::load_from_memory(&self.image)?)
    }
}

/// Text detector backed by a single long-lived ONNX session.
///
/// The session is built once and serves repeated [`detect`](Self::detect)
/// calls without reconstruction. It holds no state across calls; dropping
/// the detector releases the session.
#[derive(Debug)]
pub struct TextDetector {
    session: Session,
}

impl TextDetector {
    /// Builds a detector from in-memory model bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::SessionBuild`] if the runtime rejects the
    /// model or the session options.
    pub fn from_memory(model_bytes: &[u8], config: &DetectorConfig) -> Result<Self, DetectError> {
        let mut builder = Session::builder()
            .map_err(DetectError::SessionBuild)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(DetectError::SessionBuild)?;

        if let Some(lib) = &config.ops_library {
            builder = builder
                .with_operator_library(lib)
                .map_err(DetectError::SessionBuild)?;
        }

        if let Some(threads) = config.intra_threads {
            builder = builder
                .with_intra_threads(threads)
                .map_err(DetectError::SessionBuild)?;
        }

        let session = builder
            .commit_from_memory(model_bytes)
            .map_err(DetectError::SessionBuild)?;

        log::info!("Text detection session ready");

        Ok(Self { session })
    }

    /// Builds a detector by reading the model from a file.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Io`] if the file cannot be read, or
    /// [`DetectError::SessionBuild`] if session construction fails.
    pub fn from_file(
        model_path: impl AsRef<Path>,
        config: &DetectorConfig,
    ) -> Result<Self, DetectError> {
        let model_path = model_path.as_ref();
        let model_bytes = std::fs::read(model_path).map_err(|source| DetectError::Io {
            path: model_path.to_path_buf(),
            source,
        })?;
        Self::from_memory(&model_bytes, config)
    }

    /// Runs the model over one encoded image and returns the annotated,
    /// re-encoded result.
    ///
    /// The bytes are passed to the model as-is, as a 1-D `u8` tensor; the
    /// model's own ops handle decoding and re-encoding. A failing call
    /// leaves the session valid for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::EmptyInput`] for a zero-length buffer and
    /// [`DetectError::Inference`] when the runtime rejects the call, e.g.
    /// for bytes that are not a decodable image.
    pub fn detect(&mut self, image_bytes: &[u8]) -> Result<Detection, DetectError> {
        if image_bytes.is_empty() {
            return Err(DetectError::EmptyInput);
        }

        let input = Array1::from_vec(image_bytes.to_vec());
        let input_ref = TensorRef::from_array_view(&input).map_err(DetectError::Inference)?;

        let outputs = self
            .session
            .run(ort::inputs![INPUT_IMAGE => input_ref])
            .map_err(DetectError::Inference)?;

        let value = outputs
            .get(OUTPUT_IMAGE)
            .ok_or(DetectError::MissingOutput(OUTPUT_IMAGE))?;

        let (_, bytes) = value
            .try_extract_tensor::<u8>()
            .map_err(DetectError::Inference)?;

        Ok(Detection {
            image: bytes.to_vec(),
        })
    }
}
