//! Text detection over encoded images through a long-lived ONNX session.

pub mod detector;
pub mod engine;
pub mod error;
pub mod model;

pub use detector::{Detection, DetectorConfig, INPUT_IMAGE, OUTPUT_BOXES, OUTPUT_IMAGE, TextDetector};
pub use engine::{
    DetextEngine, DetextEngineFailure, DetextEngineRequest, DetextEngineResponse,
    DetextEngineResult, DetextEngineState,
};
pub use error::DetectError;
pub use model::{DetextModel, RequestMetadata};
