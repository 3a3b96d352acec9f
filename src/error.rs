use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building or driving a text detection session.
///
/// `SessionBuild` and `Io` are construction failures: the detector never
/// existed and the feature should be disabled. Every other variant is a
/// per-call failure; the session stays valid and previous results are
/// unaffected.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The inference session could not be constructed.
    #[error("failed to build inference session: {0}")]
    SessionBuild(#[source] ort::Error),

    /// The model file could not be read.
    #[error("failed to read model `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input buffer contained no bytes.
    #[error("input image buffer is empty")]
    EmptyInput,

    /// The runtime rejected the call (malformed input bytes, op failure).
    #[error("inference failed: {0}")]
    Inference(#[source] ort::Error),

    /// The model did not produce the expected output slot.
    #[error("model output `{0}` is missing")]
    MissingOutput(&'static str),

    /// The output bytes did not decode as an image.
    #[error("model output is not a decodable image")]
    Decode(#[from] image::ImageError),
}
