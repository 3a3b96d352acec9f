use argh::FromArgs;
use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use detext::{
    DetectError, Detection, DetectorConfig, DetextEngine, DetextEngineResult, DetextEngineState,
    DetextModel, RequestMetadata, TextDetector,
};
use reqwest::StatusCode;
use serde_json::json;
use std::{path::PathBuf, sync::Arc};

mod messages;

// defaults for the server
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(FromArgs)]
/// Detext is a service for running text detection on images.
struct DetextArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// the path to the ONNX model file
    #[argh(option, short = 'm')]
    model: PathBuf,

    /// path to a custom-operator library the model needs
    #[argh(option)]
    ops_library: Option<PathBuf>,
}

async fn post_detection(
    State(engine): State<Arc<DetextEngine<DetectorModel>>>,
    Json(payload): Json<messages::DetectionRequest>,
) -> impl IntoResponse {
    if engine.state() != DetextEngineState::Idle {
        log::debug!("Engine is still processing");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Engine is still processing" })),
        );
    }

    // Read the encoded image; the model consumes the raw bytes
    let image = match std::fs::read(&payload.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("failed to read {}: {e}", payload.image_path.display())
                })),
            );
        }
    };

    // schedule the detection
    engine.schedule_inference(DetectionJob {
        image,
        image_path: payload.image_path,
        output_path: payload.output_path,
    });

    log::info!("Scheduled detection successfully");

    (StatusCode::OK, Json(json!({ "status": "scheduled" })))
}

async fn get_result(
    State(engine): State<Arc<DetextEngine<DetectorModel>>>,
) -> impl IntoResponse {
    // If we're here, there should be a result available
    match engine.try_poll_response() {
        DetextEngineResult::Success(engine_result) => {
            let metadata = engine_result.request_metadata;
            let detection = engine_result.response;

            let (width, height) = match detection.decode() {
                Ok(img) => (img.width(), img.height()),
                Err(e) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "status": "error", "message": e.to_string() })),
                    );
                }
            };

            if let Err(e) = std::fs::write(&metadata.output_path, &detection.image) {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "status": "error",
                        "message": format!("failed to write {}: {e}", metadata.output_path.display())
                    })),
                );
            }

            log::info!(
                "Result received successfully ({} bytes in, {width}x{height} out)",
                metadata.input_len
            );

            let detection_response = messages::DetectionResponse {
                output_path: metadata.output_path,
                width,
                height,
                duration: engine_result.duration,
            };

            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "response": detection_response
                })),
            )
        }
        DetextEngineResult::Failure(failure) => {
            log::warn!(
                "Detection of {} failed: {}",
                failure.request_metadata.image_path.display(),
                failure.error
            );
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "status": "failed", "message": failure.error })),
            )
        }
        DetextEngineResult::Empty(state) => {
            log::warn!("Expected a result but none was available");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(
                    json!({ "status": state.as_str(), "message": "Expected result not available" }),
                ),
            )
        }
        DetextEngineResult::Error(e) => {
            // This is an unexpected state - the engine worker is gone
            log::warn!("Engine is no longer serving results");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": e })),
            )
        }
    }
}

// custom model that binds the text detector to the engine
struct DetectorModel(TextDetector);

struct DetectionJob {
    image: Vec<u8>,
    image_path: PathBuf,
    output_path: PathBuf,
}

struct DetectionJobMetadata {
    image_path: PathBuf,
    output_path: PathBuf,
    input_len: usize,
}

impl RequestMetadata for DetectionJob {
    type Metadata = DetectionJobMetadata;

    fn metadata(&self) -> Self::Metadata {
        DetectionJobMetadata {
            image_path: self.image_path.clone(),
            output_path: self.output_path.clone(),
            input_len: self.image.len(),
        }
    }
}

impl DetextModel for DetectorModel {
    type Request = DetectionJob;
    type Response = Detection;
    type Error = DetectError;

    fn run(&mut self, request: Self::Request) -> Result<Self::Response, Self::Error> {
        self.0.detect(&request.image)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: DetextArgs = argh::from_env();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    ort::init().with_name("detext").commit()?;

    let config = DetectorConfig {
        ops_library: args.ops_library,
        ..Default::default()
    };
    let model_bytes = std::fs::read(&args.model)?;
    let detector = TextDetector::from_memory(&model_bytes, &config)?;
    let engine = Arc::new(DetextEngine::new(DetectorModel(detector)));

    let app = Router::new()
        .route("/", get(|| async { "Welcome to Detext!" }))
        .route("/detections", post(post_detection))
        .route("/results", get(get_result))
        .with_state(engine);

    log::info!("🚀 Starting the server");
    log::info!("🔥 Listening on: {}", addr);
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
