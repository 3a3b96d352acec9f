use std::{
    sync::{Arc, Mutex, mpsc},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::model::{DetextModel, RequestMetadata};

// Type aliases to simplify complex types
type EngineMetadata<M> = <<M as DetextModel>::Request as RequestMetadata>::Metadata;

type EngineReply<M> = Result<
    DetextEngineResponse<EngineMetadata<M>, <M as DetextModel>::Response>,
    DetextEngineFailure<EngineMetadata<M>>,
>;

type EngineReceiver<M> = Arc<Mutex<mpsc::Receiver<EngineReply<M>>>>;

/// Represents the current state of the inference engine.
#[derive(Clone, Debug, PartialEq)]
pub enum DetextEngineState {
    /// The engine is idle and ready to accept new inference requests.
    Idle,
    /// The engine is currently processing an inference request.
    Processing,
}

impl DetextEngineState {
    /// Returns the state as a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetextEngineState::Idle => "idle",
            DetextEngineState::Processing => "processing",
        }
    }
}

/// Internal request wrapper used by the engine to track inference requests.
pub struct DetextEngineRequest<Req> {
    /// Unique identifier for this inference request.
    pub id: u8,
    /// The actual request data to be processed by the model.
    pub request: Req,
}

/// Response returned by the engine containing both the model's response and telemetry data.
pub struct DetextEngineResponse<Metadata, Res> {
    /// Unique identifier matching the original request.
    pub id: u8,
    /// Timestamp when the inference started.
    pub start_time: Instant,
    /// Total time taken for the inference.
    pub duration: Duration,
    /// Lightweight metadata extracted from the original request.
    pub request_metadata: Metadata,
    /// The actual response from the model.
    pub response: Res,
}

/// Failure report for a single inference request.
///
/// A failed request leaves the engine running; the worker returns to idle and
/// keeps serving subsequent requests.
pub struct DetextEngineFailure<Metadata> {
    /// Unique identifier matching the original request.
    pub id: u8,
    /// Lightweight metadata extracted from the original request.
    pub request_metadata: Metadata,
    /// Description of what went wrong inside the model.
    pub error: String,
}

/// Result type returned when polling for inference results.
pub enum DetextEngineResult<M: DetextModel + Send + 'static>
where
    M::Request: RequestMetadata,
{
    /// Successful inference with the response data.
    Success(DetextEngineResponse<EngineMetadata<M>, M::Response>),
    /// A single request failed; the engine is still serving.
    Failure(DetextEngineFailure<EngineMetadata<M>>),
    /// No result available yet, with current engine state.
    Empty(DetextEngineState),
    /// The engine is no longer operational (worker gone, channel closed).
    Error(String),
}

/// Inference engine that manages model execution in a separate thread.
///
/// The engine owns the model for its entire lifetime: the model is moved to a
/// background worker at construction and released exactly once when the
/// engine is stopped or dropped. Requests are scheduled without blocking and
/// results are collected by polling, with built-in telemetry and request
/// tracking. Only one request is processed at a time.
pub struct DetextEngine<M: DetextModel + Send + 'static>
where
    M::Request: Send + RequestMetadata + 'static,
    M::Response: Send + 'static,
{
    state: Arc<Mutex<DetextEngineState>>,
    req_tx: Option<mpsc::Sender<DetextEngineRequest<M::Request>>>,
    rep_rx: EngineReceiver<M>,
    inference_handle: Option<JoinHandle<()>>,
    id_counter: Arc<Mutex<u8>>,
}

impl<M: DetextModel + Send + 'static> DetextEngine<M>
where
    M::Request: Send + RequestMetadata + 'static,
    M::Response: Send + 'static,
{
    /// Creates a new inference engine with the given model.
    ///
    /// The engine will spawn a background thread to handle inference requests.
    /// The model will be moved to this background thread.
    ///
    /// A model error fails only the request that triggered it; the worker
    /// reports the failure through the reply channel and keeps running.
    ///
    /// # Arguments
    /// * `model` - The model implementation that will handle inference requests
    ///
    /// # Returns
    /// A new `DetextEngine` instance ready to accept inference requests
    pub fn new(mut model: M) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<DetextEngineRequest<M::Request>>();
        let (rep_tx, rep_rx) = mpsc::channel::<EngineReply<M>>();
        let state = Arc::new(Mutex::new(DetextEngineState::Idle));

        let inference_handle = std::thread::spawn({
            let state = state.clone();
            move || {
                while let Ok(req) = req_rx.recv() {
                    log::debug!("Scheduling a new inference");

                    // Extract lightweight metadata before consuming the request
                    let request_metadata = req.request.metadata();

                    *state.lock().unwrap() = DetextEngineState::Processing;
                    let start_time = Instant::now();

                    match model.run(req.request) {
                        Ok(response) => {
                            log::debug!("Inference completed");

                            let _ = rep_tx.send(Ok(DetextEngineResponse {
                                id: req.id,
                                start_time,
                                duration: start_time.elapsed(),
                                request_metadata,
                                response,
                            }));
                        }
                        Err(err) => {
                            log::warn!("Inference failed: {err}");

                            let _ = rep_tx.send(Err(DetextEngineFailure {
                                id: req.id,
                                request_metadata,
                                error: err.to_string(),
                            }));
                        }
                    }

                    *state.lock().unwrap() = DetextEngineState::Idle;
                }
            }
        });

        Self {
            state,
            req_tx: Some(req_tx),
            rep_rx: Arc::new(Mutex::new(rep_rx)),
            inference_handle: Some(inference_handle),
            id_counter: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns the current state of the inference engine.
    pub fn state(&self) -> DetextEngineState {
        self.state.lock().unwrap().clone()
    }

    /// Attempts to retrieve a completed inference result without blocking.
    ///
    /// # Returns
    /// * `Success` - Contains the inference response with telemetry data
    /// * `Failure` - The request failed; the engine accepts further requests
    /// * `Empty` - No result available yet, includes current engine state
    /// * `Error` - The engine worker is gone and no further results will come
    pub fn try_poll_response(&self) -> DetextEngineResult<M> {
        match self.rep_rx.lock().unwrap().try_recv() {
            Ok(Ok(response)) => DetextEngineResult::Success(response),
            Ok(Err(failure)) => DetextEngineResult::Failure(failure),
            Err(mpsc::TryRecvError::Empty) => DetextEngineResult::Empty(self.state()),
            Err(mpsc::TryRecvError::Disconnected) => {
                log::error!("Response channel disconnected");
                DetextEngineResult::Error("Response channel disconnected".to_string())
            }
        }
    }

    /// Schedules an inference request for asynchronous processing.
    ///
    /// The request will be queued and processed by the background thread.
    /// Each request is assigned a unique ID for tracking purposes. After
    /// [`stop`](Self::stop) this is a no-op; no inference is ever attempted
    /// on a released engine.
    ///
    /// # Arguments
    /// * `request` - The inference request to be processed by the model
    pub fn schedule_inference(&self, request: M::Request) {
        if let Some(tx) = &self.req_tx {
            let mut id_counter = self.id_counter.lock().unwrap();
            let id = *id_counter;
            *id_counter = id_counter.wrapping_add(1);
            let _ = tx.send(DetextEngineRequest { id, request });
        }
    }

    /// Stops the inference engine and shuts down the background thread.
    ///
    /// This method will close the request channel and wait for the background
    /// thread to finish processing any remaining requests. Calling it again
    /// is a no-op.
    pub fn stop(&mut self) {
        self.req_tx.take();
        if let Some(handle) = self.inference_handle.take() {
            let _ = handle.join();
        }
    }
}

impl<M: DetextModel + Send + 'static> Drop for DetextEngine<M>
where
    M::Request: Send + RequestMetadata + 'static,
    M::Response: Send + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_as_str() {
        assert_eq!(DetextEngineState::Idle.as_str(), "idle");
        assert_eq!(DetextEngineState::Processing.as_str(), "processing");
    }
}
