/// Trait for inference models that can be driven by the [`DetextEngine`].
///
/// Implementors define the request and response types and the synchronous
/// inference logic. A model holds no per-call state; the same instance serves
/// repeated requests without reconstruction.
///
/// [`DetextEngine`]: crate::engine::DetextEngine
pub trait DetextModel {
    /// The request type that the model accepts for inference.
    type Request;
    /// The response type that the model returns after inference.
    type Response;
    /// The error type that can be returned during inference.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs inference on the given request and returns a response or error.
    fn run(&mut self, request: Self::Request) -> Result<Self::Response, Self::Error>;
}

/// Trait for extracting lightweight metadata from inference requests.
///
/// This allows the engine to report what a request was about (paths, buffer
/// lengths) without cloning heavy data like image buffers.
pub trait RequestMetadata {
    /// The lightweight metadata type that represents the request.
    type Metadata: Send + 'static;

    /// Extracts lightweight metadata from the request.
    /// This should avoid cloning heavy data like images.
    fn metadata(&self) -> Self::Metadata;
}
