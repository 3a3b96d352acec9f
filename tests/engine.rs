use std::{
    thread,
    time::{Duration, Instant},
};

use detext::{DetextEngine, DetextEngineResult, DetextEngineState, DetextModel, RequestMetadata};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct StubError(String);

/// Reverses the payload; fails on an empty one.
struct StubModel;

struct StubRequest {
    payload: Vec<u8>,
    label: &'static str,
}

struct StubMetadata {
    label: &'static str,
    input_len: usize,
}

impl RequestMetadata for StubRequest {
    type Metadata = StubMetadata;

    fn metadata(&self) -> Self::Metadata {
        StubMetadata {
            label: self.label,
            input_len: self.payload.len(),
        }
    }
}

impl DetextModel for StubModel {
    type Request = StubRequest;
    type Response = Vec<u8>;
    type Error = StubError;

    fn run(&mut self, request: Self::Request) -> Result<Self::Response, Self::Error> {
        if request.payload.is_empty() {
            return Err(StubError("nothing to process".to_string()));
        }
        let mut out = request.payload;
        out.reverse();
        Ok(out)
    }
}

fn poll_until_settled(engine: &DetextEngine<StubModel>) -> DetextEngineResult<StubModel> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match engine.try_poll_response() {
            DetextEngineResult::Empty(_) if Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(5));
            }
            other => return other,
        }
    }
}

#[test]
fn fresh_engine_is_idle_with_no_results() {
    let engine = DetextEngine::new(StubModel);
    assert_eq!(engine.state(), DetextEngineState::Idle);
    match engine.try_poll_response() {
        DetextEngineResult::Empty(state) => assert_eq!(state.as_str(), "idle"),
        _ => panic!("fresh engine should have no results"),
    }
}

#[test]
fn engine_serves_repeated_requests_off_one_model() {
    let engine = DetextEngine::new(StubModel);

    for round in 0..3u8 {
        engine.schedule_inference(StubRequest {
            payload: vec![1, 2, 3],
            label: "sample",
        });

        match poll_until_settled(&engine) {
            DetextEngineResult::Success(response) => {
                assert_eq!(response.id, round);
                assert_eq!(response.response, vec![3, 2, 1]);
                assert_eq!(response.request_metadata.label, "sample");
                assert_eq!(response.request_metadata.input_len, 3);
            }
            _ => panic!("expected a success response"),
        }
    }
}

#[test]
fn failed_request_leaves_engine_serving() {
    let engine = DetextEngine::new(StubModel);

    engine.schedule_inference(StubRequest {
        payload: vec![],
        label: "empty",
    });
    match poll_until_settled(&engine) {
        DetextEngineResult::Failure(failure) => {
            assert_eq!(failure.request_metadata.label, "empty");
            assert_eq!(failure.request_metadata.input_len, 0);
            assert!(failure.error.contains("nothing to process"));
        }
        _ => panic!("expected a failure report"),
    }

    engine.schedule_inference(StubRequest {
        payload: vec![7],
        label: "after-failure",
    });
    match poll_until_settled(&engine) {
        DetextEngineResult::Success(response) => assert_eq!(response.response, vec![7]),
        _ => panic!("engine should keep serving after a failure"),
    }
}

#[test]
fn stop_is_idempotent_and_final() {
    let mut engine = DetextEngine::new(StubModel);

    engine.schedule_inference(StubRequest {
        payload: vec![9],
        label: "last",
    });
    engine.stop();
    engine.stop();

    // the request scheduled before stop still completed
    match engine.try_poll_response() {
        DetextEngineResult::Success(response) => assert_eq!(response.response, vec![9]),
        _ => panic!("request scheduled before stop should complete"),
    }

    // scheduling after stop is a no-op; polling reports the closed engine
    engine.schedule_inference(StubRequest {
        payload: vec![1],
        label: "late",
    });
    match engine.try_poll_response() {
        DetextEngineResult::Error(_) => {}
        _ => panic!("stopped engine should report a disconnect"),
    }
}
