//! Scenario tests against a real model artifact.
//!
//! The model is not bundled with the repository. Point `DETEXT_MODEL` at the
//! ONNX file (and `DETEXT_OPS_LIBRARY` at the custom-operator library if the
//! model needs one), then run with `cargo test -- --ignored`.

use std::io::Cursor;

use detext::{DetectError, DetectorConfig, TextDetector};

fn detector_from_env() -> TextDetector {
    let model = std::env::var_os("DETEXT_MODEL").expect("DETEXT_MODEL must point at the model");
    let config = DetectorConfig {
        ops_library: std::env::var_os("DETEXT_OPS_LIBRARY").map(Into::into),
        ..Default::default()
    };
    TextDetector::from_file(model, &config).expect("model should load into a session")
}

fn sample_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        image::Rgb([(x * 4) as u8, (y * 4) as u8, 128])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .unwrap();
    bytes
}

#[test]
#[ignore = "needs a model artifact, see module docs"]
fn detect_round_trips_to_a_decodable_image() {
    let mut detector = detector_from_env();

    let detection = detector
        .detect(&sample_jpeg())
        .expect("detection should succeed");
    let decoded = detection.decode().expect("output should decode");
    assert!(decoded.width() > 0);
    assert!(decoded.height() > 0);

    // the session serves repeated calls without reconstruction
    detector
        .detect(&sample_jpeg())
        .expect("second detection should succeed");
}

#[test]
#[ignore = "needs a model artifact, see module docs"]
fn bad_input_is_reported_and_session_survives() {
    let mut detector = detector_from_env();

    assert!(matches!(detector.detect(&[]), Err(DetectError::EmptyInput)));
    assert!(detector.detect(&[0x00, 0x01, 0x02]).is_err());

    detector
        .detect(&sample_jpeg())
        .expect("session should remain usable after failed calls");
}
