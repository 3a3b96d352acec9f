use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionRequest {
    pub image_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionResponse {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration: Duration,
}
