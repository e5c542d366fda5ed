use serde::{Deserialize, Serialize};

use crate::landmark::{Detection, Keypoint, Side};
use crate::tracker::TrackId;

/// ランドマークモデルから届く1フレーム分の入力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// フレーム時刻（ミリ秒、単調増加を想定）
    pub timestamp_ms: f64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(timestamp_ms: f64, width: u32, height: u32, detections: Vec<Detection>) -> Self {
        Self {
            timestamp_ms,
            width,
            height,
            detections,
        }
    }
}

/// トラックIDつきの平滑化済み検出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDetection {
    pub track_id: TrackId,
    pub side: Side,
    pub keypoints: Vec<Keypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// レンダラーに渡す1フレーム分の出力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFrame {
    pub timestamp_ms: f64,
    pub width: u32,
    pub height: u32,
    pub detections: Vec<TrackedDetection>,
}
