use serde::{Deserialize, Serialize};

/// 単一キーポイント（ピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// 奥行き（モデルが出力する場合のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// 信頼度スコア (0.0〜1.0)
    #[serde(default, alias = "score", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            confidence: None,
        }
    }

    pub fn with_depth(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f32::is_finite)
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// 2D 位置（トラックの基準点など）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 点群の重心。空なら None
    pub fn centroid<I: IntoIterator<Item = Point2>>(points: I) -> Option<Point2> {
        let (sum_x, sum_y, n) = points
            .into_iter()
            .fold((0.0f32, 0.0f32, 0usize), |(sx, sy, n), p| (sx + p.x, sy + p.y, n + 1));
        if n == 0 {
            return None;
        }
        Some(Point2::new(sum_x / n as f32, sum_y / n as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_is_finite() {
        assert!(Keypoint::new(1.0, 2.0).with_depth(-3.0).is_finite());
        assert!(!Keypoint::new(f32::NAN, 2.0).is_finite());
        assert!(!Keypoint::new(1.0, 2.0).with_depth(f32::INFINITY).is_finite());
    }

    #[test]
    fn test_point_distance() {
        let a = Point2::new(100.0, 100.0);
        let b = Point2::new(105.0, 102.0);
        assert!((a.distance(&b) - 29.0f32.sqrt()).abs() < 1e-5);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_centroid() {
        let c = Point2::centroid([Point2::new(0.0, 0.0), Point2::new(2.0, 4.0)]).unwrap();
        assert_eq!(c, Point2::new(1.0, 2.0));
        assert!(Point2::centroid(std::iter::empty()).is_none());
    }

    #[test]
    fn test_keypoint_deserialize_score_alias() {
        let kp: Keypoint = serde_json::from_str(r#"{"x": 1.5, "y": 2.5, "score": 0.9}"#).unwrap();
        assert_eq!(kp.x, 1.5);
        assert_eq!(kp.z, None);
        assert_eq!(kp.confidence, Some(0.9));
    }
}
