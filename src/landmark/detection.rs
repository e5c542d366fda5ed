use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use super::hand::{HandLandmark, PALM_LANDMARKS};
use super::keypoint::{Keypoint, Point2};

/// 検出の左右ラベル。`Face` はシングル顔モード用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Face,
}

impl Side {
    pub fn is_hand(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// このラベルで受け付けるランドマーク配置
    pub fn layouts(self) -> &'static [Layout] {
        match self {
            Side::Left | Side::Right => &[Layout::Hand],
            Side::Face => &[Layout::FaceMesh, Layout::FaceMeshRefined],
        }
    }
}

/// ランドマークの固定配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// 21 点
    Hand,
    /// 468 点
    FaceMesh,
    /// 虹彩つき 478 点
    FaceMeshRefined,
}

impl Layout {
    pub fn keypoint_count(self) -> usize {
        match self {
            Layout::Hand => HandLandmark::COUNT,
            Layout::FaceMesh => 468,
            Layout::FaceMeshRefined => 478,
        }
    }
}

/// 1フレーム分、1エンティティ分の検出結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub side: Side,
    pub keypoints: Vec<Keypoint>,
    /// 検出全体の信頼度
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Detection {
    pub fn new(side: Side, keypoints: Vec<Keypoint>) -> Self {
        Self {
            side,
            keypoints,
            score: None,
        }
    }

    /// 配置と座標をチェックする。違反は上流モデルの契約違反なのでフレームごと破棄する
    pub fn validate(&self) -> Result<()> {
        let count = self.keypoints.len();
        ensure!(
            self.side
                .layouts()
                .iter()
                .any(|layout| layout.keypoint_count() == count),
            "{:?} detection has {} keypoints, expected one of {:?}",
            self.side,
            count,
            self.side
                .layouts()
                .iter()
                .map(|l| l.keypoint_count())
                .collect::<Vec<_>>()
        );
        if let Some(index) = self.keypoints.iter().position(|kp| !kp.is_finite()) {
            anyhow::bail!(
                "{:?} detection has a non-finite coordinate at keypoint {}",
                self.side,
                index
            );
        }
        Ok(())
    }

    /// トラック照合用の基準点。手は手のひら中心、顔は全点の重心
    pub fn reference_point(&self) -> Result<Point2> {
        self.validate()?;
        let centroid = if self.side.is_hand() {
            Point2::centroid(
                PALM_LANDMARKS
                    .iter()
                    .map(|lm| self.keypoints[lm.index()].position()),
            )
        } else {
            Point2::centroid(self.keypoints.iter().map(Keypoint::position))
        };
        centroid.ok_or_else(|| anyhow::anyhow!("{:?} detection has no keypoints", self.side))
    }
}
