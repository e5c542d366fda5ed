use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::landmark::Side;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// 処理対象の切り替え
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    Face,
    #[default]
    Hands,
    Both,
}

impl TrackingMode {
    pub fn accepts(self, side: Side) -> bool {
        match self {
            TrackingMode::Face => side == Side::Face,
            TrackingMode::Hands => side.is_hand(),
            TrackingMode::Both => true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: TrackingMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrackingConfig {
    /// 照合距離の閾値（フレームの長辺に対する比率）
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
    /// 想定フレーム間隔（ミリ秒）
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: f64,
    /// 何フレーム分見失ったらトラックを破棄するか
    #[serde(default = "default_stale_frames")]
    pub stale_frames: f64,
}

fn default_match_threshold() -> f32 { 0.08 }
fn default_frame_interval_ms() -> f64 { 33.0 }
fn default_stale_frames() -> f64 { 6.0 }

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            frame_interval_ms: default_frame_interval_ms(),
            stale_frames: default_stale_frames(),
        }
    }
}

impl TrackingConfig {
    /// 破棄までの猶予（ミリ秒）
    pub fn stale_after_ms(&self) -> f64 {
        self.frame_interval_ms * self.stale_frames
    }

    /// フレームサイズに対する照合閾値（ピクセル）
    pub fn threshold_px(&self, width: u32, height: u32) -> f32 {
        self.match_threshold * width.max(height) as f32
    }
}

/// One Euro Filter パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FilterConfig {
    /// 静止時のカットオフ周波数 (Hz)。大きいほど平滑化が弱い
    #[serde(default = "default_min_cutoff")]
    pub min_cutoff: f32,
    /// 速度係数。大きいほど高速移動時の遅延が小さい
    #[serde(default = "default_beta")]
    pub beta: f32,
    /// 微分値に対するカットオフ周波数 (Hz)
    #[serde(default = "default_d_cutoff")]
    pub d_cutoff: f32,
}

fn default_min_cutoff() -> f32 { 1.0 }
fn default_beta() -> f32 { 0.007 }
fn default_d_cutoff() -> f32 { 1.0 }

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_cutoff: default_min_cutoff(),
            beta: default_beta(),
            d_cutoff: default_d_cutoff(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 読み込めなければデフォルト設定
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("{} not found, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let t = &self.tracking;
        anyhow::ensure!(
            t.match_threshold > 0.0,
            "tracking.match_threshold must be positive, got {}",
            t.match_threshold
        );
        anyhow::ensure!(
            t.frame_interval_ms > 0.0 && t.stale_frames > 0.0,
            "tracking.frame_interval_ms and tracking.stale_frames must be positive"
        );
        let f = &self.filter;
        anyhow::ensure!(
            f.min_cutoff > 0.0 && f.d_cutoff > 0.0 && f.beta >= 0.0,
            "filter cutoffs must be positive and beta non-negative"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.app.mode, TrackingMode::Hands);
        assert_eq!(config.tracking, TrackingConfig::default());
        assert_eq!(config.filter, FilterConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [app]
            mode = "both"

            [tracking]
            frame_interval_ms = 16.0

            [filter]
            beta = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.app.mode, TrackingMode::Both);
        assert_eq!(config.tracking.frame_interval_ms, 16.0);
        assert_eq!(config.tracking.stale_frames, 6.0);
        assert_eq!(config.filter.beta, 0.5);
        assert_eq!(config.filter.min_cutoff, 1.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::parse("[tracking]\nmatch_threshold = 0.0").is_err());
        assert!(Config::parse("[filter]\nmin_cutoff = -1.0").is_err());
        assert!(Config::parse("[app]\nmode = \"feet\"").is_err());
    }

    #[test]
    fn test_mode_accepts() {
        assert!(TrackingMode::Hands.accepts(Side::Left));
        assert!(!TrackingMode::Hands.accepts(Side::Face));
        assert!(TrackingMode::Face.accepts(Side::Face));
        assert!(!TrackingMode::Face.accepts(Side::Right));
        assert!(TrackingMode::Both.accepts(Side::Face));
        assert!(TrackingMode::Both.accepts(Side::Right));
    }

    #[test]
    fn test_stale_after_ms() {
        let t = TrackingConfig::default();
        assert!((t.stale_after_ms() - 198.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_uses_longer_side() {
        let t = TrackingConfig::default();
        assert!((t.threshold_px(640, 360) - 51.2).abs() < 1e-4);
        assert!((t.threshold_px(360, 640) - 51.2).abs() < 1e-4);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("definitely/not/here.toml");
        assert_eq!(config.tracking, TrackingConfig::default());
    }
}
