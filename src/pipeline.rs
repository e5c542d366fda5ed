//! Per-frame driver between a landmark source and a renderer.

use anyhow::Result;

use crate::config::{Config, TrackingMode};
use crate::frame::{Frame, TrackedFrame};
use crate::tracker::TrackAssigner;

/// Supplies one frame of raw detections at a time. `None` ends the stream.
pub trait LandmarkSource {
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Consumes smoothed, identity-tagged frames.
pub trait LandmarkSink {
    fn present(&mut self, frame: &TrackedFrame) -> Result<()>;
}

/// 1秒ごとのFPS計測（フレーム時刻ベース）
#[derive(Debug, Default)]
pub struct FpsMeter {
    frames: u32,
    window_start_ms: Option<f64>,
    last_fps: Option<f32>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1秒経過ごとに新しいFPSを返す
    pub fn tick(&mut self, now_ms: f64) -> Option<f32> {
        let start = match self.window_start_ms {
            Some(start) => start,
            None => {
                self.window_start_ms = Some(now_ms);
                return None;
            }
        };
        self.frames += 1;
        let elapsed = now_ms - start;
        if elapsed < 1000.0 {
            return None;
        }
        let fps = (self.frames as f64 * 1000.0 / elapsed) as f32;
        self.frames = 0;
        self.window_start_ms = Some(now_ms);
        self.last_fps = Some(fps);
        Some(fps)
    }

    pub fn fps(&self) -> Option<f32> {
        self.last_fps
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub presented: u64,
    pub rejected: u64,
}

pub struct FramePipeline {
    mode: TrackingMode,
    assigner: TrackAssigner,
    fps: FpsMeter,
    stats: RunStats,
}

impl FramePipeline {
    pub fn new(mode: TrackingMode, assigner: TrackAssigner) -> Self {
        Self {
            mode,
            assigner,
            fps: FpsMeter::new(),
            stats: RunStats::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.app.mode, TrackAssigner::from_config(config))
    }

    pub fn assigner(&self) -> &TrackAssigner {
        &self.assigner
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Process one frame. A rejected frame yields `None` and leaves every
    /// track as it was; the next frame supersedes it.
    pub fn step(&mut self, mut frame: Frame) -> Option<TrackedFrame> {
        self.stats.frames += 1;
        if let Some(fps) = self.fps.tick(frame.timestamp_ms) {
            log::info!("{:.1} FPS, {} live tracks", fps, self.assigner.len());
        }

        let mode = self.mode;
        frame.detections.retain(|det| mode.accepts(det.side));

        match self.assigner.update(&frame) {
            Ok(detections) => Some(TrackedFrame {
                timestamp_ms: frame.timestamp_ms,
                width: frame.width,
                height: frame.height,
                detections,
            }),
            Err(e) => {
                self.stats.rejected += 1;
                log::warn!("{:#}", e);
                None
            }
        }
    }

    /// Drive until the source is exhausted.
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<RunStats>
    where
        S: LandmarkSource + ?Sized,
        K: LandmarkSink + ?Sized,
    {
        while let Some(frame) = source.next_frame()? {
            if let Some(tracked) = self.step(frame) {
                sink.present(&tracked)?;
                self.stats.presented += 1;
            }
        }
        Ok(self.stats)
    }
}
