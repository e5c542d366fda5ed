//! Frame-to-frame identity for hands and faces.
//!
//! Each frame's detections are matched to live tracks of the same side by
//! greedy global nearest neighbour on the reference point. Unmatched
//! detections spawn tracks; tracks unseen for longer than the staleness
//! bound are evicted. An evicted identity is never re-acquired: a hand that
//! comes back after eviction gets a new id.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::one_euro::FilterBank;
use crate::config::{Config, FilterConfig, TrackingConfig};
use crate::frame::{Frame, TrackedDetection};
use crate::landmark::{Detection, Point2, Side};

const SIDES: [Side; 3] = [Side::Left, Side::Right, Side::Face];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a live track. Eviction removes the track entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Matched or spawned in the latest frame
    Active,
    /// Missed at least one frame, not yet evicted
    Stale,
}

#[derive(Debug)]
pub struct Track {
    id: TrackId,
    side: Side,
    reference: Point2,
    last_seen_ms: f64,
    filters: FilterBank,
}

impl Track {
    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Last known reference point (palm centre / face centroid)
    pub fn reference(&self) -> Point2 {
        self.reference
    }

    pub fn last_seen_ms(&self) -> f64 {
        self.last_seen_ms
    }

    pub fn state(&self, now_ms: f64) -> TrackState {
        if now_ms <= self.last_seen_ms {
            TrackState::Active
        } else {
            TrackState::Stale
        }
    }

    fn observe(&mut self, detection: &Detection, reference: Point2, now_ms: f64) -> TrackedDetection {
        self.reference = reference;
        self.last_seen_ms = now_ms;
        TrackedDetection {
            track_id: self.id,
            side: self.side,
            keypoints: self.filters.apply(&detection.keypoints, now_ms),
            score: detection.score,
        }
    }
}

/// Owns every live track and its filter bank.
pub struct TrackAssigner {
    tracking: TrackingConfig,
    filter: FilterConfig,
    tracks: BTreeMap<TrackId, Track>,
    next_id: u64,
}

impl TrackAssigner {
    pub fn new(tracking: TrackingConfig, filter: FilterConfig) -> Self {
        Self {
            tracking,
            filter,
            tracks: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tracking, config.filter)
    }

    /// Assign ids to this frame's detections and smooth them.
    ///
    /// Returns one entry per matched or spawned track, in detection order.
    /// A malformed detection rejects the whole frame before any track is
    /// touched.
    pub fn update(&mut self, frame: &Frame) -> Result<Vec<TrackedDetection>> {
        let now = frame.timestamp_ms;
        anyhow::ensure!(now.is_finite(), "rejecting frame: timestamp {} ms is not finite", now);
        let references = frame
            .detections
            .iter()
            .enumerate()
            .map(|(i, det)| {
                det.reference_point()
                    .with_context(|| format!("rejecting frame at {} ms: detection {}", now, i))
            })
            .collect::<Result<Vec<_>>>()?;

        self.evict_stale(now);

        let threshold = self.tracking.threshold_px(frame.width, frame.height);
        let mut assigned: Vec<Option<TrackId>> = vec![None; frame.detections.len()];

        for side in SIDES {
            let det_indices: Vec<usize> = frame
                .detections
                .iter()
                .enumerate()
                .filter(|(_, det)| det.side == side)
                .map(|(i, _)| i)
                .collect();
            if det_indices.is_empty() {
                continue;
            }

            // BTreeMap order: ascending id
            let candidates: Vec<(TrackId, Point2)> = self
                .tracks
                .values()
                .filter(|t| t.side == side)
                .map(|t| (t.id, t.reference))
                .collect();
            let track_points: Vec<Point2> = candidates.iter().map(|(_, p)| *p).collect();
            let det_points: Vec<Point2> = det_indices.iter().map(|&i| references[i]).collect();

            for (ti, di) in greedy_match(&track_points, &det_points, threshold) {
                assigned[det_indices[di]] = Some(candidates[ti].0);
            }
        }

        let mut output = Vec::with_capacity(frame.detections.len());
        for (i, detection) in frame.detections.iter().enumerate() {
            let id = match assigned[i] {
                Some(id) => id,
                None => self.spawn(detection, references[i], now),
            };
            if let Some(track) = self.tracks.get_mut(&id) {
                output.push(track.observe(detection, references[i], now));
            }
        }
        Ok(output)
    }

    fn spawn(&mut self, detection: &Detection, reference: Point2, now_ms: f64) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        log::debug!(
            "spawn track {} ({:?}) at ({:.1}, {:.1})",
            id,
            detection.side,
            reference.x,
            reference.y
        );
        self.tracks.insert(
            id,
            Track {
                id,
                side: detection.side,
                reference,
                last_seen_ms: now_ms,
                filters: FilterBank::new(self.filter, detection.keypoints.len()),
            },
        );
        id
    }

    fn evict_stale(&mut self, now_ms: f64) {
        let bound = self.tracking.stale_after_ms();
        self.tracks.retain(|id, track| {
            let keep = now_ms - track.last_seen_ms <= bound;
            if !keep {
                log::debug!(
                    "evict track {} ({:?}), unseen for {:.0} ms",
                    id,
                    track.side,
                    now_ms - track.last_seen_ms
                );
            }
            keep
        });
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// `None` once the track has been evicted
    pub fn state_of(&self, id: TrackId, now_ms: f64) -> Option<TrackState> {
        self.tracks.get(&id).map(|t| t.state(now_ms))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Greedy global nearest-neighbour matching.
///
/// Repeatedly commits the closest remaining (track, detection) pair while its
/// distance is within `threshold`. Ties go to the lower track index, then the
/// lower detection index. Returns `(track_index, detection_index)` pairs.
pub fn greedy_match(tracks: &[Point2], detections: &[Point2], threshold: f32) -> Vec<(usize, usize)> {
    let mut track_used = vec![false; tracks.len()];
    let mut det_used = vec![false; detections.len()];
    let mut pairs = Vec::new();

    loop {
        let mut best: Option<(usize, usize, f32)> = None;
        for (ti, t) in tracks.iter().enumerate() {
            if track_used[ti] {
                continue;
            }
            for (di, d) in detections.iter().enumerate() {
                if det_used[di] {
                    continue;
                }
                let dist = t.distance(d);
                if best.map_or(true, |(_, _, b)| dist < b) {
                    best = Some((ti, di, dist));
                }
            }
        }

        match best {
            Some((ti, di, dist)) if dist <= threshold => {
                track_used[ti] = true;
                det_used[di] = true;
                pairs.push((ti, di));
            }
            _ => break,
        }
    }
    pairs
}
