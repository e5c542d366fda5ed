use crate::config::FilterConfig;
use crate::landmark::Keypoint;

/// Smallest elapsed time between samples (ms)
const MIN_DT_MS: f64 = 1.0;

/// alpha = 1 / (1 + tau/Te), tau = 1/(2*pi*fc)
fn smoothing_factor(te: f32, cutoff: f32) -> f32 {
    let tau = 1.0 / (2.0 * std::f32::consts::PI * cutoff);
    1.0 / (1.0 + tau / te)
}

/// Per-channel filter state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OneEuroState {
    #[default]
    Fresh,
    Primed {
        value: f32,
        derivative: f32,
        timestamp_ms: f64,
    },
}

impl OneEuroState {
    /// Consume one sample and return the next state with the smoothed value.
    pub fn step(self, config: &FilterConfig, value: f32, timestamp_ms: f64) -> (Self, f32) {
        let (prev, prev_dx, prev_t) = match self {
            OneEuroState::Fresh => {
                let next = OneEuroState::Primed {
                    value,
                    derivative: 0.0,
                    timestamp_ms,
                };
                return (next, value);
            }
            OneEuroState::Primed {
                value,
                derivative,
                timestamp_ms,
            } => (value, derivative, timestamp_ms),
        };

        let te = ((timestamp_ms - prev_t).max(MIN_DT_MS) / 1000.0) as f32;

        let dx = (value - prev) / te;
        let a_d = smoothing_factor(te, config.d_cutoff);
        let dx_hat = a_d * dx + (1.0 - a_d) * prev_dx;

        let cutoff = config.min_cutoff + config.beta * dx_hat.abs();
        let a = smoothing_factor(te, cutoff);
        let x_hat = a * value + (1.0 - a) * prev;

        let next = OneEuroState::Primed {
            value: x_hat,
            derivative: dx_hat,
            timestamp_ms,
        };
        (next, x_hat)
    }
}

/// One Euro Filter for a single scalar channel
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    config: FilterConfig,
    state: OneEuroState,
}

impl OneEuroFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            state: OneEuroState::Fresh,
        }
    }

    pub fn filter(&mut self, value: f32, timestamp_ms: f64) -> f32 {
        let (next, out) = self.state.step(&self.config, value, timestamp_ms);
        self.state = next;
        out
    }

    pub fn state(&self) -> OneEuroState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = OneEuroState::Fresh;
    }
}

/// One track's filters: an (x, y) pair per keypoint index.
/// Depth and confidence pass through unfiltered.
#[derive(Debug, Clone)]
pub struct FilterBank {
    config: FilterConfig,
    channels: Vec<[OneEuroFilter; 2]>,
}

impl FilterBank {
    pub fn new(config: FilterConfig, keypoint_count: usize) -> Self {
        Self {
            config,
            channels: (0..keypoint_count)
                .map(|_| std::array::from_fn(|_| OneEuroFilter::new(config)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn apply(&mut self, keypoints: &[Keypoint], timestamp_ms: f64) -> Vec<Keypoint> {
        if keypoints.len() > self.channels.len() {
            let config = self.config;
            self.channels.resize_with(keypoints.len(), || {
                std::array::from_fn(|_| OneEuroFilter::new(config))
            });
        }

        keypoints
            .iter()
            .zip(self.channels.iter_mut())
            .map(|(kp, [fx, fy])| Keypoint {
                x: fx.filter(kp.x, timestamp_ms),
                y: fy.filter(kp.y, timestamp_ms),
                ..*kp
            })
            .collect()
    }
}
