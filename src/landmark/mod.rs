pub mod detection;
pub mod face;
pub mod hand;
pub mod keypoint;

pub use detection::{Detection, Layout, Side};
pub use face::FaceRegion;
pub use hand::{HandLandmark, HAND_CONNECTIONS, PALM_LANDMARKS};
pub use keypoint::{Keypoint, Point2};
