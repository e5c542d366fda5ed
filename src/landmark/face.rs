//! Face mesh region lookup for renderers that colour landmarks by feature.

const EYES: [usize; 8] = [33, 133, 159, 145, 263, 362, 386, 374];
const EYEBROWS: [usize; 8] = [46, 52, 65, 55, 276, 282, 295, 285];

/// Facial feature a face-mesh landmark belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceRegion {
    Lips,
    Eyes,
    Eyebrows,
    Other,
}

impl FaceRegion {
    /// Lips take precedence over eyes, eyes over eyebrows.
    pub fn classify(index: usize) -> Self {
        if matches!(index, 61..=80 | 308..=324 | 402..=415) {
            Self::Lips
        } else if EYES.contains(&index) {
            Self::Eyes
        } else if EYEBROWS.contains(&index) {
            Self::Eyebrows
        } else {
            Self::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_lips() {
        assert_eq!(FaceRegion::classify(61), FaceRegion::Lips);
        assert_eq!(FaceRegion::classify(324), FaceRegion::Lips);
        assert_eq!(FaceRegion::classify(410), FaceRegion::Lips);
    }

    #[test]
    fn test_classify_eyes_and_brows() {
        assert_eq!(FaceRegion::classify(33), FaceRegion::Eyes);
        assert_eq!(FaceRegion::classify(374), FaceRegion::Eyes);
        assert_eq!(FaceRegion::classify(46), FaceRegion::Eyebrows);
        assert_eq!(FaceRegion::classify(285), FaceRegion::Eyebrows);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(FaceRegion::classify(0), FaceRegion::Other);
        assert_eq!(FaceRegion::classify(81), FaceRegion::Other);
        assert_eq!(FaceRegion::classify(467), FaceRegion::Other);
    }
}
