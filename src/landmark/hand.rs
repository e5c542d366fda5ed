/// 手のランドマーク 21 点のインデックス（MediaPipe Hands 準拠）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub const COUNT: usize = 21;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// 手のひら中心の算出に使う点（手首 + 4指のMCP）
pub const PALM_LANDMARKS: [HandLandmark; 5] = [
    HandLandmark::Wrist,
    HandLandmark::IndexMcp,
    HandLandmark::MiddleMcp,
    HandLandmark::RingMcp,
    HandLandmark::PinkyMcp,
];

/// 骨格の接続定義 (開始, 終了)
pub const HAND_CONNECTIONS: [(HandLandmark, HandLandmark); 21] = {
    use HandLandmark::*;
    [
        // 親指
        (Wrist, ThumbCmc),
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // 人差し指
        (Wrist, IndexMcp),
        (IndexMcp, IndexPip),
        (IndexPip, IndexDip),
        (IndexDip, IndexTip),
        // 中指
        (IndexMcp, MiddleMcp),
        (MiddleMcp, MiddlePip),
        (MiddlePip, MiddleDip),
        (MiddleDip, MiddleTip),
        // 薬指
        (MiddleMcp, RingMcp),
        (RingMcp, RingPip),
        (RingPip, RingDip),
        (RingDip, RingTip),
        // 小指
        (RingMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palm_indices() {
        let indices: Vec<usize> = PALM_LANDMARKS.iter().map(|lm| lm.index()).collect();
        assert_eq!(indices, vec![0, 5, 9, 13, 17]);
        assert_eq!(HandLandmark::PinkyTip.index(), HandLandmark::COUNT - 1);
    }

    #[test]
    fn test_connections_cover_every_landmark() {
        let mut seen = [false; HandLandmark::COUNT];
        for (a, b) in HAND_CONNECTIONS {
            seen[a.index()] = true;
            seen[b.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
