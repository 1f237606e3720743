//! Hand landmark frames as delivered by a hand-tracking provider.
//!
//! 21 points per hand in the usual camera-space hand topology, normalized
//! so x and y are roughly in [0, 1] (y grows downward) and z is relative
//! depth.

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// Wrist plus the four finger-base joints; their mean is the palm centre.
pub const PALM_POINTS: [usize; 5] = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// Non-thumb fingertips paired with their middle (PIP) joints.
pub const FINGER_TIPS_AND_PIPS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

pub const ALL_TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl HandLandmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        HandLandmark { x, y, z }
    }

    pub fn distance(&self, other: &HandLandmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// One detected hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandLandmarkFrame {
    pub points: [HandLandmark; LANDMARK_COUNT],
}

/// One provider sample: `None` means no hand was detected.
pub type HandSample = Option<HandLandmarkFrame>;

impl HandLandmarkFrame {
    /// Build from a flat list; `None` unless exactly 21 points are given.
    pub fn from_points(points: &[HandLandmark]) -> Option<Self> {
        let points: [HandLandmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(HandLandmarkFrame { points })
    }

    pub fn point(&self, index: usize) -> HandLandmark {
        self.points[index]
    }

    // ── synthetic poses ──────────────────────────────────────────────────
    //
    // Used by the simulated tracker and by tests.  Coordinates describe an
    // upright right hand seen by a camera, palm centred at `palm_x`.

    /// Fingers spread and straight up.
    pub fn open_hand(palm_x: f32) -> Self {
        const OPEN: [(f32, f32); LANDMARK_COUNT] = [
            (0.50, 0.80),                                           // wrist
            (0.45, 0.76), (0.41, 0.71), (0.38, 0.66), (0.35, 0.62), // thumb
            (0.44, 0.60), (0.44, 0.50), (0.44, 0.45), (0.44, 0.40), // index
            (0.48, 0.60), (0.48, 0.50), (0.48, 0.45), (0.48, 0.40), // middle
            (0.52, 0.60), (0.52, 0.50), (0.52, 0.45), (0.52, 0.40), // ring
            (0.56, 0.60), (0.56, 0.50), (0.56, 0.45), (0.56, 0.40), // pinky
        ];
        let shift = palm_x - 0.5;
        let mut points = [HandLandmark::default(); LANDMARK_COUNT];
        for (p, &(x, y)) in points.iter_mut().zip(OPEN.iter()) {
            *p = HandLandmark::new(x + shift, y, 0.0);
        }
        HandLandmarkFrame { points }
    }

    /// Open hand with the thumb tip touching the index tip.
    pub fn pinching(palm_x: f32) -> Self {
        let mut frame = Self::open_hand(palm_x);
        let index_tip = frame.points[INDEX_TIP];
        frame.points[THUMB_TIP] = HandLandmark::new(index_tip.x + 0.01, index_tip.y + 0.01, 0.0);
        frame
    }
}
