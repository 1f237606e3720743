//! Gesture interpretation: hand landmarks to steering and a draw trigger.
//!
//! Pure computation on [`HandLandmarkFrame`]s; nothing here knows which
//! provider produced the frame.
//!
//! * **Steering**: the palm centre's horizontal position, with a dead zone
//!   around the middle of the view, gives an intensity in [-1, 1]
//!   (positive = right).
//! * **Draw trigger**: a permissive "pinch" that accepts any of five hand
//!   shapes (thumb to index, thumb to middle, fist, curled fingers, bunched
//!   fingertips).  [`PinchEdge`] turns it into a single event per pinch.

use crate::landmarks::{
    HandLandmark, HandLandmarkFrame, ALL_TIPS, FINGER_TIPS_AND_PIPS, INDEX_TIP, MIDDLE_TIP,
    PALM_POINTS, THUMB_TIP, WRIST,
};

// ════════════════════════════════════════════════════════════════════════════
// Thresholds (normalized landmark units)
// ════════════════════════════════════════════════════════════════════════════

/// Thumb tip to index or middle tip.
pub const PINCH_DISTANCE:   f32 = 0.06;
/// Mean fingertip distance to the wrist for a closed fist.
pub const FIST_DISTANCE:    f32 = 0.15;
/// Max fingertip distance from the fingertip centroid for bunched fingers.
pub const CLUSTER_DISTANCE: f32 = 0.06;
/// Fingers (of four) that must be curled.
pub const CURLED_FINGERS:   usize = 3;

const EDGE_TOLERANCE: f32 = 1e-6;

// ════════════════════════════════════════════════════════════════════════════
// DeadZone
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeadZone {
    /// ±0.05 around the centre.
    Tight,
    /// ±0.2 around the centre.
    Relaxed,
    /// Any half-width, clamped to [0, 0.49].
    Custom(f32),
}

impl DeadZone {
    pub fn half_width(self) -> f32 {
        match self {
            DeadZone::Tight     => 0.05,
            DeadZone::Relaxed   => 0.2,
            DeadZone::Custom(d) if d.is_finite() => d.clamp(0.0, 0.49),
            DeadZone::Custom(_) => 0.05,
        }
    }
}

impl Default for DeadZone {
    fn default() -> Self { DeadZone::Tight }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureFrame — interpreter output
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureFrame {
    pub hand_present:         bool,
    pub palm_x:               f32,
    pub pinching:             bool,
    pub horizontal_intensity: f32,
}

impl GestureFrame {
    /// "No input": the consumer must not treat this as a centre command.
    pub const NO_HAND: GestureFrame = GestureFrame {
        hand_present:         false,
        palm_x:               0.5,
        pinching:             false,
        horizontal_intensity: 0.0,
    };
}

impl Default for GestureFrame {
    fn default() -> Self { GestureFrame::NO_HAND }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureInterpreter
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default)]
pub struct GestureInterpreter {
    dead_zone: DeadZone,
}

impl GestureInterpreter {
    pub fn new(dead_zone: DeadZone) -> Self {
        GestureInterpreter { dead_zone }
    }

    pub fn dead_zone(&self) -> DeadZone { self.dead_zone }

    pub fn interpret(&self, sample: Option<&HandLandmarkFrame>) -> GestureFrame {
        let Some(hand) = sample else {
            return GestureFrame::NO_HAND;
        };
        let palm_x = palm_x(hand);
        GestureFrame {
            hand_present:         true,
            palm_x,
            pinching:             is_pinching(hand),
            horizontal_intensity: horizontal_intensity(palm_x, self.dead_zone.half_width()),
        }
    }
}

/// Mean x of the wrist and the four finger-base joints.
pub fn palm_x(hand: &HandLandmarkFrame) -> f32 {
    PALM_POINTS.iter().map(|&i| hand.point(i).x).sum::<f32>() / PALM_POINTS.len() as f32
}

/// Zero inside `0.5 ± dead_zone`, then linear to ±1 at the view edges.
pub fn horizontal_intensity(palm_x: f32, dead_zone: f32) -> f32 {
    if !palm_x.is_finite() {
        return 0.0;
    }
    let offset = palm_x - 0.5;
    let reach = offset.abs() - dead_zone;
    if reach <= EDGE_TOLERANCE {
        return 0.0;
    }
    let span = (0.5 - dead_zone).max(EDGE_TOLERANCE);
    (offset.signum() * reach / span).clamp(-1.0, 1.0)
}

/// True if any of the five pinch shapes is present.
pub fn is_pinching(hand: &HandLandmarkFrame) -> bool {
    thumb_touches(hand, INDEX_TIP)
        || thumb_touches(hand, MIDDLE_TIP)
        || is_fist(hand)
        || fingers_curled(hand)
        || tips_bunched(hand)
}

fn thumb_touches(hand: &HandLandmarkFrame, tip: usize) -> bool {
    hand.point(THUMB_TIP).distance(&hand.point(tip)) < PINCH_DISTANCE
}

fn is_fist(hand: &HandLandmarkFrame) -> bool {
    let wrist = hand.point(WRIST);
    let total: f32 = FINGER_TIPS_AND_PIPS
        .iter()
        .map(|&(tip, _)| hand.point(tip).distance(&wrist))
        .sum();
    total / (FINGER_TIPS_AND_PIPS.len() as f32) < FIST_DISTANCE
}

fn fingers_curled(hand: &HandLandmarkFrame) -> bool {
    FINGER_TIPS_AND_PIPS
        .iter()
        .filter(|&&(tip, pip)| hand.point(tip).y > hand.point(pip).y)
        .count()
        >= CURLED_FINGERS
}

fn tips_bunched(hand: &HandLandmarkFrame) -> bool {
    let tips: Vec<HandLandmark> = ALL_TIPS.iter().map(|&i| hand.point(i)).collect();
    let n = tips.len() as f32;
    let centroid = HandLandmark::new(
        tips.iter().map(|p| p.x).sum::<f32>() / n,
        tips.iter().map(|p| p.y).sum::<f32>() / n,
        tips.iter().map(|p| p.z).sum::<f32>() / n,
    );
    tips.iter().map(|p| p.distance(&centroid)).fold(0.0, f32::max) < CLUSTER_DISTANCE
}

// ════════════════════════════════════════════════════════════════════════════
// PinchEdge — one draw per pinch
// ════════════════════════════════════════════════════════════════════════════

/// Rising-edge detector over successive gesture frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct PinchEdge {
    held: bool,
}

impl PinchEdge {
    /// Returns true only on a false → true transition of `pinching`.
    pub fn update(&mut self, frame: &GestureFrame) -> bool {
        let fired = frame.pinching && !self.held;
        self.held = frame.pinching;
        fired
    }

    pub fn is_held(&self) -> bool { self.held }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::*;
    use proptest::prelude::*;

    fn curled_hand() -> HandLandmarkFrame {
        let mut f = HandLandmarkFrame::open_hand(0.5);
        for &(tip, pip) in FINGER_TIPS_AND_PIPS.iter().take(3) {
            f.points[tip].y = f.points[pip].y + 0.05;
        }
        f
    }

    fn fist() -> HandLandmarkFrame {
        let mut f = HandLandmarkFrame::open_hand(0.5);
        let wrist = f.point(WRIST);
        for (k, &(tip, pip)) in FINGER_TIPS_AND_PIPS.iter().enumerate() {
            // Tips tucked toward the wrist, still above their PIPs.
            f.points[tip] = HandLandmark::new(wrist.x - 0.06 + 0.04 * k as f32, 0.68, 0.0);
            f.points[pip].y = 0.7;
        }
        f
    }

    fn bunched() -> HandLandmarkFrame {
        let mut f = HandLandmarkFrame::open_hand(0.5);
        // Thumb just out of pinch range of index and middle, all five tips
        // within the cluster radius of their centroid.
        let xs = [0.465, 0.53, 0.54, 0.52, 0.54];
        for (&tip, &x) in ALL_TIPS.iter().zip(xs.iter()) {
            f.points[tip] = HandLandmark::new(x, 0.35, 0.0);
        }
        f
    }

    #[test]
    fn open_hand_is_not_a_pinch() {
        let f = HandLandmarkFrame::open_hand(0.5);
        assert!(!is_pinching(&f));
        assert!(!thumb_touches(&f, INDEX_TIP));
        assert!(!is_fist(&f));
        assert!(!fingers_curled(&f));
        assert!(!tips_bunched(&f));
    }

    #[test]
    fn thumb_to_index_pinches() {
        assert!(is_pinching(&HandLandmarkFrame::pinching(0.3)));
    }

    #[test]
    fn thumb_to_middle_pinches() {
        let mut f = HandLandmarkFrame::open_hand(0.5);
        f.points[THUMB_TIP] = f.points[MIDDLE_TIP];
        assert!(thumb_touches(&f, MIDDLE_TIP));
        assert!(is_pinching(&f));
    }

    #[test]
    fn three_curled_fingers_pinch() {
        let f = curled_hand();
        assert!(fingers_curled(&f));
        assert!(!is_fist(&f));
        assert!(is_pinching(&f));
    }

    #[test]
    fn two_curled_fingers_do_not() {
        let mut f = HandLandmarkFrame::open_hand(0.5);
        for &(tip, pip) in FINGER_TIPS_AND_PIPS.iter().take(2) {
            f.points[tip].y = f.points[pip].y + 0.05;
        }
        assert!(!fingers_curled(&f));
        assert!(!is_pinching(&f));
    }

    #[test]
    fn fist_pinches() {
        let f = fist();
        assert!(is_fist(&f));
        assert!(!fingers_curled(&f));
        assert!(is_pinching(&f));
    }

    #[test]
    fn bunched_tips_pinch() {
        let f = bunched();
        assert!(tips_bunched(&f));
        assert!(!thumb_touches(&f, INDEX_TIP));
        assert!(!thumb_touches(&f, MIDDLE_TIP));
        assert!(is_pinching(&f));
    }

    #[test]
    fn palm_x_averages_base_joints() {
        assert!((palm_x(&HandLandmarkFrame::open_hand(0.5)) - 0.5).abs() < 1e-6);
        assert!((palm_x(&HandLandmarkFrame::open_hand(0.2)) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn palm_x_ignores_fingertips() {
        let mut f = HandLandmarkFrame::open_hand(0.5);
        f.points[INDEX_TIP].x = 0.99;
        f.points[THUMB_TIP].x = 0.01;
        assert!((palm_x(&f) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn intensity_saturates_at_edges() {
        for dz in [DeadZone::Tight, DeadZone::Relaxed] {
            let d = dz.half_width();
            assert_eq!(horizontal_intensity(1.0, d), 1.0);
            assert_eq!(horizontal_intensity(0.0, d), -1.0);
        }
    }

    #[test]
    fn intensity_is_linear_outside_dead_zone() {
        // Relaxed: 0.2 dead zone, 0.3 ramp
        let i = horizontal_intensity(0.85, 0.2);
        assert!((i - 0.5).abs() < 1e-5);
        let i = horizontal_intensity(0.15, 0.2);
        assert!((i + 0.5).abs() < 1e-5);
    }

    #[test]
    fn intensity_is_zero_at_dead_zone_edges() {
        for d in [0.05_f32, 0.2] {
            assert_eq!(horizontal_intensity(0.5 + d, d), 0.0);
            assert_eq!(horizontal_intensity(0.5 - d, d), 0.0);
        }
    }

    #[test]
    fn custom_dead_zone_is_clamped() {
        assert_eq!(DeadZone::Custom(0.9).half_width(), 0.49);
        assert_eq!(DeadZone::Custom(-1.0).half_width(), 0.0);
        assert_eq!(DeadZone::Custom(f32::NAN).half_width(), 0.05);
    }

    #[test]
    fn interpreter_reports_hand() {
        let interp = GestureInterpreter::new(DeadZone::Tight);
        let g = interp.interpret(Some(&HandLandmarkFrame::pinching(0.9)));
        assert!(g.hand_present);
        assert!(g.pinching);
        assert!(g.horizontal_intensity > 0.0);
    }

    #[test]
    fn no_hand_clears_everything() {
        let interp = GestureInterpreter::new(DeadZone::Relaxed);
        let before = interp.interpret(Some(&HandLandmarkFrame::pinching(1.0)));
        assert!(before.pinching && before.horizontal_intensity > 0.99);

        let after = interp.interpret(None);
        assert!(!after.hand_present);
        assert!(!after.pinching);
        assert_eq!(after.horizontal_intensity, 0.0);
    }

    #[test]
    fn pinch_fires_once_on_rising_edge() {
        let mut edge = PinchEdge::default();
        let frame = |pinching| GestureFrame { pinching, hand_present: true, ..GestureFrame::NO_HAND };
        let fired: Vec<bool> = [false, false, true, true, false]
            .iter()
            .map(|&p| edge.update(&frame(p)))
            .collect();
        assert_eq!(fired, vec![false, false, true, false, false]);
    }

    #[test]
    fn losing_the_hand_rearms_the_edge() {
        let mut edge = PinchEdge::default();
        let pinch = GestureFrame { pinching: true, hand_present: true, ..GestureFrame::NO_HAND };
        assert!(edge.update(&pinch));
        assert!(!edge.update(&GestureFrame::NO_HAND));
        assert!(edge.update(&pinch));
    }

    proptest! {
        #[test]
        fn intensity_stays_in_range(x in -2.0f32..3.0, d in 0.0f32..0.49) {
            let i = horizontal_intensity(x, d);
            prop_assert!((-1.0..=1.0).contains(&i));
        }

        #[test]
        fn dead_zone_is_silent(d in 0.0f32..0.49, t in -1.0f32..1.0) {
            prop_assert_eq!(horizontal_intensity(0.5 + d * t, d), 0.0);
        }
    }
}
