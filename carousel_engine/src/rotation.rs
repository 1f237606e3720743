//! Continuous carousel rotation and per-card 3D placement.
//!
//! The carousel is a ring of `card_count` cards around the vertical axis.
//! The engine only owns the angle; placement is a pure function of
//! `(index, card_count, angle, radius)` so the renderer can recompute it
//! every frame from a [`RotationState`] snapshot.

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Degrees advanced per reference frame (1/60 s) at 1.0× speed.
pub const BASE_STEP_DEGREES: f64 = 0.5;

/// Steering boost at full intensity.
pub const MAX_STEER_BOOST: f64 = 3.0;

/// Cards whose depth scale is at or below this are dimmed.
pub const DIM_SCALE_THRESHOLD: f64 = 0.3;
pub const DIM_OPACITY:         f64 = 0.3;

// ════════════════════════════════════════════════════════════════════════════
// Direction
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Angle decreases; cards travel to the left across the front.
    Left,
    /// Angle increases; cards travel to the right across the front.
    Right,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Left  => -1.0,
            Direction::Right =>  1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Left  => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RotationState — read-only snapshot
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    pub angle_degrees: f64,
    pub direction:     Direction,
    pub running:       bool,
}

// ════════════════════════════════════════════════════════════════════════════
// RotationEngine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct RotationEngine {
    angle_degrees:    f64,
    direction:        Direction,
    running:          bool,
    speed_multiplier: f64,
    /// ≥ 1.0; raised by steering input, 1.0 when idle.
    boost:            f64,
}

impl RotationEngine {
    pub fn new(speed_multiplier: f64) -> Self {
        RotationEngine {
            angle_degrees: 0.0,
            direction:     Direction::Right,
            running:       true,
            speed_multiplier,
            boost:         1.0,
        }
    }

    /// Advance by `elapsed_frames` reference frames.  Does nothing while
    /// stopped; negative or non-finite elapsed time is ignored.
    pub fn tick(&mut self, elapsed_frames: f64) {
        if !self.running || !elapsed_frames.is_finite() || elapsed_frames <= 0.0 {
            return;
        }
        self.angle_degrees += BASE_STEP_DEGREES
            * self.speed_multiplier
            * self.direction.sign()
            * self.boost
            * elapsed_frames;
    }

    /// Map a horizontal intensity in [-1, 1] to direction and boost.
    ///
    /// Non-zero intensity picks the direction by sign and scales the boost
    /// linearly up to [`MAX_STEER_BOOST`].  Zero intensity drops the boost
    /// back to 1.0 and keeps the current direction.
    pub fn steer(&mut self, intensity: f64) {
        if !intensity.is_finite() || intensity == 0.0 {
            self.boost = 1.0;
            return;
        }
        let i = intensity.clamp(-1.0, 1.0);
        self.direction = if i < 0.0 { Direction::Left } else { Direction::Right };
        self.boost = 1.0 + i.abs() * (MAX_STEER_BOOST - 1.0);
    }

    pub fn set_direction(&mut self, direction: Direction) { self.direction = direction; }
    pub fn set_speed_multiplier(&mut self, speed: f64)    { self.speed_multiplier = speed; }

    pub fn stop(&mut self) {
        self.running = false;
        self.boost = 1.0;
    }

    pub fn start(&mut self) { self.running = true; }

    pub fn snapshot(&self) -> RotationState {
        RotationState {
            angle_degrees: self.angle_degrees,
            direction:     self.direction,
            running:       self.running,
        }
    }

    pub fn angle_degrees(&self)    -> f64       { self.angle_degrees }
    pub fn direction(&self)        -> Direction { self.direction }
    pub fn is_running(&self)       -> bool      { self.running }
    pub fn speed_multiplier(&self) -> f64       { self.speed_multiplier }
    pub fn boost(&self)            -> f64       { self.boost }
}

// ════════════════════════════════════════════════════════════════════════════
// CardTransform — placement of one card
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardTransform {
    pub index:       usize,
    /// Horizontal offset from the carousel axis.
    pub x:           f64,
    /// Depth toward the viewer; `radius` at the front, `-radius` at the back.
    pub z:           f64,
    /// Linear depth scale: 0.0 at the far point, 1.0 at the near point.
    pub scale:       f64,
    /// Card yaw in degrees.
    pub rotate_y:    f64,
    /// Paint order; higher is nearer.
    pub stack_order: i64,
    pub opacity:     f64,
}

/// Place card `index` of `card_count` on a ring of `radius` rotated by
/// `angle_degrees`.
pub fn card_transform(index: usize, card_count: usize, angle_degrees: f64, radius: f64) -> CardTransform {
    let angle_per_card = 360.0 / card_count.max(1) as f64;
    let rotate_y = index as f64 * angle_per_card - angle_degrees;
    let theta = rotate_y.to_radians();
    let r = radius.max(f64::EPSILON);

    let x = theta.sin() * r;
    let z = theta.cos() * r;
    let scale = (z + r) / (2.0 * r);

    CardTransform {
        index,
        x,
        z,
        scale,
        rotate_y,
        stack_order: (z + r).round() as i64,
        opacity: if scale > DIM_SCALE_THRESHOLD { 1.0 } else { DIM_OPACITY },
    }
}

/// Transforms for the whole ring, in index order.
pub fn carousel_transforms(card_count: usize, angle_degrees: f64, radius: f64) -> Vec<CardTransform> {
    (0..card_count)
        .map(|i| card_transform(i, card_count, angle_degrees, radius))
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn tick_advances_by_base_step() {
        let mut e = RotationEngine::new(1.0);
        e.tick(1.0);
        assert!((e.angle_degrees() - BASE_STEP_DEGREES).abs() < EPS);
        e.tick(2.0);
        assert!((e.angle_degrees() - 3.0 * BASE_STEP_DEGREES).abs() < EPS);
    }

    #[test]
    fn tick_scales_with_speed_and_direction() {
        let mut e = RotationEngine::new(2.0);
        e.set_direction(Direction::Left);
        e.tick(10.0);
        assert!((e.angle_degrees() + 10.0).abs() < EPS);
    }

    #[test]
    fn stopped_engine_does_not_move() {
        let mut e = RotationEngine::new(1.0);
        e.stop();
        e.tick(60.0);
        assert_eq!(e.angle_degrees(), 0.0);
        assert!(!e.snapshot().running);
    }

    #[test]
    fn bad_elapsed_is_ignored() {
        let mut e = RotationEngine::new(1.0);
        e.tick(-5.0);
        e.tick(f64::NAN);
        assert_eq!(e.angle_degrees(), 0.0);
    }

    #[test]
    fn direction_switch_applies_next_tick() {
        let mut e = RotationEngine::new(1.0);
        e.tick(4.0);
        e.set_direction(e.direction().reversed());
        e.tick(4.0);
        assert!(e.angle_degrees().abs() < EPS);
    }

    #[test]
    fn steer_sets_direction_and_boost() {
        let mut e = RotationEngine::new(1.0);
        e.steer(-1.0);
        assert_eq!(e.direction(), Direction::Left);
        assert!((e.boost() - MAX_STEER_BOOST).abs() < EPS);

        e.steer(0.5);
        assert_eq!(e.direction(), Direction::Right);
        assert!((e.boost() - 2.0).abs() < EPS);

        e.steer(0.0);
        assert_eq!(e.direction(), Direction::Right);
        assert_eq!(e.boost(), 1.0);
    }

    #[test]
    fn front_card_is_full_scale() {
        let t = card_transform(0, 8, 0.0, 300.0);
        assert!(t.x.abs() < EPS);
        assert!((t.z - 300.0).abs() < EPS);
        assert!((t.scale - 1.0).abs() < EPS);
        assert_eq!(t.opacity, 1.0);
        assert_eq!(t.stack_order, 600);
    }

    #[test]
    fn back_card_is_zero_scale_and_dimmed() {
        let t = card_transform(0, 8, 180.0, 300.0);
        assert!(t.scale.abs() < EPS);
        assert_eq!(t.opacity, DIM_OPACITY);
        assert_eq!(t.stack_order, 0);
    }

    #[test]
    fn scale_is_monotonic_in_cos_theta() {
        let mut ts = carousel_transforms(12, 17.0, 250.0);
        ts.sort_by(|a, b| a.rotate_y.to_radians().cos().total_cmp(&b.rotate_y.to_radians().cos()));
        for pair in ts.windows(2) {
            assert!(pair[0].scale <= pair[1].scale + EPS);
        }
    }

    #[test]
    fn rotate_y_follows_slot_angle() {
        let t = card_transform(3, 6, 45.0, 200.0);
        assert!((t.rotate_y - (3.0 * 60.0 - 45.0)).abs() < EPS);
        // 135° from the front: right of the axis, behind it.
        assert!(t.x > 0.0);
        assert!(t.z < 0.0);
    }

    #[test]
    fn quarter_turn_card_sits_at_the_side() {
        let t = card_transform(1, 4, 0.0, 100.0);
        assert!((t.x - 100.0).abs() < EPS);
        assert!(t.z.abs() < EPS);
        assert!((t.scale - 0.5).abs() < EPS);
        assert_eq!(t.opacity, 1.0);
    }

    #[test]
    fn transforms_cover_every_card() {
        let ts = carousel_transforms(7, 0.0, 100.0);
        assert_eq!(ts.len(), 7);
        assert!(ts.iter().enumerate().all(|(i, t)| t.index == i));
    }
}
