//! The draw state machine: rotation engine plus draw phase.
//!
//! `Carousel` is the single owner of the rotation angle.  The frame loop
//! calls [`Carousel::tick`]; everything else reads snapshots.

use card_settings::{CardLabel, Settings};

use crate::rotation::{carousel_transforms, CardTransform, RotationEngine, RotationState};
use crate::selection::{select_index, DrawPhase};

#[derive(Clone, Debug)]
pub struct Carousel {
    engine: RotationEngine,
    phase:  DrawPhase,
}

impl Carousel {
    pub fn new(settings: &Settings) -> Self {
        Carousel {
            engine: RotationEngine::new(settings.speed_multiplier()),
            phase:  DrawPhase::Rotating,
        }
    }

    // ── per-frame ────────────────────────────────────────────────────────

    pub fn tick(&mut self, elapsed_frames: f64) {
        if self.phase.is_rotating() {
            self.engine.tick(elapsed_frames);
        }
    }

    /// Steering only matters while the ring is spinning.
    pub fn steer(&mut self, intensity: f64) {
        if self.phase.is_rotating() {
            self.engine.steer(intensity);
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.engine.set_speed_multiplier(settings.speed_multiplier());
    }

    // ── transitions ──────────────────────────────────────────────────────

    /// Stop the ring and draw the card nearest the front.
    ///
    /// Once a card is drawn this is a no-op that returns the drawn index.
    pub fn confirm(&mut self, card_count: usize) -> usize {
        if let Some(index) = self.phase.selected_index() {
            return index;
        }
        let index = select_index(self.engine.angle_degrees(), card_count);
        self.engine.stop();
        self.phase = DrawPhase::Hidden { index };
        tracing::debug!(index, angle = self.engine.angle_degrees(), "card drawn");
        index
    }

    /// Flip the drawn card.  Clicking any other card, or clicking while
    /// rotating, does nothing.  Returns whether the phase changed.
    pub fn reveal(&mut self, index: usize) -> bool {
        self.phase = match self.phase {
            DrawPhase::Hidden   { index: i } if i == index => DrawPhase::Revealed { index },
            DrawPhase::Revealed { index: i } if i == index => DrawPhase::Hidden   { index },
            _ => return false,
        };
        true
    }

    /// Start a new draw.
    ///
    /// With removal enabled and more than three cards in the pool, the drawn
    /// card is taken out of `settings` and returned.  At the three-card floor
    /// removal is skipped.  Does nothing while already rotating.
    pub fn reset(&mut self, settings: &mut Settings) -> Option<CardLabel> {
        let index = self.phase.selected_index()?;
        let removed = if settings.remove_drawn_card() {
            settings.remove_card(index)
        } else {
            None
        };
        self.restart();
        removed
    }

    /// Back to rotating without touching the pool.
    pub fn restart(&mut self) {
        self.phase = DrawPhase::Rotating;
        self.engine.start();
    }

    // ── read-only projections ────────────────────────────────────────────

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn rotation(&self) -> RotationState {
        self.engine.snapshot()
    }

    pub fn boost(&self) -> f64 {
        self.engine.boost()
    }

    pub fn transforms(&self, card_count: usize, radius: f64) -> Vec<CardTransform> {
        carousel_transforms(card_count, self.engine.angle_degrees(), radius)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(count: usize, remove: bool) -> Settings {
        let mut s = Settings::default();
        s.set_card_count(count);
        s.set_remove_drawn_card(remove);
        s
    }

    #[test]
    fn confirm_stops_and_selects() {
        let s = settings(8, false);
        let mut c = Carousel::new(&s);
        c.tick(180.0); // 90°
        let idx = c.confirm(s.card_count());
        assert_eq!(idx, 2);
        assert_eq!(c.phase(), DrawPhase::Hidden { index: 2 });
        assert!(!c.rotation().running);

        c.tick(100.0);
        assert_eq!(c.rotation().angle_degrees, 90.0);
    }

    #[test]
    fn confirm_twice_keeps_selection() {
        let s = settings(5, false);
        let mut c = Carousel::new(&s);
        c.tick(37.0);
        let first = c.confirm(5);
        assert_eq!(c.confirm(5), first);
    }

    #[test]
    fn reveal_toggles_only_the_drawn_card() {
        let s = settings(6, false);
        let mut c = Carousel::new(&s);
        assert!(!c.reveal(0), "reveal while rotating is a no-op");

        let idx = c.confirm(6);
        assert!(!c.reveal((idx + 1) % 6));
        assert_eq!(c.phase(), DrawPhase::Hidden { index: idx });

        assert!(c.reveal(idx));
        assert_eq!(c.phase(), DrawPhase::Revealed { index: idx });
        assert!(c.reveal(idx));
        assert_eq!(c.phase(), DrawPhase::Hidden { index: idx });
    }

    #[test]
    fn reset_restarts_rotation() {
        let mut s = settings(6, false);
        let mut c = Carousel::new(&s);
        c.confirm(6);
        assert!(c.reset(&mut s).is_none());
        assert_eq!(c.phase(), DrawPhase::Rotating);
        assert!(c.rotation().running);
        assert_eq!(s.card_count(), 6);
    }

    #[test]
    fn reset_removes_drawn_card_above_floor() {
        let mut s = settings(4, true);
        let mut c = Carousel::new(&s);
        c.tick(180.0); // 90° → slot 1 of 4
        let idx = c.confirm(4);
        let drawn = s.label(idx).cloned().unwrap();

        let removed = c.reset(&mut s).unwrap();
        assert_eq!(removed, drawn);
        assert_eq!(s.card_count(), 3);
        assert!(!s.labels().contains(&drawn));
    }

    #[test]
    fn reset_respects_three_card_floor() {
        let mut s = settings(3, true);
        let before = s.clone();
        let mut c = Carousel::new(&s);
        c.confirm(3);
        c.reveal(0);
        assert!(c.reset(&mut s).is_none());
        assert_eq!(s, before);
        assert!(c.phase().is_rotating());
    }

    #[test]
    fn reset_while_rotating_is_noop() {
        let mut s = settings(5, true);
        let mut c = Carousel::new(&s);
        assert!(c.reset(&mut s).is_none());
        assert_eq!(s.card_count(), 5);
    }

    #[test]
    fn steering_ignored_once_drawn() {
        let s = settings(5, false);
        let mut c = Carousel::new(&s);
        c.confirm(5);
        c.steer(1.0);
        assert_eq!(c.boost(), 1.0);
    }

    #[test]
    fn speed_follows_settings() {
        let mut s = settings(5, false);
        let mut c = Carousel::new(&s);
        s.set_speed_multiplier(3.0);
        c.apply_settings(&s);
        c.tick(2.0);
        assert_eq!(c.rotation().angle_degrees, 3.0);
    }
}
