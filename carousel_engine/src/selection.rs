//! Resolving which card sits at the front, and the draw phase.

/// Normalize any angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    ((angle % 360.0) + 360.0) % 360.0
}

/// Index of the card whose slot is nearest the front at `angle_degrees`.
///
/// Always in `0..card_count` (for `card_count >= 1`).
pub fn select_index(angle_degrees: f64, card_count: usize) -> usize {
    let count = card_count.max(1);
    let angle = if angle_degrees.is_finite() { angle_degrees } else { 0.0 };
    let slot = 360.0 / count as f64;
    let nearest = (normalize_degrees(angle) / slot).round() as usize;
    nearest % count
}

// ════════════════════════════════════════════════════════════════════════════
// DrawPhase
// ════════════════════════════════════════════════════════════════════════════

/// Where the current draw is.
///
/// ```text
///   Rotating ──confirm──▶ Hidden{i} ◀──reveal(i)──▶ Revealed{i}
///      ▲                     │                          │
///      └────────reset────────┴──────────reset───────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPhase {
    Rotating,
    /// Card `index` is drawn, face down.
    Hidden   { index: usize },
    /// Card `index` is drawn and flipped face up.
    Revealed { index: usize },
}

impl DrawPhase {
    pub fn selected_index(&self) -> Option<usize> {
        match *self {
            DrawPhase::Rotating              => None,
            DrawPhase::Hidden   { index }    => Some(index),
            DrawPhase::Revealed { index }    => Some(index),
        }
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self, DrawPhase::Revealed { .. })
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self, DrawPhase::Rotating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalizes_negative_and_large_angles() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(365.0), 5.0);
        assert!(normalize_degrees(-1e-14) < 360.0);
    }

    #[test]
    fn picks_nearest_slot() {
        // 8 cards → 45° slots
        assert_eq!(select_index(0.0, 8), 0);
        assert_eq!(select_index(22.0, 8), 0);
        assert_eq!(select_index(23.0, 8), 1);
        assert_eq!(select_index(90.0, 8), 2);
        assert_eq!(select_index(-45.0, 8), 7);
    }

    #[test]
    fn wraps_back_to_first_card() {
        assert_eq!(select_index(359.0, 8), 0);
        assert_eq!(select_index(-1.0, 3), 0);
    }

    #[test]
    fn non_finite_angle_picks_first_card() {
        assert_eq!(select_index(f64::INFINITY, 5), 0);
    }

    #[test]
    fn phase_accessors() {
        assert_eq!(DrawPhase::Rotating.selected_index(), None);
        assert_eq!(DrawPhase::Hidden { index: 2 }.selected_index(), Some(2));
        assert!(DrawPhase::Revealed { index: 2 }.is_revealed());
        assert!(!DrawPhase::Hidden { index: 2 }.is_revealed());
    }

    proptest! {
        #[test]
        fn index_is_always_in_range(count in 3usize..=20, angle in -1.0e7f64..1.0e7) {
            prop_assert!(select_index(angle, count) < count);
        }

        #[test]
        fn full_turns_do_not_change_selection(
            count in 3usize..=20,
            // keep clear of slot boundaries, where float error in the
            // modulo could legitimately tip the rounding
            slot in 0usize..20,
            offset in -0.45f64..0.45,
            k in -50i64..50,
        ) {
            let step = 360.0 / count as f64;
            let theta = (slot % count) as f64 * step + offset * step;
            let turned = theta + 360.0 * k as f64;
            prop_assert_eq!(select_index(turned, count), select_index(theta, count));
        }
    }
}
