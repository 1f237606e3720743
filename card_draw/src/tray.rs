//! Visual state around the carousel: card colors, the flip animation of
//! the drawn card, and the tray of cards drawn this session.

use std::f32::consts::PI;

// ════════════════════════════════════════════════════════════════════════════
// Color palette — card id → card-back color
// ════════════════════════════════════════════════════════════════════════════

/// Card-back color for the card with `id`.
///
/// Ids step around the hue wheel by the golden angle so neighbouring cards
/// stay distinct however many cards have been removed or added.
pub fn card_back_color(id: u32) -> u32 {
    let hue = (id as f32 * 137.508) % 360.0;
    hsv_to_argb(hue, 0.62, 0.78)
}

/// Convert HSV → packed ARGB (0xAARRGGBB, A=0xFF).
fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h % 360.0;
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let ri = (r * 255.0) as u32;
    let gi = (g * 255.0) as u32;
    let bi = (b * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// FlipAnimation — the drawn card turning over
// ════════════════════════════════════════════════════════════════════════════

const FLIP_STEP: f32 = 0.08;

/// 0.0 = face down, 1.0 = face up.  Follows the draw phase a step per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlipAnimation {
    pub progress: f32,
}

impl FlipAnimation {
    /// Advance one frame toward face up (`revealed`) or face down.
    pub fn tick(&mut self, revealed: bool) {
        let target = if revealed { 1.0 } else { 0.0 };
        if self.progress < target {
            self.progress = (self.progress + FLIP_STEP).min(target);
        } else if self.progress > target {
            self.progress = (self.progress - FLIP_STEP).max(target);
        }
    }

    pub fn face_up(&self) -> bool { self.progress > 0.5 }

    /// Horizontal squash of the card while it turns (1.0 flat, 0.0 edge-on).
    pub fn width_factor(&self) -> f32 {
        (self.progress * PI).cos().abs()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DrawTray — cards drawn this session, shown on the right side of the screen
// ════════════════════════════════════════════════════════════════════════════

const TRAY_CAPACITY: usize = 8;

#[derive(Clone, Debug)]
pub struct TrayEntry {
    pub text:    String,
    pub color:   u32,
    /// The card was taken out of the pool after this draw.
    pub removed: bool,
    /// Animation: how far the entry has slid into the tray (0.0–1.0).
    pub slide_in: f32,
}

#[derive(Debug, Default)]
pub struct DrawTray {
    pub entries: Vec<TrayEntry>,
}

impl DrawTray {
    pub fn deposit(&mut self, text: &str, color: u32) {
        self.entries.push(TrayEntry {
            text:     text.to_string(),
            color,
            removed:  false,
            slide_in: 0.0,
        });
        if self.entries.len() > TRAY_CAPACITY {
            self.entries.remove(0);
        }
    }

    /// Mark the newest entry as removed from the pool.
    pub fn mark_last_removed(&mut self) {
        if let Some(e) = self.entries.last_mut() {
            e.removed = true;
        }
    }

    /// Advance slide-in animations.
    pub fn tick(&mut self) {
        for e in &mut self.entries {
            if e.slide_in < 1.0 {
                e.slide_in = (e.slide_in + 0.08).min(1.0);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbouring_ids_get_distinct_colors() {
        assert_ne!(card_back_color(1), card_back_color(2));
        assert_ne!(card_back_color(7), card_back_color(8));
    }

    #[test]
    fn card_colors_are_opaque() {
        for id in 0..20 {
            assert_eq!(card_back_color(id) >> 24, 0xFF, "card {} color should be opaque", id);
        }
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF102030, 0xFFFFFFFF, 0.0), 0xFF102030);
        assert_eq!(blend(0xFF102030, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn flip_turns_over_and_back() {
        let mut f = FlipAnimation::default();
        assert!(!f.face_up());
        for _ in 0..20 { f.tick(true); }
        assert_eq!(f.progress, 1.0);
        assert!(f.face_up());
        assert!((f.width_factor() - 1.0).abs() < 1e-6);

        for _ in 0..20 { f.tick(false); }
        assert_eq!(f.progress, 0.0);
    }

    #[test]
    fn flip_is_edge_on_halfway() {
        let f = FlipAnimation { progress: 0.5 };
        assert!(f.width_factor() < 1e-6);
    }

    #[test]
    fn tray_max_entries() {
        let mut tray = DrawTray::default();
        for i in 0..12 {
            tray.deposit(&format!("card {}", i), 0xFF000000);
        }
        assert_eq!(tray.entries.len(), TRAY_CAPACITY);
        assert_eq!(tray.entries[0].text, "card 4");
    }

    #[test]
    fn tray_slides_in() {
        let mut tray = DrawTray::default();
        tray.deposit("a", 0xFF000000);
        tray.mark_last_removed();
        for _ in 0..20 { tray.tick(); }
        assert_eq!(tray.entries[0].slide_in, 1.0);
        assert!(tray.entries[0].removed);
    }
}
