//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┬──────────────┐
//! │                                                     │  DRAWN       │
//! │        ▯   ▯                           ▯   ▯        │  CARDS       │
//! │     ▯          ┏━━━━━━━━┓                  ▯        │              │
//! │                ┃ front  ┃   (carousel ring)         │  [entry 0]   │
//! │     ▯          ┗━━━━━━━━┛                  ▯        │  [entry 1]   │
//! │                                                     │  [entry 2]   │
//! │  hand bar ─────────────●─────────────────────────── │              │
//! │  status bar                                         │              │
//! └─────────────────────────────────────────────────────┴──────────────┘
//! ```

use std::f64::consts::PI;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use carousel_engine::CardTransform;

use crate::app::{AppState, Command};
use crate::tracking::SimInput;
use crate::tray::{blend, card_back_color, DrawTray};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 1200;
pub const WIN_H:       usize = 600;
const TRAY_W:          usize = 220;
pub const STAGE_W:     usize = WIN_W - TRAY_W;
const CARD_W:          usize = 90;
const CARD_H:          usize = 130;
const CARD_GAP:        usize = 20;
const RING_CY:         usize = 250;
const MIN_RADIUS:      f64   = 140.0;
/// Far cards shrink to this fraction of full size.
const FAR_SCALE:       f64   = 0.55;
/// Cards at the back of the ring sit this many pixels higher.
const FAR_LIFT:        f64   = 40.0;
/// A card seen edge-on still keeps this much of its width.
const MIN_EDGE_WIDTH:  f64   = 0.15;
const HAND_BAR_Y:      usize = WIN_H - 70;
const STATUS_Y:        usize = WIN_H - 36;
const BG_COLOR:        u32   = 0xFF1A1A2E;
const TRAY_BG:         u32   = 0xFF16213E;
const GOLD:            u32   = 0xFFFFD700;
const FACE_COLOR:      u32   = 0xFFF5F0E1;
const FACE_TEXT:       u32   = 0xFF202020;
const TEXT_BG:         u32   = 0xFF0F3460;

// ════════════════════════════════════════════════════════════════════════════
// Geometry helpers (pure, tested)
// ════════════════════════════════════════════════════════════════════════════

/// Ring radius that keeps `card_count` cards from crowding, within
/// [`MIN_RADIUS`, 42% of the stage width].
pub fn carousel_radius(stage_w: usize, card_count: usize) -> f64 {
    let circumference = card_count as f64 * (CARD_W + CARD_GAP) as f64;
    let max = (stage_w as f64 * 0.42).max(MIN_RADIUS);
    (circumference / (2.0 * PI)).clamp(MIN_RADIUS, max)
}

/// Screen rectangle of one painted card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardRect {
    pub index: usize,
    pub x:     usize,
    pub y:     usize,
    pub w:     usize,
    pub h:     usize,
}

impl CardRect {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Screen rectangle for a card transform.  `flip_width` squashes the card
/// horizontally while it turns over (1.0 = flat).
fn card_rect(t: &CardTransform, flip_width: f64) -> CardRect {
    let size = FAR_SCALE + (1.0 - FAR_SCALE) * t.scale;
    let yaw = t.rotate_y.to_radians().cos().abs().max(MIN_EDGE_WIDTH);
    let w = (CARD_W as f64 * size * yaw * flip_width).max(2.0);
    let h = CARD_H as f64 * size;
    let cx = STAGE_W as f64 / 2.0 + t.x;
    let cy = RING_CY as f64 - (1.0 - t.scale) * FAR_LIFT;
    CardRect {
        index: t.index,
        x:     (cx - w / 2.0).max(0.0) as usize,
        y:     (cy - h / 2.0).max(0.0) as usize,
        w:     w as usize,
        h:     h as usize,
    }
}

/// Topmost card under (`x`, `y`).  `rects` are in paint order, so later
/// entries cover earlier ones.
pub fn hit_test(rects: &[CardRect], x: usize, y: usize) -> Option<usize> {
    rects.iter().rev().find(|r| r.contains(x, y)).map(|r| r.index)
}

/// Greedy word wrap to lines of at most `max_chars`; overlong words are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..max_chars).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
        if needed > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ════════════════════════════════════════════════════════════════════════════
// InputFrame — everything the window produced since the last poll
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct InputFrame {
    pub commands: Vec<Command>,
    /// Mouse x across the stage (0.0–1.0); `None` when outside it.
    pub pointer:  Option<f32>,
    /// Input for the simulated hand.
    pub sim:      Vec<SimInput>,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    buf:        Vec<u32>,
    /// Card rectangles from the last frame, in paint order, for click tests.
    card_rects: Vec<CardRect>,
    mouse_was_down: bool,
    pinch_was_down: bool,
}

impl Visualizer {
    pub fn new() -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Card Draw",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            card_rects: Vec::new(),
            mouse_was_down: false,
            pinch_was_down: false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.
    pub fn poll_input(&mut self) -> InputFrame {
        let mut frame = InputFrame::default();

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        // Keys that repeat while held
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        let bindings: [(bool, Command); 7] = [
            (one_shot(Key::Q) || one_shot(Key::Escape),      Command::Quit),
            (one_shot(Key::Space),                           Command::Confirm),
            (one_shot(Key::Enter) || one_shot(Key::R),       Command::DrawAgain),
            (one_shot(Key::G),                               Command::ToggleGesture),
            (one_shot(Key::X),                               Command::ToggleRemoveDrawn),
            (held(Key::Up),                                  Command::SpeedUp),
            (held(Key::Down),                                Command::SpeedDown),
        ];
        frame.commands.extend(bindings.iter().filter(|(hit, _)| *hit).map(|&(_, cmd)| cmd));
        if one_shot(Key::Equal) || one_shot(Key::NumPadPlus) {
            frame.commands.push(Command::MoreCards);
        }
        if one_shot(Key::Minus) || one_shot(Key::NumPadMinus) {
            frame.commands.push(Command::FewerCards);
        }

        // Simulated hand: H toggles it in and out of view, P held = pinch
        if one_shot(Key::H) {
            frame.sim.push(SimInput::ToggleHand);
        }
        let pinch_down = self.window.is_key_down(Key::P);
        if pinch_down != self.pinch_was_down {
            frame.sim.push(SimInput::Pinch(pinch_down));
            self.pinch_was_down = pinch_down;
        }

        // Mouse
        let pos = self.window.get_mouse_pos(MouseMode::Discard);
        if let Some((mx, _)) = pos {
            if (mx as usize) < STAGE_W {
                let x = mx / STAGE_W as f32;
                frame.pointer = Some(x);
                frame.sim.push(SimInput::MoveTo(x));
            }
        }
        let mouse_down = self.window.get_mouse_down(MouseButton::Left);
        if mouse_down && !self.mouse_was_down {
            if let Some((mx, my)) = pos {
                if let Some(index) = hit_test(&self.card_rects, mx as usize, my as usize) {
                    frame.commands.push(Command::Reveal(index));
                }
            }
        }
        self.mouse_was_down = mouse_down;

        frame
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState) {
        // Clear
        self.buf.fill(BG_COLOR);

        // ── Tray background ───────────────────────────────────────────────
        self.fill_rect(STAGE_W, 0, TRAY_W, WIN_H, TRAY_BG);

        // ── Carousel ──────────────────────────────────────────────────────
        self.draw_carousel(app);

        // ── Hand indicator ────────────────────────────────────────────────
        self.draw_hand_bar(app);

        // ── Draw tray ─────────────────────────────────────────────────────
        self.draw_tray(app.tray());

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, STAGE_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(&app.status, 10, STATUS_Y + 8, 0xFFEEEEEE);
        let settings = format!(
            "{} cards  speed {:.2}x  remove drawn: {}",
            app.settings().card_count(),
            app.settings().speed_multiplier(),
            if app.settings().remove_drawn_card() { "on" } else { "off" },
        );
        self.draw_label(&settings, STAGE_W - settings.len() * 4 - 10, STATUS_Y + 8, 0xFFAADDFF);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "Space=draw  click=flip  Enter/R=again  G=gestures  Up/Down=speed  +/-=cards  X=remove  H/P=sim hand  Q=quit",
            10, WIN_H - 14, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Carousel ──────────────────────────────────────────────────────────

    fn draw_carousel(&mut self, app: &AppState) {
        let settings = app.settings();
        let count = settings.card_count();
        let radius = carousel_radius(STAGE_W, count);
        let selected = app.phase().selected_index();
        let flip = app.flip();

        let mut transforms = app.carousel().transforms(count, radius);
        transforms.sort_by_key(|t| t.stack_order);

        self.card_rects.clear();
        for t in &transforms {
            let Some(label) = settings.label(t.index) else { continue };
            let is_selected = selected == Some(t.index);
            let flip_width = if is_selected { flip.width_factor() as f64 } else { 1.0 };
            let rect = card_rect(t, flip_width);
            let face_up = is_selected && flip.face_up();

            let base = if face_up { FACE_COLOR } else { card_back_color(label.id) };
            let color = blend(BG_COLOR, base, t.opacity as f32);
            self.fill_rect(rect.x, rect.y, rect.w, rect.h, color);
            self.draw_border(rect.x, rect.y, rect.w, rect.h, 0xFF000000);

            if face_up {
                self.draw_card_text(&label.text, &rect);
            } else {
                // Card number on the back
                let n = format!("{}", t.index + 1);
                let nx = rect.x + rect.w.saturating_sub(n.len() * 8) / 2;
                self.draw_text(&n, nx, rect.y + rect.h / 2 - 5, 2, blend(BG_COLOR, 0xFFFFFFFF, t.opacity as f32));
            }

            if is_selected {
                self.draw_border(rect.x, rect.y, rect.w, rect.h, GOLD);
                if rect.w > 4 && rect.h > 4 {
                    self.draw_border(rect.x + 1, rect.y + 1, rect.w - 2, rect.h - 2, GOLD);
                }
            }
            self.card_rects.push(rect);
        }
    }

    fn draw_card_text(&mut self, text: &str, rect: &CardRect) {
        let max_chars = rect.w.saturating_sub(8) / 8;
        if max_chars == 0 {
            return;
        }
        let lines = wrap_text(text, max_chars);
        let max_lines = rect.h.saturating_sub(8) / 12;
        let shown = lines.len().min(max_lines);
        let mut y = rect.y + rect.h.saturating_sub(shown * 12) / 2;
        for line in lines.iter().take(shown) {
            let x = rect.x + rect.w.saturating_sub(line.chars().count() * 8) / 2;
            self.draw_text(line, x, y, 2, FACE_TEXT);
            y += 12;
        }
    }

    // ── Hand indicator ────────────────────────────────────────────────────

    fn draw_hand_bar(&mut self, app: &AppState) {
        let gesture = app.gesture();
        let label = app.tracking_status().label();
        self.draw_label(&label, 10, HAND_BAR_Y - 12, 0xFFAAAAAA);
        self.fill_rect(10, HAND_BAR_Y, STAGE_W - 20, 2, 0xFF444466);

        // Centre tick
        self.fill_rect(STAGE_W / 2, HAND_BAR_Y - 4, 1, 10, 0xFF666688);

        if gesture.hand_present {
            let x = 10 + ((STAGE_W - 20) as f32 * gesture.palm_x.clamp(0.0, 1.0)) as usize;
            let color = if gesture.pinching { GOLD } else { 0xFFEEEEEE };
            self.draw_diamond(x, HAND_BAR_Y + 1, 6, color);
        }
    }

    // ── Draw tray ─────────────────────────────────────────────────────────

    fn draw_tray(&mut self, tray: &DrawTray) {
        self.draw_label("DRAWN CARDS", STAGE_W + 10, 10, GOLD);

        let max_chars = (TRAY_W - 40) / 4;
        let mut ey = 30usize;
        for entry in tray.entries.iter().rev() {
            let ex = STAGE_W + (TRAY_W as f32 * (1.0 - entry.slide_in)) as usize;

            if ex < WIN_W {
                self.fill_rect(ex, ey, WIN_W - ex, 40, TEXT_BG);
                self.fill_rect(ex + 6, ey + 6, 18, 28, entry.color);
                let text: String = entry.text.chars().take(max_chars).collect();
                let color = if entry.removed { 0xFF888888 } else { 0xFFEEEEEE };
                self.draw_label(&text, ex + 30, ey + 12, color);
                if entry.removed {
                    self.fill_rect(ex + 30, ey + 14, text.chars().count() * 4, 1, 0xFFCC5555);
                    self.draw_label("removed", ex + 30, ey + 24, 0xFFCC5555);
                }
            }
            ey += 46;
            if ey + 46 > WIN_H { break; }
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            if y < WIN_H           { self.buf[y           * WIN_W + col] = color; }
            if y+h-1 < WIN_H       { self.buf[(y+h-1)     * WIN_W + col] = color; }
        }
        for row in y..(y+h).min(WIN_H) {
            if x < WIN_W           { self.buf[row * WIN_W + x    ] = color; }
            if x+w-1 < WIN_W       { self.buf[row * WIN_W + x+w-1] = color; }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn draw_diamond(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        for dy in -(r as isize)..=r as isize {
            let span = r as isize - dy.abs();
            for dx in -span..=span {
                let (sx, sy) = (cx as isize + dx, cy as isize + dy);
                if sx >= 0 && sy >= 0 {
                    self.set_pixel(sx as usize, sy as usize, color);
                }
            }
        }
    }

    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_text(text, x, y, 1, color);
    }

    /// 3×5 bitmap font, each pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let advance = 4 * scale; // 3 wide + 1 gap
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > WIN_W { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += advance;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
