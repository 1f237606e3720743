//! # card_draw
//!
//! A card-drawing carousel: a ring of face-down cards spins continuously, the
//! user steers it with the mouse or a tracked hand, stops it to draw the
//! front card, and flips the drawn card to read its label.
//!
//! ## Controls
//!
//! | Input | Action |
//! |---|---|
//! | `Space` / pinch | Stop the ring and draw the front card |
//! | Click the drawn card | Flip it face up / face down |
//! | `Enter` / `R` | Draw again (removes the drawn card if enabled) |
//! | Mouse or hand left/right of centre | Turn that way, faster further out |
//! | `G` | Toggle hand tracking |
//! | `Up` / `Down` | Speed multiplier ±0.25 |
//! | `=` / `-` | One card more / fewer |
//! | `X` | Toggle removal of drawn cards |
//! | `Q` / `Esc` | Quit |
//!
//! ## Pinch
//!
//! Any of: thumb tip touching the index or middle tip, a closed fist, three
//! or more curled fingers, or all five tips bunched together.  Only the
//! start of a pinch draws; holding it does nothing more.
//!
//! ## Feature flags
//!
//! * (default): **Simulated hand**.  The mouse x is the palm, `H` brings
//!   the hand in and out of view, holding `P` pinches.
//! * `leap`: **Hardware hand** read from a LeapMotion controller via LeapC.

pub mod landmarks;
pub mod gesture;
pub mod tracking;
pub mod tray;
pub mod visualizer;
pub mod app;
