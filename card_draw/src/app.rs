//! Top-level application state machine.
//!
//! `AppState` owns the `Settings` and their store, the `Carousel`, the
//! gesture interpreter and tracking session, and the visual extras (flip
//! animation, draw tray).  It processes `Command`s and drives the
//! visualizer each frame.

use std::sync::mpsc::{self, Sender};
use std::time::Instant;

use card_settings::{Settings, SettingsStore};
use carousel_engine::{Carousel, DrawPhase};

use crate::gesture::{horizontal_intensity, DeadZone, GestureFrame, GestureInterpreter, PinchEdge};
use crate::tracking::{HandTracker, SimInput, TrackingSession, TrackingStatus};
use crate::tray::{card_back_color, DrawTray, FlipAnimation};
use crate::visualizer::Visualizer;

/// Speed change per key press.
const SPEED_STEP: f64 = 0.25;
/// Dead zone for mouse steering (fraction of the stage width either side of centre).
const POINTER_DEAD_ZONE: f32 = 0.1;
/// Longest stall the frame loop catches up on, in reference frames.
const MAX_ELAPSED_FRAMES: f64 = 4.0;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default)]
pub struct AppConfig {
    pub dead_zone:  DeadZone,
    /// Turn hand tracking on at startup.
    pub gestures:   bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Command: user intent from keys, mouse or gestures
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Stop the carousel and draw the front card.
    Confirm,
    /// Click on the card with this index.
    Reveal(usize),
    /// Start a new draw.
    DrawAgain,
    ToggleGesture,
    SpeedUp,
    SpeedDown,
    MoreCards,
    FewerCards,
    ToggleRemoveDrawn,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── pool + persistence ───────────────────────────────────────────────
    settings: Settings,
    store:    Box<dyn SettingsStore>,

    // ── draw ─────────────────────────────────────────────────────────────
    carousel: Carousel,

    // ── gestures ─────────────────────────────────────────────────────────
    interpreter: GestureInterpreter,
    pinch:       PinchEdge,
    gesture:     GestureFrame,
    tracking:    TrackingSession,
    /// Feeds the simulated hand; `None` with a hardware tracker.
    sim_tx:      Option<Sender<SimInput>>,

    // ── visuals ──────────────────────────────────────────────────────────
    flip:     FlipAnimation,
    tray:     DrawTray,
    /// The current draw has been put in the tray.
    recorded: bool,

    // ── status message ───────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(
        cfg:      AppConfig,
        settings: Settings,
        store:    Box<dyn SettingsStore>,
        tracker:  Box<dyn HandTracker>,
        sim_tx:   Option<Sender<SimInput>>,
    ) -> Self {
        let carousel = Carousel::new(&settings);
        let status = format!(
            "Ready: {} cards at {:.2}x  (Space to draw)",
            settings.card_count(),
            settings.speed_multiplier()
        );
        let mut app = AppState {
            settings,
            store,
            carousel,
            interpreter: GestureInterpreter::new(cfg.dead_zone),
            pinch:       PinchEdge::default(),
            gesture:     GestureFrame::NO_HAND,
            tracking:    TrackingSession::new(tracker),
            sim_tx,
            flip:        FlipAnimation::default(),
            tray:        DrawTray::default(),
            recorded:    false,
            status,
        };
        if cfg.gestures {
            app.handle_command(Command::ToggleGesture);
        }
        app
    }

    // ── process one Command ──────────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: Command) {
        match cmd {
            // ── Confirm → stop and draw ──────────────────────────────────
            Command::Confirm => {
                if self.carousel.phase().is_rotating() {
                    let index = self.carousel.confirm(self.settings.card_count());
                    tracing::info!(index, "card drawn");
                    self.status = format!("Drew card #{}. Click it to flip", index + 1);
                }
            }

            // ── Reveal → flip the drawn card ─────────────────────────────
            Command::Reveal(index) => {
                if self.carousel.reveal(index) && self.carousel.phase().is_revealed() {
                    if let Some(label) = self.settings.label(index) {
                        if !self.recorded {
                            self.tray.deposit(&label.text, card_back_color(label.id));
                            self.recorded = true;
                        }
                        self.status = format!("\"{}\"  (Enter to draw again)", label.text);
                    }
                }
            }

            // ── DrawAgain → reset, maybe removing the drawn card ─────────
            Command::DrawAgain => {
                if self.carousel.phase().is_rotating() {
                    return;
                }
                match self.carousel.reset(&mut self.settings) {
                    Some(removed) => {
                        tracing::info!(id = removed.id, text = %removed.text, "drawn card removed from pool");
                        if self.recorded {
                            self.tray.mark_last_removed();
                        }
                        self.persist();
                        self.status = format!(
                            "Removed \"{}\", {} cards left",
                            removed.text,
                            self.settings.card_count()
                        );
                    }
                    None => self.status = "Shuffling. Space to draw".to_string(),
                }
                self.flip = FlipAnimation::default();
                self.recorded = false;
            }

            // ── Gesture mode ─────────────────────────────────────────────
            Command::ToggleGesture => {
                self.tracking.toggle();
                self.gesture = GestureFrame::NO_HAND;
                self.pinch = PinchEdge::default();
                self.status = format!(
                    "Gestures ({}): {}",
                    self.tracking.tracker_name(),
                    self.tracking.status().label()
                );
            }

            // ── Settings hotkeys ─────────────────────────────────────────
            Command::SpeedUp | Command::SpeedDown => {
                let step = if cmd == Command::SpeedUp { SPEED_STEP } else { -SPEED_STEP };
                let speed = self.settings.set_speed_multiplier(self.settings.speed_multiplier() + step);
                self.carousel.apply_settings(&self.settings);
                self.persist();
                self.status = format!("Speed {:.2}x", speed);
            }

            Command::MoreCards | Command::FewerCards => {
                let target = if cmd == Command::MoreCards {
                    self.settings.card_count() + 1
                } else {
                    self.settings.card_count().saturating_sub(1)
                };
                let applied = self.settings.set_card_count(target);
                self.carousel.restart();
                self.flip = FlipAnimation::default();
                self.recorded = false;
                self.persist();
                self.status = format!("{} cards", applied);
            }

            Command::ToggleRemoveDrawn => {
                let remove = !self.settings.remove_drawn_card();
                self.settings.set_remove_drawn_card(remove);
                self.persist();
                self.status = if remove {
                    "Drawn cards will be removed from the pool".to_string()
                } else {
                    "Drawn cards stay in the pool".to_string()
                };
            }

            Command::Quit => { /* handled in run loop */ }
        }
    }

    /// Save settings; failures are reported, never fatal.
    fn persist(&mut self) {
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            tracing::warn!(error = %e, "could not save settings");
            self.status = format!("Settings not saved: {}", e);
        }
    }

    /// Forward window input to the simulated hand while it is capturing.
    pub fn forward_sim_input(&self, inputs: &[SimInput]) {
        if !self.tracking.is_enabled() {
            return;
        }
        if let Some(tx) = &self.sim_tx {
            for &input in inputs {
                if let Err(e) = tx.send(input) {
                    tracing::debug!(input = ?e.0, "simulated hand is not listening");
                }
            }
        }
    }

    // ── Per-frame tick ───────────────────────────────────────────────────

    /// Advance one frame.
    ///
    /// `pointer` is the mouse position across the stage (0.0–1.0), or `None`
    /// when the mouse is outside it.  A present hand takes over steering; with
    /// no hand the pointer stays in control.
    pub fn tick(&mut self, elapsed_frames: f64, pointer: Option<f32>) {
        // 1. Latest gesture sample
        if let Some(sample) = self.tracking.latest() {
            self.gesture = self.interpreter.interpret(sample.as_ref());
        }
        if !self.tracking.is_enabled() {
            self.gesture = GestureFrame::NO_HAND;
        }

        // 2. Pinch → draw (once per pinch)
        if self.pinch.update(&self.gesture) {
            self.handle_command(Command::Confirm);
        }

        // 3. Steering
        let intensity = if self.gesture.hand_present {
            self.gesture.horizontal_intensity
        } else {
            pointer.map_or(0.0, |x| horizontal_intensity(x, POINTER_DEAD_ZONE))
        };
        self.carousel.steer(intensity as f64);

        // 4. Motion and animations
        self.carousel.tick(elapsed_frames);
        self.flip.tick(self.carousel.phase().is_revealed());
        self.tray.tick();
    }

    // ── Accessors for the render loop ────────────────────────────────────

    pub fn settings(&self)        -> &Settings          { &self.settings }
    pub fn carousel(&self)        -> &Carousel          { &self.carousel }
    pub fn phase(&self)           -> DrawPhase          { self.carousel.phase() }
    pub fn gesture(&self)         -> &GestureFrame      { &self.gesture }
    pub fn tracking_status(&self) -> &TrackingStatus    { self.tracking.status() }
    pub fn flip(&self)            -> &FlipAnimation     { &self.flip }
    pub fn tray(&self)            -> &DrawTray          { &self.tray }
    pub fn store(&self)           -> &dyn SettingsStore { self.store.as_ref() }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer and the hand tracker (simulated by default,
/// hardware with `--features leap`), then drives the input/tick/render loop
/// at ~60 fps until the window closes or `Quit` arrives.
pub fn run(cfg: AppConfig, settings: Settings, store: Box<dyn SettingsStore>) -> anyhow::Result<()> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(feature = "leap")]
    let (tracker, sim_tx): (Box<dyn HandTracker>, Option<Sender<SimInput>>) = {
        drop(sim_rx);
        drop(sim_tx);
        (Box::new(crate::tracking::LeapHandTracker::new()), None)
    };
    #[cfg(not(feature = "leap"))]
    let (tracker, sim_tx): (Box<dyn HandTracker>, Option<Sender<SimInput>>) =
        (Box::new(crate::tracking::SimHandTracker::new(sim_rx)), Some(sim_tx));

    let mut vis = Visualizer::new()?;
    let mut app = AppState::new(cfg, settings, store, tracker, sim_tx);
    let mut last = Instant::now();

    tracing::info!(cards = app.settings().card_count(), "carousel running");

    while vis.is_open() {
        // 1. Poll window input
        let input = vis.poll_input();
        app.forward_sim_input(&input.sim);
        for cmd in input.commands {
            if cmd == Command::Quit {
                return Ok(());
            }
            app.handle_command(cmd);
        }

        // 2. Per-frame logic
        let now = Instant::now();
        let elapsed = ((now - last).as_secs_f64() * 60.0).min(MAX_ELAPSED_FRAMES);
        last = now;
        app.tick(elapsed, input.pointer);

        // 3. Render
        vis.render(&app);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
