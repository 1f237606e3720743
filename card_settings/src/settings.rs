//! The validated settings value.
//!
//! `Settings` keeps the card count implicit in the label list, so
//! `card_count() == labels().len()` holds after every mutation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::SettingsRecord;
use crate::store::SettingsStore;
use crate::Result;

// ════════════════════════════════════════════════════════════════════════════
// Limits and defaults
// ════════════════════════════════════════════════════════════════════════════

pub const MIN_CARDS:          usize = 3;
pub const MAX_CARDS:          usize = 20;
pub const MIN_SPEED:          f64   = 0.5;
pub const MAX_SPEED:          f64   = 3.0;
pub const MAX_LABEL_CHARS:    usize = 50;
pub const DEFAULT_CARD_COUNT: usize = 8;
pub const DEFAULT_SPEED:      f64   = 1.0;

// ════════════════════════════════════════════════════════════════════════════
// CardLabel
// ════════════════════════════════════════════════════════════════════════════

/// One card in the pool.  `id` is stable across removals; `text` is what the
/// card shows once revealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLabel {
    pub id:   u32,
    pub text: String,
}

impl CardLabel {
    /// Synthesized label for the card at 1-based `position`.
    pub fn placeholder(id: u32, position: usize) -> Self {
        CardLabel { id, text: format!("Lucky Card {}", position) }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Settings
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    labels:            Vec<CardLabel>,
    speed_multiplier:  f64,
    remove_drawn_card: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let labels = (1..=DEFAULT_CARD_COUNT)
            .map(|n| CardLabel::placeholder(n as u32, n))
            .collect();
        Settings {
            labels,
            speed_multiplier:  DEFAULT_SPEED,
            remove_drawn_card: false,
        }
    }
}

impl Settings {
    // ── accessors ────────────────────────────────────────────────────────

    pub fn card_count(&self)        -> usize        { self.labels.len() }
    pub fn labels(&self)            -> &[CardLabel] { &self.labels }
    pub fn label(&self, index: usize) -> Option<&CardLabel> { self.labels.get(index) }
    pub fn speed_multiplier(&self)  -> f64          { self.speed_multiplier }
    pub fn remove_drawn_card(&self) -> bool         { self.remove_drawn_card }

    // ── mutations (all clamp silently) ───────────────────────────────────

    /// Resize the pool to `count` cards, clamped to 3–20.  Shrinking drops
    /// trailing labels; growing appends placeholders with fresh ids.
    /// Returns the count actually applied.
    pub fn set_card_count(&mut self, count: usize) -> usize {
        let count = count.clamp(MIN_CARDS, MAX_CARDS);
        self.labels.truncate(count);
        self.pad_to(count);
        count
    }

    /// Set the rotation speed multiplier, clamped to 0.5–3.0.  A non-finite
    /// value resets to the default.  Returns the value applied.
    pub fn set_speed_multiplier(&mut self, speed: f64) -> f64 {
        self.speed_multiplier = clamp_speed(speed);
        self.speed_multiplier
    }

    pub fn set_remove_drawn_card(&mut self, remove: bool) {
        self.remove_drawn_card = remove;
    }

    /// Replace the text of the card with `id`, truncated to 50 characters.
    /// Returns `false` if no card has that id.
    pub fn set_label_text(&mut self, id: u32, text: &str) -> bool {
        match self.labels.iter_mut().find(|l| l.id == id) {
            Some(label) => {
                label.text = truncate_label(text);
                true
            }
            None => false,
        }
    }

    /// Remove the card at `index` from the pool.  Never shrinks the pool
    /// below three cards: at or below the floor this returns `None` and
    /// leaves the pool untouched.
    pub fn remove_card(&mut self, index: usize) -> Option<CardLabel> {
        if self.labels.len() <= MIN_CARDS || index >= self.labels.len() {
            return None;
        }
        Some(self.labels.remove(index))
    }

    fn pad_to(&mut self, count: usize) {
        let mut used: HashSet<u32> = self.labels.iter().map(|l| l.id).collect();
        while self.labels.len() < count {
            let id = fresh_id(&used);
            used.insert(id);
            let position = self.labels.len() + 1;
            self.labels.push(CardLabel::placeholder(id, position));
        }
    }

    // ── record conversion ────────────────────────────────────────────────

    /// Build validated settings from a persisted record.
    ///
    /// The count is clamped, extra labels are dropped, missing labels are
    /// padded with `Lucky Card N`, over-long texts are truncated and
    /// duplicate ids are reassigned so every id in the pool is unique.
    pub fn from_record(record: SettingsRecord) -> Self {
        let count = record.card_amount.clamp(MIN_CARDS as i64, MAX_CARDS as i64) as usize;

        let mut labels: Vec<CardLabel> = record.card_contents;
        labels.truncate(count);

        let mut used: HashSet<u32> = labels.iter().map(|l| l.id).collect();
        let mut seen = HashSet::new();
        for label in &mut labels {
            label.text = truncate_label(&label.text);
            if !seen.insert(label.id) {
                label.id = fresh_id(&used);
                used.insert(label.id);
                seen.insert(label.id);
            }
        }

        let mut settings = Settings {
            labels,
            speed_multiplier:  clamp_speed(record.move_speed),
            remove_drawn_card: record.delete_drawn_card,
        };
        settings.pad_to(count);
        settings
    }

    pub fn to_record(&self) -> SettingsRecord {
        SettingsRecord {
            card_amount:       self.labels.len() as i64,
            card_contents:     self.labels.clone(),
            move_speed:        self.speed_multiplier,
            delete_drawn_card: self.remove_drawn_card,
        }
    }

    // ── persistence ──────────────────────────────────────────────────────

    /// Load from `store`, falling back to defaults on any problem.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let raw = match store.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("no stored settings, using defaults");
                return Settings::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read settings, using defaults");
                return Settings::default();
            }
        };

        match serde_json::from_str::<SettingsRecord>(&raw) {
            Ok(record) => {
                let settings = Settings::from_record(record);
                tracing::debug!(
                    cards = settings.card_count(),
                    speed = settings.speed_multiplier,
                    "settings loaded"
                );
                settings
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed settings record, using defaults");
                Settings::default()
            }
        }
    }

    /// Serialize and write to `store`.
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_record())?;
        store.write(&json)?;
        tracing::debug!(cards = self.card_count(), "settings saved");
        Ok(())
    }
}

fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        DEFAULT_SPEED
    }
}

/// One past the largest id in use, or the smallest free id when that
/// would overflow.
fn fresh_id(used: &HashSet<u32>) -> u32 {
    match used.iter().max() {
        None => 1,
        Some(&max) => max
            .checked_add(1)
            .or_else(|| (1..=u32::MAX).find(|id| !used.contains(id)))
            .unwrap_or(0),
    }
}

fn truncate_label(text: &str) -> String {
    text.chars().take(MAX_LABEL_CHARS).collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
