//! # card_settings
//!
//! The card pool and play settings for the carousel draw, with the flat
//! JSON record they persist as.
//!
//! | Field | Range | Persisted as |
//! |---|---|---|
//! | card count | 3–20 | `cardAmount` |
//! | card labels | `{id, text ≤ 50 chars}`, one per card | `cardContents` |
//! | speed multiplier | 0.5–3.0 | `moveSpeed` |
//! | remove drawn card | bool | `deleteDrawnCard` (optional, default `false`) |
//!
//! Out-of-range input is clamped where it enters, never rejected.  Loading
//! never fails: a missing, unreadable or malformed record falls back to
//! [`Settings::default`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use card_settings::{JsonFileStore, Settings};
//!
//! let mut store = JsonFileStore::new("settings.json");
//! let mut settings = Settings::load(&store);
//! settings.set_card_count(12);
//! settings.save(&mut store).unwrap();
//! ```

pub mod error;
pub mod record;
pub mod settings;
pub mod store;

pub use error::{Result, SettingsError};
pub use record::SettingsRecord;
pub use settings::{
    CardLabel, Settings, DEFAULT_CARD_COUNT, DEFAULT_SPEED, MAX_CARDS, MAX_LABEL_CHARS,
    MAX_SPEED, MIN_CARDS, MIN_SPEED,
};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
