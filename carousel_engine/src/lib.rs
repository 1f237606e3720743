//! # carousel_engine
//!
//! Rotation, placement and draw selection for a ring of face-down cards.
//!
//! * [`RotationEngine`] advances a continuous angle each frame:
//!   `angle += 0.5° × speed × direction × boost × elapsed_frames`.
//! * [`card_transform`] places card `i` of `n` on a ring of radius `r`
//!   (position, depth scale, yaw, paint order, opacity).
//! * [`select_index`] picks the card nearest the front for a given angle.
//! * [`Carousel`] ties them together as an explicit draw state machine
//!   ([`DrawPhase`]): `Rotating → Hidden → Revealed`, back to `Rotating` on
//!   reset, optionally removing the drawn card from the pool.
//!
//! ```rust
//! use card_settings::Settings;
//! use carousel_engine::{Carousel, DrawPhase};
//!
//! let mut settings = Settings::default();
//! let mut carousel = Carousel::new(&settings);
//! carousel.tick(90.0);
//! let drawn = carousel.confirm(settings.card_count());
//! assert_eq!(carousel.phase(), DrawPhase::Hidden { index: drawn });
//! carousel.reveal(drawn);
//! carousel.reset(&mut settings);
//! assert!(carousel.phase().is_rotating());
//! ```

pub mod carousel;
pub mod rotation;
pub mod selection;

pub use carousel::Carousel;
pub use rotation::{
    card_transform, carousel_transforms, CardTransform, Direction, RotationEngine, RotationState,
    BASE_STEP_DEGREES, MAX_STEER_BOOST,
};
pub use selection::{normalize_degrees, select_index, DrawPhase};
