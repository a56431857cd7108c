//! Core library for the tree ring visualiser.
//!
//! The crate turns elapsed time and a static series of yearly ring records
//! into a fully determined animation frame. Each module owns one piece of
//! that pipeline (ring data, palette derivation, rhythm, growth, clocks and
//! the controller that ties them together); drawing, audio playback and
//! window handling live with the host.

pub mod animation;
pub mod config;
pub mod error;
pub mod growth;
pub mod palette;
pub mod record;
pub mod rhythm;
pub mod timeline;

pub use animation::{
    AnimationController, AnimationFrame, AnimationState, Command, PlaybackEvent,
    PlaybackListener, PlaybackState,
};
pub use config::{AnimationConfig, AppConfig, DataConfig};
pub use error::{Result, TreeRingError};
pub use growth::{GrowthEngine, GrowthPosition};
pub use palette::{Color, Palette, PaletteGenerator};
pub use record::{RingRecord, RingSeries};
pub use rhythm::{RhythmEngine, RhythmState, Section};
pub use timeline::{Clock, ManualClock, PlaybackClock, SystemClock};
