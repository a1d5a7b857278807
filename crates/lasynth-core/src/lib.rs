//! LASynth Core - buffer exchange and ROM resolution for an LA synthesizer backend
//!
//! The crate sits between an opaque synthesis engine and an audio mixer:
//!
//! - [`rom`] finds which synthesizer model has a complete, loadable ROM set
//!   in one of the candidate directories and loads it into the engine.
//! - [`engine`] runs the render thread that keeps a pool of rendered blocks
//!   topped up, and the playback driver that feeds them to the mixer.
//! - [`synth`] ties both together behind an open/close lifecycle.

pub mod audio;
pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod rom;
pub mod synth;
pub mod types;

pub use error::{ModelError, SynthError, SynthResult};
pub use synth::Synth;
pub use types::*;
