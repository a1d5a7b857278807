//! Error types for synthesizer setup
//!
//! Only the setup phase can fail: model definition, ROM resolution,
//! configuration and opening the engine. Nothing here is raised from the
//! render thread.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::ReturnCode;
use crate::rom::RomCategory;

/// Errors that can occur while setting up or driving the synthesizer
#[derive(Debug, Error)]
pub enum SynthError {
    /// No candidate directory holds a validated, loadable ROM set
    #[error("Could not find ROMs for model '{model}' in {} director(ies)", .dirs.len())]
    RomsNotFound { model: String, dirs: Vec<PathBuf> },

    /// The engine refused to open after the ROMs were loaded
    #[error("Error initialising emulation: {0:?}")]
    EngineOpen(ReturnCode),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation needs an open synthesizer
    #[error("Synthesizer is not open")]
    NotOpen,

    /// The engine did not accept a MIDI message
    #[error("Engine rejected message: {0:?}")]
    MessageRejected(ReturnCode),

    /// The render thread could not be spawned
    #[error("Failed to spawn render thread: {0}")]
    RenderThread(#[from] std::io::Error),
}

/// Result type for synthesizer operations
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors in a model definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Model name must not be empty")]
    EmptyName,

    /// A category has neither a full ROM nor a complete pair
    #[error("Model '{model}' has no full or paired {category} ROM")]
    IncompleteCategory { model: String, category: RomCategory },

    #[error("Model '{0}' is defined more than once")]
    DuplicateName(String),
}
