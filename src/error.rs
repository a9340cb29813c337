// Copyright (c) 2017-2021 Fabian Schuiki

//! Errors reported by the waveform sampler and its collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// An error raised while registering signals, replaying a dump, or exporting
/// a waveform.
#[derive(Error, Debug)]
pub enum Error {
    /// A signal with the same name is already being watched.
    #[error("signal `{0}` is already registered")]
    DuplicateSignal(String),

    /// A registration call named no signals at all.
    #[error("no signals given to register")]
    EmptyRegistration,

    /// A signal reported a width of zero bits.
    #[error("signal `{0}` has zero width")]
    ZeroWidth(String),

    /// A bus color outside the renderer's palette.
    #[error("color tag {0} is not a valid bus color (expected 2..=9)")]
    InvalidColor(u8),

    /// The waveform was already finalized and accepts no further changes.
    #[error("waveform `{0}` is already finalized")]
    Finalized(String),

    /// A value driven onto a signal of a different width.
    #[error("value of {actual} bits driven onto signal `{name}` of {expected} bits")]
    WidthMismatch {
        /// The signal.
        name: String,
        /// The width of the signal.
        expected: usize,
        /// The width of the value.
        actual: usize,
    },

    /// A character that does not denote a logic level.
    #[error("invalid logic character `{0}`")]
    InvalidLogic(char),

    /// A hierarchical name that does not exist in a value change dump.
    #[error("no variable `{0}` in value change dump")]
    UnknownVariable(String),

    /// A value change dump that could not be parsed.
    #[error("malformed value change dump: {0}")]
    MalformedDump(String),

    /// The external renderer failed.
    #[error("rendering {path} failed: {message}")]
    Render {
        /// The artifact that should have been produced.
        path: PathBuf,
        /// What the renderer reported.
        message: String,
    },

    /// Serialization of the trace failed.
    #[error("serializing trace: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A result with the crate's `Error`.
pub type Result<T> = std::result::Result<T, Error>;
