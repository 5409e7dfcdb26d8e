//! Error types and exit-code constants for impsort.
//!
//! This module provides a unified error type (`SortError`) that bridges
//! failures from the parsing, formatting, and file-handling subsystems
//! into a common format suitable for CLI reporting.
//!
//! ## Exit Code Mapping
//!
//! - `0`: All files clean (or rewritten successfully)
//! - `1`: Check found incorrectly sorted files, or a file failed to parse
//! - `2`: Invalid arguments (bad input from caller)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! Parse failures are per-unit: a malformed buffer aborts processing of
//! that one buffer only and the original text is left untouched. The
//! batch driver records the failure and continues with the other files.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Stable exit codes for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Everything clean.
    Clean = 0,
    /// Incorrectly sorted input in check mode, or a per-file failure.
    Dirty = 1,
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl ExitStatus {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the sorting pipeline.
#[derive(Debug, Error)]
pub enum SortError {
    /// The import block could not be parsed. The buffer is returned
    /// unmodified; this is a distinct error kind, never silently swallowed.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Invalid configuration value.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// I/O failure while reading or writing a file.
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SortError {
    /// Create a parse error at the given 1-indexed line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        SortError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        SortError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        SortError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SortError::Internal {
            message: message.into(),
        }
    }

    /// Get the exit status this error maps to.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            SortError::Parse { .. } => ExitStatus::Dirty,
            SortError::InvalidConfig { .. } => ExitStatus::InvalidArguments,
            SortError::Io { .. } => ExitStatus::Dirty,
            SortError::Internal { .. } => ExitStatus::InternalError,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
