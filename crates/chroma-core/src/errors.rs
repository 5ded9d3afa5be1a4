//! Structured error type shared across chroma crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`ChromaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, indices, particle names, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for event I/O and photon generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ChromaError {
    /// Particle name not known to the transport engine, or unusable kinematics.
    #[error("particle error: {0}")]
    Particle(ErrorInfo),
    /// Transport engine initialisation or runtime failure.
    #[error("engine error: {0}")]
    Engine(ErrorInfo),
    /// Record index outside the valid range of a file.
    #[error("index error: {0}")]
    IndexRange(ErrorInfo),
    /// Failure opening, reading, writing or closing a record store.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Record layout does not match the expected fixed schema.
    #[error("schema error: {0}")]
    Schema(ErrorInfo),
    /// Configuration parsing or validation errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl ChromaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            ChromaError::Particle(info)
            | ChromaError::Engine(info)
            | ChromaError::IndexRange(info)
            | ChromaError::Io(info)
            | ChromaError::Schema(info)
            | ChromaError::Config(info) => info,
        }
    }

    /// Returns `true` when the error reports an out-of-range record index.
    pub fn is_index_range(&self) -> bool {
        matches!(self, ChromaError::IndexRange(_))
    }

    /// Wraps an [`std::io::Error`] into the `Io` family with the given code.
    pub fn io(code: &str, err: &std::io::Error) -> Self {
        ChromaError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("kind", format!("{:?}", err.kind())),
        )
    }
}
