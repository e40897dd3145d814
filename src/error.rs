//! Error types.
//!
//! Handle lookups never produce errors: stale or unknown handles yield `None`
//! or `false`. The enums here cover the few operations that can fail in a way
//! the caller may want to report.

/// Errors from parsing style value strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleParseError {
    #[error("empty style value")]
    Empty,
    #[error("unrecognized input {0:?}")]
    Unrecognized(String),
    #[error("expected a length, found {0:?}")]
    ExpectedLength(String),
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("expected 1 to 4 values, found {0}")]
    SideCount(usize),
    #[error("unexpected trailing input {0:?}")]
    Trailing(String),
}

/// Errors from layout validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Event handlers kept invalidating geometry past the configured ceiling.
    #[error("layout did not settle after {passes} validation passes")]
    NotConverged { passes: u32 },
}

/// Errors reported by a [`ResourceManager`](crate::render::ResourceManager).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
}
