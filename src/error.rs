//! Engine error types

use thiserror::Error;

use crate::geometry::{Position, Size};

/// Errors produced by the display engine.
///
/// Pipeline operations never fail; end-of-input is signalled by the
/// `Eof` key event value, not by an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A size was constructed with a negative component.
    ///
    /// Fatal to the call; retrying with the same arguments will fail again.
    #[error("invalid dimension: {columns}x{rows} (components must be non-negative)")]
    InvalidDimension { columns: i64, rows: i64 },

    /// A buffer access referenced a position outside the current size.
    ///
    /// Recoverable: re-validate against the current size and retry.
    /// Buffer reads and writes are never silently clamped; only cursor
    /// positioning performs (documented) clamping.
    #[error("position {pos:?} out of bounds for buffer size {size:?}")]
    OutOfBounds { pos: Position, size: Size },
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, Error>;
