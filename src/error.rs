//! Error types for the extraction core.
//!
//! Almost everything that can go wrong here (ambiguous references, lookup
//! misses, rejected resolutions) is local to one mention or step and is
//! reported as a diagnostic, not an error. The only fatal condition is a
//! broken contract with the surrounding pipeline.

use thiserror::Error;

/// Errors that abort extraction of a section.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// An experimental section reached reaction filing without a procedure
    /// element. Section segmentation guarantees one; its absence is a
    /// programming-contract violation upstream.
    #[error("experimental section is missing its procedure element")]
    MissingProcedure,
}

/// Result type for extraction operations.
pub type ExtractionResult<T> = Result<T, ExtractionError>;
