//! Error types for the baseline encoder.

use thiserror::Error;

/// Result type for encoder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage that raised an [`Error::CategoryOutOfRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// DC difference coding
    DcDifference,
    /// AC run/value coding
    AcCoefficient,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::DcDifference => f.write_str("DC difference"),
            Stage::AcCoefficient => f.write_str("AC coefficient"),
        }
    }
}

/// Error type for encoder operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Zero width or height, or a dimension the frame header cannot hold
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width
        width: usize,
        /// Image height
        height: usize,
    },

    /// Image buffer size doesn't match dimensions
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Expected buffer size
        expected: usize,
        /// Actual buffer size
        actual: usize,
    },

    /// Chroma subsampling was asked to reject odd dimensions
    #[error("Chroma subsampling requires even dimensions, got {width}x{height}")]
    OddDimensions {
        /// Image width
        width: usize,
        /// Image height
        height: usize,
    },

    /// Memory allocation failed
    #[error("Memory allocation failed")]
    AllocationFailed,

    /// A Huffman category the standard tables cannot code
    #[error("{stage} category {category} exceeds maximum {max} in block {block}")]
    CategoryOutOfRange {
        /// Coding step that found the value
        stage: Stage,
        /// Row of the block table
        block: usize,
        /// Computed category
        category: u8,
        /// Largest codable category
        max: u8,
    },

    /// Invalid Huffman table structure
    #[error("Invalid Huffman table structure")]
    InvalidHuffmanTable,

    /// A token stream that does not describe 63 AC coefficients
    #[error("Invalid run-length stream: {reason}")]
    InvalidRleStream {
        /// What was wrong
        reason: &'static str,
    },

    /// Invalid quality value (must be 1-100)
    #[error("Invalid quality value: {0} (must be 1-100)")]
    InvalidQuality(u8),

    /// Invalid quantization table entry
    #[error("Invalid quantization table: entry {index} is {value} (must be 1-255)")]
    InvalidQuantTable {
        /// Natural-order position
        index: usize,
        /// Offending value
        value: u16,
    },

    /// Comment text the COM segment cannot carry
    #[error("Invalid comment: {reason}")]
    InvalidComment {
        /// What was wrong
        reason: &'static str,
    },

    /// Malformed PPM input
    #[error("Invalid PPM: {reason}")]
    InvalidPpm {
        /// What was wrong
        reason: String,
    },

    /// I/O error from a source or sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
