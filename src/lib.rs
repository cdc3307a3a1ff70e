//! # baseline-jpeg
//!
//! Baseline JFIF encoder with a sequential reference path and a
//! block-parallel path that produce byte-identical files.
//!
//! The encoder is a fixed linear pipeline:
//!
//! - **Color conversion** - truncating BT.601 RGB → YCbCr
//! - **Chroma averaging** - 4:2:0 averages written back over each 2x2 group
//! - **Padding** - mirrored edge replication to whole 8x8 blocks
//! - **DCT and quantization** - direct cosine-sum DCT, rounded division
//! - **Entropy coding** - zig-zag, AC run-length tokens, standard Huffman tables
//! - **JFIF output** - SOI, APP0, COM, DQT, SOF0, DHT, SOS, scan, EOI
//!
//! ## Quick Start
//!
//! ```no_run
//! use baseline_jpeg::Encoder;
//!
//! # fn main() -> Result<(), baseline_jpeg::Error> {
//! // RGB pixel data (3 bytes per pixel, row-major order)
//! let rgb_pixels: Vec<u8> = vec![0; 640 * 480 * 3];
//!
//! let jpeg_data = Encoder::new().encode_rgb(&rgb_pixels, 640, 480)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use baseline_jpeg::{Backend, Encoder, PixelDensity};
//!
//! # fn main() -> Result<(), baseline_jpeg::Error> {
//! # let rgb_pixels: Vec<u8> = vec![0; 100 * 100 * 3];
//! let jpeg_data = Encoder::new()
//!     .quality(85)                                 // IJG rescaling of the tables
//!     .comment("scanned 2024-05-01")               // COM segment
//!     .subsample_chroma(false)                     // full chroma detail
//!     .pixel_density(PixelDensity::dpi(300, 300))  // APP0 density
//!     .backend(Backend::Parallel)                  // rayon thread pool
//!     .encode_rgb(&rgb_pixels, 100, 100)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Inspecting the Pipeline
//!
//! [`Encoder::analyze`] stops before serialization and returns the
//! quantized blocks, their run-length tokens and the packed scan bits.
//!
//! ```no_run
//! use baseline_jpeg::{Encoder, RgbImage};
//!
//! # fn main() -> Result<(), baseline_jpeg::Error> {
//! let image = RgbImage::new(16, 16, [128, 128, 128])?;
//! let scan = Encoder::new().analyze(&image)?;
//! println!("{} tokens, {} bits", scan.token_count(), scan.scan.bit_len);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

// ============================================================================
// Pipeline stages
// ============================================================================

/// Bit packing and byte stuffing.
pub mod bitstream;

/// Block table layout and per-tile iteration.
pub mod blocks;

/// RGB ↔ YCbCr conversion.
pub mod color;

/// Marker codes, standard tables and the zig-zag order.
pub mod consts;

/// Level shift and forward DCT.
pub mod dct;

/// Huffman coding of DC differences and AC tokens.
pub mod entropy;

/// Sequential and rayon execution of data-parallel stages.
pub mod executor;

/// Huffman table construction.
pub mod huffman;

/// JFIF segment writing.
pub mod marker;

/// PPM input and output.
pub mod ppm;

/// Quantization tables and quantization.
pub mod quant;

/// AC run-length tokens.
pub mod rle;

/// Chroma averaging and block padding.
pub mod sample;

/// Image, channel and scan types.
pub mod types;

/// Zig-zag reordering.
pub mod zigzag;

mod encode;
mod error;

// ============================================================================
// Public API
// ============================================================================

/// The baseline JPEG encoder.
///
/// # Example
///
/// ```no_run
/// use baseline_jpeg::Encoder;
///
/// # fn main() -> Result<(), baseline_jpeg::Error> {
/// let pixels: Vec<u8> = vec![0; 640 * 480 * 3];
///
/// let jpeg = Encoder::new()
///     .no_comment()
///     .encode_rgb(&pixels, 640, 480)?;
/// # Ok(())
/// # }
/// ```
pub use encode::{EncodedScan, Encoder, DEFAULT_COMMENT, MAX_DIMENSION};

/// Error type for encoding operations.
///
/// # Example
///
/// ```no_run
/// use baseline_jpeg::{Encoder, Error};
///
/// # fn example() {
/// let result = Encoder::new().encode_rgb(&[], 0, 0);
/// match result {
///     Ok(data) => println!("Encoded {} bytes", data.len()),
///     Err(Error::InvalidDimensions { width, height }) => {
///         eprintln!("Invalid dimensions: {}x{}", width, height);
///     }
///     Err(e) => eprintln!("Encoding failed: {}", e),
/// }
/// # }
/// ```
pub use error::{Error, Stage};

/// Result type alias for encoding operations.
///
/// Equivalent to `std::result::Result<T, baseline_jpeg::Error>`.
pub use error::Result;

pub use executor::Backend;
pub use ppm::{load_ppm, read_ppm, save_ppm, write_ppm};
pub use quant::{QuantTable, QuantTables};

/// Pixel density for JFIF metadata.
///
/// ```no_run
/// use baseline_jpeg::{Encoder, PixelDensity};
///
/// # fn main() -> Result<(), baseline_jpeg::Error> {
/// # let pixels: Vec<u8> = vec![0; 100 * 100 * 3];
/// // 2:1 pixel aspect ratio
/// let jpeg = Encoder::new()
///     .pixel_density(PixelDensity::aspect_ratio(2, 1))
///     .encode_rgb(&pixels, 100, 100)?;
/// # Ok(())
/// # }
/// ```
pub use types::PixelDensity;

pub use types::{Channel, DensityUnit, Image, RgbImage, SampleImage, ScanData, YCbCrImage};
