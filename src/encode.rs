//! Baseline JPEG encoder pipeline.
//!
//! [`Encoder`] runs the full linear pipeline over an RGB image:
//!
//! 1. RGB → YCbCr (truncating)
//! 2. Optional 4:2:0 chroma averaging, duplicate-filled in place
//! 3. Mirrored padding to whole 8x8 blocks
//! 4. Level shift and forward DCT
//! 5. Quantization and linearization into a [`BlockTable`]
//! 6. Zig-zag, AC run-length coding and Huffman coding
//! 7. JFIF serialization
//!
//! # Examples
//!
//! ```no_run
//! use baseline_jpeg::{Backend, Encoder};
//!
//! let pixels: Vec<u8> = vec![128; 64 * 48 * 3];
//! let jpeg = Encoder::new()
//!     .comment("example")
//!     .backend(Backend::Parallel)
//!     .encode_rgb(&pixels, 64, 48)?;
//! # Ok::<(), baseline_jpeg::Error>(())
//! ```

use std::io::Write;

use crate::blocks::BlockTable;
use crate::color::convert_image;
use crate::consts::DCTSIZE2;
use crate::dct::{level_shift, transform_image};
use crate::entropy::HuffmanEncoder;
use crate::error::{Error, Result};
use crate::executor::Backend;
use crate::huffman::StandardTables;
use crate::marker::{validate_comment, MarkerWriter};
use crate::quant::{quantize_image, QuantTable, QuantTables};
use crate::rle::{encode_table, RleToken};
use crate::sample::{pad_to_blocks, subsample_420};
use crate::types::{Channel, PixelDensity, RgbImage, ScanData};
use crate::zigzag::zigzag_table;

/// Comment written when none is configured.
pub const DEFAULT_COMMENT: &str = "baseline-jpeg";

/// Largest width or height the SOF0 header can carry.
pub const MAX_DIMENSION: usize = u16::MAX as usize;

// ============================================================================
// Encoder
// ============================================================================

/// Baseline JPEG encoder.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// Custom luminance quantization table, natural order
    luma_qtable: Option<[u16; DCTSIZE2]>,
    /// Custom chrominance quantization table, natural order
    chroma_qtable: Option<[u16; DCTSIZE2]>,
    /// IJG quality rescaling of the active tables (None = unscaled)
    quality: Option<u8>,
    /// COM segment text (None = no COM segment)
    comment: Option<String>,
    /// Average chroma over 2x2 groups
    subsample_chroma: bool,
    /// Pixel density for JFIF APP0 marker
    pixel_density: PixelDensity,
    /// Where the per-pixel and per-block stages run
    backend: Backend,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Create an encoder with the standard tables, chroma subsampling on,
    /// 72 DPI and the default comment.
    pub fn new() -> Self {
        Self {
            luma_qtable: None,
            chroma_qtable: None,
            quality: None,
            comment: Some(DEFAULT_COMMENT.to_owned()),
            subsample_chroma: true,
            pixel_density: PixelDensity::default(),
            backend: Backend::Sequential,
        }
    }

    /// Set custom luminance quantization table.
    ///
    /// Values are in natural (row-major) order, not zigzag, and must be
    /// in 1..=255.
    pub fn luma_qtable(mut self, table: [u16; DCTSIZE2]) -> Self {
        self.luma_qtable = Some(table);
        self
    }

    /// Set custom chrominance quantization table.
    ///
    /// Values are in natural (row-major) order, not zigzag, and must be
    /// in 1..=255.
    pub fn chroma_qtable(mut self, table: [u16; DCTSIZE2]) -> Self {
        self.chroma_qtable = Some(table);
        self
    }

    /// Rescale both tables with the IJG quality formula (1-100).
    ///
    /// Quality 50 leaves the tables unchanged. Out-of-range values are
    /// reported when encoding.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the COM segment text (ASCII, at most 65533 bytes).
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Omit the COM segment.
    pub fn no_comment(mut self) -> Self {
        self.comment = None;
        self
    }

    /// Enable or disable 4:2:0 chroma averaging.
    pub fn subsample_chroma(mut self, enable: bool) -> Self {
        self.subsample_chroma = enable;
        self
    }

    /// Set pixel density for the JFIF APP0 marker.
    pub fn pixel_density(mut self, density: PixelDensity) -> Self {
        self.pixel_density = density;
        self
    }

    /// Choose the executor for the data-parallel stages.
    ///
    /// Every backend produces identical output.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// The tables this encoder will quantize with.
    pub fn quant_tables(&self) -> Result<QuantTables> {
        let luma = match self.luma_qtable {
            Some(values) => QuantTable::new(values)?,
            None => QuantTable::std_luma(),
        };
        let chroma = match self.chroma_qtable {
            Some(values) => QuantTable::new(values)?,
            None => QuantTable::std_chroma(),
        };
        let tables = QuantTables { luma, chroma };
        match self.quality {
            Some(quality) => tables.scaled(quality),
            None => Ok(tables),
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Encode RGB image data to JPEG.
    ///
    /// # Arguments
    /// * `rgb_data` - RGB pixel data (3 bytes per pixel, row-major order)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    ///
    /// # Returns
    /// JPEG-encoded data as a `Vec<u8>`.
    pub fn encode_rgb(&self, rgb_data: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        validate_dimensions(width, height)?;
        let image = RgbImage::from_rgb_bytes(rgb_data, width, height)?;
        self.encode_image(&image)
    }

    /// Encode an RGB image to JPEG.
    pub fn encode_image(&self, image: &RgbImage) -> Result<Vec<u8>> {
        let tables = self.quant_tables()?;
        let huffman = StandardTables::new()?;
        let encoded = self.run_pipeline(image, &tables, &huffman)?;

        let mut output = Vec::with_capacity(encoded.scan.bytes.len() + 1024);
        self.write_jfif(&mut output, &encoded, &tables, &huffman)?;
        log::debug!(
            "encode: {}x{} -> {} bytes",
            image.width(),
            image.height(),
            output.len()
        );
        Ok(output)
    }

    /// Encode RGB image data to a writer.
    ///
    /// The file is assembled in memory and written in one call, so a
    /// failed encode writes nothing.
    pub fn encode_rgb_to_writer<W: Write>(
        &self,
        rgb_data: &[u8],
        width: usize,
        height: usize,
        mut output: W,
    ) -> Result<()> {
        let jpeg = self.encode_rgb(rgb_data, width, height)?;
        output.write_all(&jpeg)?;
        output.flush()?;
        Ok(())
    }

    /// Run the pipeline up to Huffman coding and return its artifacts.
    pub fn analyze(&self, image: &RgbImage) -> Result<EncodedScan> {
        let tables = self.quant_tables()?;
        let huffman = StandardTables::new()?;
        self.run_pipeline(image, &tables, &huffman)
    }

    /// Pipeline body shared by [`Encoder::analyze`] and [`Encoder::encode_image`].
    fn run_pipeline(
        &self,
        image: &RgbImage,
        tables: &QuantTables,
        huffman: &StandardTables,
    ) -> Result<EncodedScan> {
        let (width, height) = (image.width(), image.height());
        validate_dimensions(width, height)?;
        if let Some(comment) = &self.comment {
            validate_comment(comment)?;
        }
        let backend = self.backend;

        // Step 1: Convert RGB to YCbCr
        let mut ycbcr = convert_image(image, backend)?;

        // Step 2: Average chroma in place
        if self.subsample_chroma {
            subsample_420(&mut ycbcr, backend);
        }

        // Step 3: Pad to whole blocks
        let padded = pad_to_blocks(&ycbcr)?;
        drop(ycbcr);

        // Step 4: Level shift and DCT
        let mut samples = level_shift(&padded)?;
        drop(padded);
        transform_image(&mut samples, backend)?;

        // Step 5: Quantize and linearize
        quantize_image(&mut samples, tables, backend)?;
        let natural = BlockTable::from_image(&samples, backend)?;
        drop(samples);

        // Step 6: Zig-zag, RLE, Huffman
        let coefficients = zigzag_table(&natural, backend)?;
        drop(natural);
        let tokens = encode_table(&coefficients, backend);
        if log::log_enabled!(log::Level::Trace) {
            for channel in Channel::ALL {
                let row = coefficients.row_index(0, channel);
                log::trace!(
                    "encode: {:?} block 0 dc={} tokens={}",
                    channel,
                    coefficients.row(row)[0],
                    tokens[row].len()
                );
            }
        }
        let scan = HuffmanEncoder::new(huffman).encode(&coefficients, &tokens)?;

        Ok(EncodedScan {
            width,
            height,
            coefficients,
            tokens,
            scan,
        })
    }

    /// Serialize the file around an encoded scan.
    fn write_jfif<W: Write>(
        &self,
        output: W,
        encoded: &EncodedScan,
        tables: &QuantTables,
        huffman: &StandardTables,
    ) -> Result<()> {
        let mut writer = MarkerWriter::new(output);

        writer.write_soi()?;
        writer.write_jfif_app0(&self.pixel_density)?;
        if let Some(comment) = &self.comment {
            writer.write_com(comment)?;
        }

        writer.write_dqt(0, &tables.luma)?;
        writer.write_dqt(1, &tables.chroma)?;

        // Dimensions were checked against MAX_DIMENSION in analyze
        writer.write_sof0(encoded.height as u16, encoded.width as u16)?;

        for (class, index, table) in &huffman.raw {
            writer.write_dht(*class, *index, table)?;
        }

        writer.write_sos()?;
        writer.write_scan_data(&encoded.scan)?;
        writer.write_eoi()?;
        Ok(())
    }
}

/// Reject sizes the frame header cannot describe.
fn validate_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}

// ============================================================================
// Pipeline artifacts
// ============================================================================

/// Intermediate results of one encode.
#[derive(Debug, Clone)]
pub struct EncodedScan {
    /// Source width in pixels
    pub width: usize,
    /// Source height in pixels
    pub height: usize,
    /// Quantized coefficients, one zig-zag ordered row per (block, channel)
    pub coefficients: BlockTable,
    /// Run-length tokens, indexed like `coefficients`
    pub tokens: Vec<Vec<RleToken>>,
    /// Packed Huffman output before byte stuffing
    pub scan: ScanData,
}

impl EncodedScan {
    /// Total number of RLE tokens across all blocks.
    pub fn token_count(&self) -> usize {
        self.tokens.iter().map(Vec::len).sum()
    }
}
