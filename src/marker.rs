//! JPEG marker emission for encoding.
//!
//! This module handles writing JPEG file format markers:
//! - SOI (Start of Image)
//! - APP0 (JFIF header)
//! - COM (Comment)
//! - DQT (Define Quantization Table)
//! - SOF0 (Start of Frame, baseline)
//! - DHT (Define Huffman Table)
//! - SOS (Start of Scan) and the stuffed scan bytes
//! - EOI (End of Image)
//!
//! All multi-byte fields are big-endian.
//!
//! Reference: ITU-T T.81 Section B

use std::io::Write;

use crate::bitstream::stuff_bytes;
use crate::consts::{
    DCTSIZE2, JPEG_APP0, JPEG_COM, JPEG_DHT, JPEG_DQT, JPEG_EOI, JPEG_SOF0, JPEG_SOI, JPEG_SOS,
    NUM_COMPONENTS,
};
use crate::error::{Error, Result};
use crate::huffman::{HuffTable, TableClass};
use crate::quant::QuantTable;
use crate::types::{Channel, PixelDensity, ScanData};

/// JFIF version string
const JFIF_ID: [u8; 5] = *b"JFIF\0";

/// JFIF version 1.01
const JFIF_VERSION: [u8; 2] = [1, 1];

/// Sampling factors of every component: 1x1
const SAMPLING_1X1: u8 = 0x11;

/// Longest comment a COM segment can hold
pub const MAX_COMMENT_LEN: usize = 65533;

/// Check that `comment` fits in a COM segment.
pub fn validate_comment(comment: &str) -> Result<()> {
    if !comment.is_ascii() {
        return Err(Error::InvalidComment {
            reason: "comment must be ASCII",
        });
    }
    if comment.len() > MAX_COMMENT_LEN {
        return Err(Error::InvalidComment {
            reason: "comment longer than 65533 bytes",
        });
    }
    Ok(())
}

/// Marker writer for JPEG encoding.
pub struct MarkerWriter<W: Write> {
    output: W,
    bytes_written: usize,
}

impl<W: Write> MarkerWriter<W> {
    /// Create a new marker writer.
    pub fn new(output: W) -> Self {
        Self {
            output,
            bytes_written: 0,
        }
    }

    /// Write a single byte.
    fn emit_byte(&mut self, byte: u8) -> std::io::Result<()> {
        self.output.write_all(&[byte])?;
        self.bytes_written += 1;
        Ok(())
    }

    /// Write a run of bytes.
    fn emit_bytes(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.output.write_all(bytes)?;
        self.bytes_written += bytes.len();
        Ok(())
    }

    /// Write a 2-byte value in big-endian order.
    fn emit_2bytes(&mut self, value: u16) -> std::io::Result<()> {
        self.emit_bytes(&value.to_be_bytes())
    }

    /// Write a marker (0xFF followed by marker code).
    fn emit_marker(&mut self, marker: u8) -> std::io::Result<()> {
        self.emit_byte(0xFF)?;
        self.emit_byte(marker)?;
        Ok(())
    }

    /// Write Start of Image marker.
    pub fn write_soi(&mut self) -> std::io::Result<()> {
        self.emit_marker(JPEG_SOI)
    }

    /// Write End of Image marker.
    pub fn write_eoi(&mut self) -> std::io::Result<()> {
        self.emit_marker(JPEG_EOI)
    }

    /// Write APP0 (JFIF) marker.
    pub fn write_jfif_app0(&mut self, density: &PixelDensity) -> std::io::Result<()> {
        self.emit_marker(JPEG_APP0)?;

        // Length: 2 (length) + 5 (identifier) + 2 (version) + 1 (units) +
        //         2 (x_density) + 2 (y_density) + 1 (thumbnail_width) +
        //         1 (thumbnail_height) = 16
        self.emit_2bytes(16)?;
        self.emit_bytes(&JFIF_ID)?;
        self.emit_bytes(&JFIF_VERSION)?;

        self.emit_byte(density.unit as u8)?;
        self.emit_2bytes(density.x)?;
        self.emit_2bytes(density.y)?;

        // No thumbnail
        self.emit_byte(0)?; // thumbnail width
        self.emit_byte(0)?; // thumbnail height

        Ok(())
    }

    /// Write a COM segment.
    ///
    /// # Errors
    /// [`Error::InvalidComment`] if the text is not ASCII or is too long;
    /// nothing is written in that case.
    pub fn write_com(&mut self, comment: &str) -> Result<()> {
        validate_comment(comment)?;
        self.emit_marker(JPEG_COM)?;
        self.emit_2bytes(2 + comment.len() as u16)?;
        self.emit_bytes(comment.as_bytes())?;
        Ok(())
    }

    /// Write one DQT segment holding a single 8-bit table.
    ///
    /// # Arguments
    /// * `table_index` - Table slot (0-3)
    /// * `table` - Natural-order table; written in zigzag order
    pub fn write_dqt(&mut self, table_index: u8, table: &QuantTable) -> std::io::Result<()> {
        self.emit_marker(JPEG_DQT)?;
        // Length: 2 (length) + 1 (Pq/Tq) + 64 (values)
        self.emit_2bytes(3 + DCTSIZE2 as u16)?;
        // Pq = 0 (8-bit) in high nibble, Tq in low nibble
        self.emit_byte(table_index & 0x0F)?;
        self.emit_bytes(&table.to_zigzag())?;
        Ok(())
    }

    /// Write a baseline SOF0 header for three 1x1-sampled components.
    ///
    /// Chroma subsampling is applied to sample values, not storage, so
    /// every component is declared at full resolution.
    pub fn write_sof0(&mut self, height: u16, width: u16) -> std::io::Result<()> {
        self.emit_marker(JPEG_SOF0)?;

        // Length: 2 (length) + 1 (precision) + 2 (height) + 2 (width) +
        //         1 (num_components) + 3 * num_components
        self.emit_2bytes(8 + 3 * NUM_COMPONENTS as u16)?;

        self.emit_byte(8)?; // precision
        self.emit_2bytes(height)?;
        self.emit_2bytes(width)?;
        self.emit_byte(NUM_COMPONENTS as u8)?;

        for channel in Channel::ALL {
            self.emit_byte(channel.component_id())?;
            self.emit_byte(SAMPLING_1X1)?;
            self.emit_byte(channel.table_id())?;
        }

        Ok(())
    }

    /// Write one DHT segment holding a single table.
    ///
    /// # Arguments
    /// * `class` - DC or AC
    /// * `table_index` - Table slot (0-3)
    /// * `table` - Huffman table
    pub fn write_dht(
        &mut self,
        class: TableClass,
        table_index: u8,
        table: &HuffTable,
    ) -> std::io::Result<()> {
        let num_symbols = table.num_symbols();

        self.emit_marker(JPEG_DHT)?;
        // Length: 2 (length) + 1 (Tc/Th) + 16 (bits) + symbols
        self.emit_2bytes(2 + 1 + 16 + num_symbols as u16)?;

        // Tc (table class) in high nibble, Th (table index) in low nibble
        self.emit_byte(((class as u8) << 4) | (table_index & 0x0F))?;
        self.emit_bytes(table.counts())?;
        self.emit_bytes(table.symbols())?;

        Ok(())
    }

    /// Write the SOS header of the single interleaved scan.
    pub fn write_sos(&mut self) -> std::io::Result<()> {
        self.emit_marker(JPEG_SOS)?;

        // Length: 2 (length) + 1 (Ns) + 2*Ns (component specs) + 3 (Ss, Se, Ah/Al)
        self.emit_2bytes(6 + 2 * NUM_COMPONENTS as u16)?;
        self.emit_byte(NUM_COMPONENTS as u8)?;

        for channel in Channel::ALL {
            self.emit_byte(channel.component_id())?;
            // DC table in high nibble, AC table in low nibble
            self.emit_byte((channel.table_id() << 4) | channel.table_id())?;
        }

        // Full spectral range, no successive approximation
        self.emit_byte(0)?;
        self.emit_byte(63)?;
        self.emit_byte(0)?;

        Ok(())
    }

    /// Write the packed scan, inserting 0x00 after every 0xFF.
    pub fn write_scan_data(&mut self, scan: &ScanData) -> std::io::Result<()> {
        let mut stuffed = Vec::new();
        stuff_bytes(&scan.bytes, &mut stuffed);
        self.emit_bytes(&stuffed)
    }

    /// Get total bytes written.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Consume the writer and return the underlying output.
    pub fn into_inner(self) -> W {
        self.output
    }
}
