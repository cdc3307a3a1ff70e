//! Quantization tables and coefficient quantization.
//!
//! Tables are kept in natural (row-major) order: entry `v * 8 + u`
//! divides coefficient `(u, v)`. They are converted to zigzag order only
//! when written to a DQT segment.

use crate::blocks::for_each_tile;
use crate::consts::{DCTSIZE2, JPEG_NATURAL_ORDER, STD_CHROMA_QUANT, STD_LUMA_QUANT};
use crate::error::{Error, Result};
use crate::executor::Backend;
use crate::types::{Channel, SampleImage};

/// One 8x8 quantization matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable {
    values: [u16; DCTSIZE2],
}

impl QuantTable {
    /// Create a table from natural-order values.
    ///
    /// Baseline DQT segments carry 8-bit entries, so every value must be
    /// in 1..=255.
    pub fn new(values: [u16; DCTSIZE2]) -> Result<Self> {
        if let Some(index) = values.iter().position(|&v| v == 0 || v > 255) {
            return Err(Error::InvalidQuantTable {
                index,
                value: values[index],
            });
        }
        Ok(Self { values })
    }

    /// Annex K luminance table.
    pub fn std_luma() -> Self {
        Self {
            values: STD_LUMA_QUANT,
        }
    }

    /// Annex K chrominance table.
    pub fn std_chroma() -> Self {
        Self {
            values: STD_CHROMA_QUANT,
        }
    }

    /// Natural-order values.
    pub fn values(&self) -> &[u16; DCTSIZE2] {
        &self.values
    }

    /// Divisor for coefficient `(u, v)`, i.e. `table[v][u]`.
    #[inline]
    pub fn get(&self, u: usize, v: usize) -> u16 {
        self.values[v * 8 + u]
    }

    /// Values in zigzag order, as written to DQT.
    pub fn to_zigzag(&self) -> [u8; DCTSIZE2] {
        let mut out = [0u8; DCTSIZE2];
        for (zz, &natural) in JPEG_NATURAL_ORDER.iter().enumerate() {
            // Entries are validated to 1..=255 on construction
            out[zz] = self.values[natural] as u8;
        }
        out
    }

    /// Rescale with the IJG quality formula.
    ///
    /// Quality 50 leaves the table unchanged; lower values coarsen it,
    /// higher values refine it. Results are clamped to 1..=255.
    pub fn scaled(&self, quality: u8) -> Result<Self> {
        if !(1..=100).contains(&quality) {
            return Err(Error::InvalidQuality(quality));
        }
        let scale = if quality < 50 {
            5000 / quality as u32
        } else {
            200 - 2 * quality as u32
        };

        let mut values = [0u16; DCTSIZE2];
        for (dst, &base) in values.iter_mut().zip(&self.values) {
            let val = (base as u32 * scale + 50) / 100;
            *dst = val.clamp(1, 255) as u16;
        }
        Ok(Self { values })
    }
}

/// The luma/chroma table pair used by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTables {
    /// Table 0, applied to Y
    pub luma: QuantTable,
    /// Table 1, applied to Cb and Cr
    pub chroma: QuantTable,
}

impl Default for QuantTables {
    fn default() -> Self {
        Self {
            luma: QuantTable::std_luma(),
            chroma: QuantTable::std_chroma(),
        }
    }
}

impl QuantTables {
    /// Table for a channel.
    pub fn for_channel(&self, channel: Channel) -> &QuantTable {
        if channel.is_luma() {
            &self.luma
        } else {
            &self.chroma
        }
    }

    /// Both tables rescaled to `quality`.
    pub fn scaled(&self, quality: u8) -> Result<Self> {
        Ok(Self {
            luma: self.luma.scaled(quality)?,
            chroma: self.chroma.scaled(quality)?,
        })
    }
}

/// Quantize one block: `Q(u,v) = round(F(u,v) / table[v][u])`.
///
/// Rounding is half away from zero.
#[inline]
pub fn quantize_block(coeffs: &[f64; DCTSIZE2], table: &QuantTable) -> [f64; DCTSIZE2] {
    let mut out = [0.0f64; DCTSIZE2];
    for ((dst, &c), &q) in out.iter_mut().zip(coeffs).zip(&table.values) {
        *dst = (c / q as f64).round();
    }
    out
}

/// Quantize every block of a transformed image in place.
pub fn quantize_image(
    image: &mut SampleImage,
    tables: &QuantTables,
    backend: Backend,
) -> Result<()> {
    for_each_tile(image, backend, |channel, tile| {
        quantize_block(tile, tables.for_channel(channel))
    })?;
    log::debug!("quant: quantized {}x{} coefficients", image.width(), image.height());
    Ok(())
}
