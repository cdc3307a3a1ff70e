//! Core type definitions for the encoder.
//!
//! Images are owned, bounds-checked three-channel rasters. The same
//! container holds RGB samples, YCbCr samples, and the floating-point
//! samples and coefficients of the transform stages.

use std::collections::TryReserveError;

use crate::error::{Error, Result};

// =============================================================================
// Images
// =============================================================================

/// A row-major raster of three-channel pixels.
///
/// `pixels.len() == width * height` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    pixels: Vec<[T; 3]>,
}

/// 8-bit RGB pixels.
pub type RgbImage = Image<u8>;

/// 8-bit YCbCr pixels.
pub type YCbCrImage = Image<u8>;

/// Level-shifted samples, DCT coefficients, or quantized coefficients.
pub type SampleImage = Image<f64>;

impl<T: Copy> Image<T> {
    /// Create an image filled with `fill`.
    pub fn new(width: usize, height: usize, fill: [T; 3]) -> Result<Self> {
        let len = checked_area(width, height)?;
        let mut pixels = try_alloc_vec::<[T; 3]>(len)?;
        pixels.resize(len, fill);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap an existing pixel vector.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<[T; 3]>) -> Result<Self> {
        let expected = checked_area(width, height)?;
        if pixels.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Apply `f` to every pixel, producing a new image of the same shape.
    pub fn map<U: Copy>(&self, f: impl Fn([T; 3]) -> [U; 3]) -> Result<Image<U>> {
        let mut pixels = try_alloc_vec::<[U; 3]>(self.pixels.len())?;
        pixels.extend(self.pixels.iter().map(|&p| f(p)));
        Ok(Image {
            width: self.width,
            height: self.height,
            pixels,
        })
    }
}

impl<T> Image<T> {
    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: usize, y: usize) -> Option<&[T; 3]> {
        if x < self.width && y < self.height {
            self.pixels.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Mutable pixel at `(x, y)`, or `None` outside the image.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut [T; 3]> {
        if x < self.width && y < self.height {
            self.pixels.get_mut(y * self.width + x)
        } else {
            None
        }
    }

    /// One row of pixels.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[[T; 3]] {
        assert!(y < self.height, "row {} out of range (height {})", y, self.height);
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Iterate rows mutably, top to bottom.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, [T; 3]> {
        self.pixels.chunks_exact_mut(self.width.max(1))
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[[T; 3]] {
        &self.pixels
    }

    /// All pixels in row-major order, mutably.
    pub fn pixels_mut(&mut self) -> &mut [[T; 3]] {
        &mut self.pixels
    }

    /// Consume the image and return its pixels.
    pub fn into_pixels(self) -> Vec<[T; 3]> {
        self.pixels
    }
}

impl RgbImage {
    /// Build an image from interleaved `RGBRGB...` bytes.
    pub fn from_rgb_bytes(data: &[u8], width: usize, height: usize) -> Result<Self> {
        let len = checked_area(width, height)?;
        let expected = len.checked_mul(3).ok_or(Error::InvalidDimensions {
            width,
            height,
        })?;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let mut pixels = try_alloc_vec::<[u8; 3]>(len)?;
        pixels.extend(data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]));
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Flatten back to interleaved bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }
}

fn checked_area(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or(Error::InvalidDimensions { width, height })
}

/// Allocate an empty vector with exactly `len` capacity.
///
/// Returns `Error::AllocationFailed` instead of aborting when memory
/// is exhausted.
pub fn try_alloc_vec<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_: TryReserveError| Error::AllocationFailed)?;
    Ok(v)
}

// =============================================================================
// Channels
// =============================================================================

/// Color channel of a YCbCr image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    /// Luminance
    Y = 0,
    /// Blue-difference chroma
    Cb = 1,
    /// Red-difference chroma
    Cr = 2,
}

impl Channel {
    /// Channels in encoding order.
    pub const ALL: [Channel; 3] = [Channel::Y, Channel::Cb, Channel::Cr];

    /// Index into a pixel triple.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for the luminance channel.
    pub const fn is_luma(self) -> bool {
        matches!(self, Channel::Y)
    }

    /// Component identifier written to SOF0 and SOS (1, 2, 3).
    pub const fn component_id(self) -> u8 {
        self as u8 + 1
    }

    /// Quantization/Huffman table slot (0 for luma, 1 for chroma).
    pub const fn table_id(self) -> u8 {
        if self.is_luma() {
            0
        } else {
            1
        }
    }

    /// Channel for a pixel-triple index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

// =============================================================================
// Pixel density
// =============================================================================

/// Units for the JFIF density fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DensityUnit {
    /// Density fields only give an aspect ratio
    None = 0,
    /// Dots per inch
    #[default]
    DotsPerInch = 1,
    /// Dots per centimeter
    DotsPerCm = 2,
}

/// Pixel density written to the JFIF APP0 segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDensity {
    /// Unit of `x` and `y`
    pub unit: DensityUnit,
    /// Horizontal density
    pub x: u16,
    /// Vertical density
    pub y: u16,
}

impl Default for PixelDensity {
    /// 72x72 DPI.
    fn default() -> Self {
        Self::dpi(72, 72)
    }
}

impl PixelDensity {
    /// Density in dots per inch.
    pub const fn dpi(x: u16, y: u16) -> Self {
        Self {
            unit: DensityUnit::DotsPerInch,
            x,
            y,
        }
    }

    /// Density in dots per centimeter.
    pub const fn dpcm(x: u16, y: u16) -> Self {
        Self {
            unit: DensityUnit::DotsPerCm,
            x,
            y,
        }
    }

    /// Unitless pixel aspect ratio.
    pub const fn aspect_ratio(x: u16, y: u16) -> Self {
        Self {
            unit: DensityUnit::None,
            x,
            y,
        }
    }
}

// =============================================================================
// Scan data
// =============================================================================

/// Entropy-coded scan bits before byte stuffing.
///
/// Bits are packed MSB-first. When `bit_len` is not a multiple of 8 the
/// final byte holds the tail in its high bits and the rest is padded
/// with 1-bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanData {
    /// Packed bytes
    pub bytes: Vec<u8>,
    /// Number of meaningful bits
    pub bit_len: usize,
}

impl ScanData {
    /// Render the meaningful bits as a string of `'0'` and `'1'`.
    pub fn to_bit_string(&self) -> String {
        (0..self.bit_len)
            .map(|i| {
                let byte = self.bytes[i / 8];
                if (byte >> (7 - (i % 8))) & 1 == 1 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_bounds() {
        let mut img = Image::new(3, 2, [0u8; 3]).unwrap();
        assert!(img.get(2, 1).is_some());
        assert!(img.get(3, 0).is_none());
        assert!(img.get(0, 2).is_none());
        *img.get_mut(1, 1).unwrap() = [1, 2, 3];
        assert_eq!(img.row(1)[1], [1, 2, 3]);
        assert_eq!(img.rows_mut().count(), 2);
    }

    #[test]
    fn test_from_pixels_rejects_length_mismatch() {
        let err = Image::from_pixels(2, 2, vec![[0u8; 3]; 3]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferSizeMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_rgb_bytes_roundtrip() {
        let data: Vec<u8> = (0..12).collect();
        let img = RgbImage::from_rgb_bytes(&data, 2, 2).unwrap();
        assert_eq!(img.get(1, 0), Some(&[3, 4, 5]));
        assert_eq!(img.to_rgb_bytes(), data);
        assert!(RgbImage::from_rgb_bytes(&data, 3, 2).is_err());
    }

    #[test]
    fn test_channel_ids() {
        assert_eq!(Channel::Y.component_id(), 1);
        assert_eq!(Channel::Cr.component_id(), 3);
        assert_eq!(Channel::Cb.table_id(), 1);
        assert!(Channel::Y.is_luma());
        assert_eq!(Channel::from_index(1), Some(Channel::Cb));
        assert_eq!(Channel::from_index(3), None);
    }

    #[test]
    fn test_default_density_is_72_dpi() {
        let d = PixelDensity::default();
        assert_eq!(d.unit as u8, 1);
        assert_eq!((d.x, d.y), (72, 72));
    }

    #[test]
    fn test_scan_bit_string() {
        let scan = ScanData {
            bytes: vec![0b1010_0000, 0b1111_1111],
            bit_len: 11,
        };
        assert_eq!(scan.to_bit_string(), "10100000111");
    }
}
