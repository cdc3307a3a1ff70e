//! Color space conversion routines.
//!
//! This module implements RGB to YCbCr conversion following the ITU-R
//! BT.601 full-range equations used by JFIF:
//! ```text
//! Y  =  0.299    * R + 0.587    * G + 0.114    * B
//! Cb = -0.168736 * R - 0.331264 * G + 0.5      * B + 128
//! Cr =  0.5      * R - 0.418688 * G - 0.081312 * B + 128
//! ```
//!
//! Results are truncated, not rounded. The coefficients have six decimal
//! digits, so the arithmetic is done in fixed point at a scale of 10^6
//! where every product is exact. Truncating a float sum instead would turn
//! mid-gray `128` into `127`.

use crate::error::Result;
use crate::executor::Backend;
use crate::types::{Image, RgbImage, YCbCrImage};

/// Fixed-point scale: the coefficients are exact multiples of 1/SCALE.
const SCALE: i32 = 1_000_000;

/// Center value for Cb/Cr
const CBCR_CENTER: i32 = 128 * SCALE;

const Y_R: i32 = 299_000;
const Y_G: i32 = 587_000;
const Y_B: i32 = 114_000;
const CB_R: i32 = -168_736;
const CB_G: i32 = -331_264;
const CB_B: i32 = 500_000;
const CR_R: i32 = 500_000;
const CR_G: i32 = -418_688;
const CR_B: i32 = -81_312;

/// Convert a single RGB pixel to YCbCr.
///
/// # Arguments
/// * `r` - Red component (0-255)
/// * `g` - Green component (0-255)
/// * `b` - Blue component (0-255)
///
/// # Returns
/// Tuple of (Y, Cb, Cr) values, each truncated into 0-255
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as i32;
    let g = g as i32;
    let b = b as i32;

    let y = (Y_R * r + Y_G * g + Y_B * b).div_euclid(SCALE);
    let cb = (CB_R * r + CB_G * g + CB_B * b + CBCR_CENTER).div_euclid(SCALE);
    let cr = (CR_R * r + CR_G * g + CR_B * b + CBCR_CENTER).div_euclid(SCALE);

    // Cb and Cr reach 255.5 for saturated blue/red
    (
        y.clamp(0, 255) as u8,
        cb.clamp(0, 255) as u8,
        cr.clamp(0, 255) as u8,
    )
}

/// Convert a YCbCr pixel back to RGB.
///
/// This is the standard BT.601 inverse evaluated at the middle of each
/// sample's truncation interval (`v + 0.5`). Applied to the truncated
/// values directly, the textbook inverse is biased low and misses by up to
/// three units (e.g. blue of `(0, 8, 143)`); the midpoint keeps the round
/// trip through [`rgb_to_ycbcr`] within one unit per channel.
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> (u8, u8, u8) {
    let y = y as f64 + 0.5;
    let cb = cb as f64 + 0.5 - 128.0;
    let cr = cr as f64 + 0.5 - 128.0;

    let r = y + 1.402 * cr;
    let g = y - 0.344136 * cb - 0.714136 * cr;
    let b = y + 1.772 * cb;

    let clamp = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    (clamp(r), clamp(g), clamp(b))
}

/// Convert a whole RGB image to YCbCr, one row per task.
pub fn convert_image(rgb: &RgbImage, backend: Backend) -> Result<YCbCrImage> {
    let width = rgb.width();
    let mut out = Image::new(width, rgb.height(), [0u8; 3])?;
    backend.for_each_chunk_mut(out.pixels_mut(), width, |y, row| {
        for (dst, src) in row.iter_mut().zip(rgb.row(y)) {
            let (yy, cb, cr) = rgb_to_ycbcr(src[0], src[1], src[2]);
            *dst = [yy, cb, cr];
        }
    });
    log::debug!("color: converted {}x{} RGB to YCbCr", width, rgb.height());
    Ok(out)
}
