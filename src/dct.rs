//! Level shift and forward DCT.
//!
//! The transform is the textbook 2-D type-II DCT of T.81 A.3.3, evaluated
//! directly rather than through a fast factorization:
//!
//! ```text
//! F(u,v) = alpha(u) * alpha(v) / 4
//!          * sum_{x=0..7} sum_{y=0..7} f(x,y) * cos((2x+1)u*pi/16) * cos((2y+1)v*pi/16)
//! alpha(0) = 1/sqrt(2), alpha(k>0) = 1
//! ```
//!
//! `x` is the column and `y` the row inside the block; the output holds
//! `F(u,v)` at position `v * 8 + u`. The result is unscaled, so quantization
//! divides by the table entry directly.
//!
//! Every backend runs the same kernel. The multiversioned build only adds
//! target features; it does not contract or reorder the floating-point
//! operations, so results are identical across CPUs.

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::OnceLock;

use multiversion::multiversion;

use crate::blocks::for_each_tile;
use crate::consts::{DCTSIZE, DCTSIZE2};
use crate::error::Result;
use crate::executor::Backend;
use crate::types::{Image, SampleImage};

/// Sample offset for 8-bit data.
pub const CENTERJSAMPLE: f64 = 128.0;

/// `COS[k][n] = cos((2n + 1) * k * pi / 16)`
fn cos_table() -> &'static [[f64; DCTSIZE]; DCTSIZE] {
    static TABLE: OnceLock<[[f64; DCTSIZE]; DCTSIZE]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [[0.0; DCTSIZE]; DCTSIZE];
        for (k, row) in table.iter_mut().enumerate() {
            for (n, c) in row.iter_mut().enumerate() {
                *c = ((2 * n + 1) as f64 * k as f64 * PI / 16.0).cos();
            }
        }
        table
    })
}

/// `alpha(u) * alpha(v) / 4`, with the DC product kept exact.
#[inline]
fn norm(u: usize, v: usize) -> f64 {
    match (u == 0, v == 0) {
        (true, true) => 0.125,
        (true, false) | (false, true) => FRAC_1_SQRT_2 / 4.0,
        (false, false) => 0.25,
    }
}

/// Subtract 128 from every sample, producing signed floating-point samples.
pub fn level_shift(image: &Image<u8>) -> Result<SampleImage> {
    image.map(|px| {
        [
            px[0] as f64 - CENTERJSAMPLE,
            px[1] as f64 - CENTERJSAMPLE,
            px[2] as f64 - CENTERJSAMPLE,
        ]
    })
}

/// Forward DCT of one 8x8 block.
///
/// # Arguments
/// * `samples` - Level-shifted samples, row-major (`y * 8 + x`)
///
/// # Returns
/// Coefficients with `F(u,v)` at `v * 8 + u`
pub fn forward_dct_8x8(samples: &[f64; DCTSIZE2]) -> [f64; DCTSIZE2] {
    forward_dct_8x8_with(samples, cos_table())
}

#[multiversion(targets(
    "x86_64+avx2",
    "x86_64+sse4.1",
    "x86+avx2",
    "x86+sse4.1",
    "aarch64+neon",
))]
fn forward_dct_8x8_with(
    samples: &[f64; DCTSIZE2],
    cos: &[[f64; DCTSIZE]; DCTSIZE],
) -> [f64; DCTSIZE2] {
    let mut coeffs = [0.0f64; DCTSIZE2];
    for v in 0..DCTSIZE {
        for u in 0..DCTSIZE {
            let mut sum = 0.0f64;
            for x in 0..DCTSIZE {
                for y in 0..DCTSIZE {
                    sum += samples[y * DCTSIZE + x] * cos[u][x] * cos[v][y];
                }
            }
            coeffs[v * DCTSIZE + u] = norm(u, v) * sum;
        }
    }
    coeffs
}

/// Transform every block of every channel in place.
///
/// The image must already be padded to whole blocks.
pub fn transform_image(image: &mut SampleImage, backend: Backend) -> Result<()> {
    for_each_tile(image, backend, |_, tile| forward_dct_8x8(tile))?;
    log::debug!(
        "dct: transformed {} blocks per channel",
        (image.width() / DCTSIZE) * (image.height() / DCTSIZE)
    );
    Ok(())
}
