//! Zig-zag reordering of 8x8 blocks.
//!
//! Coefficients are visited along anti-diagonals `row + col = d` for
//! `d = 0..=14`, alternating direction so DC comes first and spatial
//! frequency rises along the sequence. Odd diagonals run top to bottom,
//! even diagonals bottom to top.

use crate::blocks::BlockTable;
use crate::consts::{DCTSIZE, DCTSIZE2, JPEG_NATURAL_ORDER};
use crate::error::Result;
use crate::executor::Backend;

/// `(row, col)` of each zig-zag position.
pub const ZIGZAG_COORDS: [(u8, u8); DCTSIZE2] = coords_from_natural();

const fn coords_from_natural() -> [(u8, u8); DCTSIZE2] {
    let mut out = [(0u8, 0u8); DCTSIZE2];
    let mut i = 0;
    while i < DCTSIZE2 {
        let n = JPEG_NATURAL_ORDER[i];
        out[i] = ((n / DCTSIZE) as u8, (n % DCTSIZE) as u8);
        i += 1;
    }
    out
}

/// Build the traversal by walking the anti-diagonals.
///
/// Equal to [`JPEG_NATURAL_ORDER`]; kept as the executable definition
/// of the ordering.
pub fn diagonal_order() -> [usize; DCTSIZE2] {
    let mut order = [0usize; DCTSIZE2];
    let mut k = 0;
    for d in 0..(2 * DCTSIZE - 1) {
        let lo = d.saturating_sub(DCTSIZE - 1);
        let hi = d.min(DCTSIZE - 1);
        let mut push = |row: usize| {
            order[k] = row * DCTSIZE + (d - row);
            k += 1;
        };
        if d % 2 == 1 {
            (lo..=hi).for_each(&mut push);
        } else {
            (lo..=hi).rev().for_each(&mut push);
        }
    }
    order
}

/// Reorder one block from natural (row-major) to zig-zag order.
#[inline]
pub fn zigzag_block<T: Copy + Default>(block: &[T; DCTSIZE2]) -> [T; DCTSIZE2] {
    let mut out = [T::default(); DCTSIZE2];
    for (dst, &natural) in out.iter_mut().zip(JPEG_NATURAL_ORDER.iter()) {
        *dst = block[natural];
    }
    out
}

/// Reorder one block from zig-zag back to natural order.
#[inline]
pub fn unzigzag_block<T: Copy + Default>(block: &[T; DCTSIZE2]) -> [T; DCTSIZE2] {
    let mut out = [T::default(); DCTSIZE2];
    for (&v, &natural) in block.iter().zip(JPEG_NATURAL_ORDER.iter()) {
        out[natural] = v;
    }
    out
}

/// Zig-zag every row of a block table.
pub fn zigzag_table(table: &BlockTable, backend: Backend) -> Result<BlockTable> {
    let out = table.map_rows(backend, zigzag_block)?;
    log::debug!("zigzag: reordered {} blocks", out.num_rows());
    Ok(out)
}
