//! Block table: the flat per-(block, channel) layout of coefficients.
//!
//! Every 8x8 tile of every channel becomes one 64-entry row. Rows are
//! grouped by channel: all Y blocks in raster order, then all Cb blocks,
//! then all Cr blocks, so
//!
//! ```text
//! row = (y / 8) * blocks_per_row + x / 8 + rows_per_channel * channel
//! ```
//!
//! and position `v * 8 + u` of a row holds coefficient `(u, v)`.
//! Rows are disjoint slices of one buffer, so stages can fill them from
//! parallel tasks.

use crate::consts::{DCTSIZE, DCTSIZE2, NUM_COMPONENTS};
use crate::error::{Error, Result};
use crate::executor::Backend;
use crate::types::{try_alloc_vec, Channel, Image, SampleImage};

/// Read one channel of the 8x8 tile starting at `(bx * 8, by * 8)`.
///
/// `pixels` is the full image, `width` pixels per row.
#[inline]
pub fn gather_block<T: Copy + Default>(
    pixels: &[[T; 3]],
    width: usize,
    bx: usize,
    by: usize,
    channel: usize,
) -> [T; DCTSIZE2] {
    let mut block = [T::default(); DCTSIZE2];
    for (y, out_row) in block.chunks_exact_mut(DCTSIZE).enumerate() {
        let start = (by * DCTSIZE + y) * width + bx * DCTSIZE;
        for (out, px) in out_row.iter_mut().zip(&pixels[start..start + DCTSIZE]) {
            *out = px[channel];
        }
    }
    block
}

/// Write one channel of the tile in block-row `rows`.
///
/// `rows` holds exactly eight image rows of `width` pixels.
#[inline]
pub fn scatter_block<T: Copy>(
    rows: &mut [[T; 3]],
    width: usize,
    bx: usize,
    channel: usize,
    block: &[T; DCTSIZE2],
) {
    for (y, src_row) in block.chunks_exact(DCTSIZE).enumerate() {
        let start = y * width + bx * DCTSIZE;
        for (px, &v) in rows[start..start + DCTSIZE].iter_mut().zip(src_row) {
            px[channel] = v;
        }
    }
}

/// Apply `kernel` to every (block, channel) tile of a block-aligned image.
///
/// One task per row of blocks. `kernel` receives the channel and the
/// tile and returns its replacement.
pub fn for_each_tile<F>(image: &mut SampleImage, backend: Backend, kernel: F) -> Result<()>
where
    F: Fn(Channel, &[f64; DCTSIZE2]) -> [f64; DCTSIZE2] + Sync + Send,
{
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 || width % DCTSIZE != 0 || height % DCTSIZE != 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    let blocks_per_row = width / DCTSIZE;
    backend.for_each_chunk_mut(image.pixels_mut(), width * DCTSIZE, |_, rows| {
        for bx in 0..blocks_per_row {
            for channel in Channel::ALL {
                let tile = gather_block(rows, width, bx, 0, channel.index());
                let out = kernel(channel, &tile);
                scatter_block(rows, width, bx, channel.index(), &out);
            }
        }
    });
    Ok(())
}

/// Flat table of 64-coefficient rows, one per (block, channel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTable {
    data: Vec<[i32; DCTSIZE2]>,
    blocks_per_row: usize,
    block_rows: usize,
}

impl BlockTable {
    /// Create an all-zero table for an image of `blocks_per_row` x `block_rows` tiles.
    pub fn zeroed(blocks_per_row: usize, block_rows: usize) -> Result<Self> {
        let len = blocks_per_row
            .checked_mul(block_rows)
            .and_then(|n| n.checked_mul(NUM_COMPONENTS))
            .ok_or(Error::AllocationFailed)?;
        let mut data = try_alloc_vec::<[i32; DCTSIZE2]>(len)?;
        data.resize(len, [0; DCTSIZE2]);
        Ok(Self {
            data,
            blocks_per_row,
            block_rows,
        })
    }

    /// Linearize a block-aligned image of quantized coefficients.
    pub fn from_image(image: &SampleImage, backend: Backend) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 || width % DCTSIZE != 0 || height % DCTSIZE != 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let mut table = Self::zeroed(width / DCTSIZE, height / DCTSIZE)?;
        let blocks_per_row = table.blocks_per_row;
        let rows_per_channel = table.rows_per_channel();
        let pixels = image.pixels();

        backend.for_each_chunk_mut(&mut table.data, 1, |row, out| {
            let channel = row / rows_per_channel;
            let block = row % rows_per_channel;
            let tile = gather_block(
                pixels,
                width,
                block % blocks_per_row,
                block / blocks_per_row,
                channel,
            );
            for (dst, v) in out[0].iter_mut().zip(tile) {
                *dst = v.round() as i32;
            }
        });
        log::debug!(
            "blocks: {} rows ({} per channel, {} per block row)",
            table.num_rows(),
            rows_per_channel,
            blocks_per_row
        );
        Ok(table)
    }

    /// Rebuild a coefficient image from the table (inverse of [`from_image`](Self::from_image)).
    pub fn to_image(&self) -> Result<SampleImage> {
        let width = self.blocks_per_row * DCTSIZE;
        let mut image = Image::new(width, self.block_rows * DCTSIZE, [0.0; 3])?;
        for (by, rows) in image.pixels_mut().chunks_exact_mut(width * DCTSIZE).enumerate() {
            for bx in 0..self.blocks_per_row {
                for channel in Channel::ALL {
                    let row = self.row(self.row_index(by * self.blocks_per_row + bx, channel));
                    let mut tile = [0.0; DCTSIZE2];
                    for (t, &v) in tile.iter_mut().zip(row) {
                        *t = v as f64;
                    }
                    scatter_block(rows, width, bx, channel.index(), &tile);
                }
            }
        }
        Ok(image)
    }

    /// Blocks per channel (`rowsPerChannel`).
    pub fn rows_per_channel(&self) -> usize {
        self.blocks_per_row * self.block_rows
    }

    /// Blocks across one row of the image.
    pub fn blocks_per_row(&self) -> usize {
        self.blocks_per_row
    }

    /// Rows of blocks down the image.
    pub fn block_rows(&self) -> usize {
        self.block_rows
    }

    /// Total rows: three per spatial block.
    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    /// Row holding spatial block `block` of `channel`.
    #[inline]
    pub fn row_index(&self, block: usize, channel: Channel) -> usize {
        block + self.rows_per_channel() * channel.index()
    }

    /// Channel a row belongs to.
    pub fn channel_of(&self, row: usize) -> Channel {
        match row / self.rows_per_channel().max(1) {
            0 => Channel::Y,
            1 => Channel::Cb,
            _ => Channel::Cr,
        }
    }

    /// One 64-entry row.
    ///
    /// # Panics
    /// Panics if `row >= num_rows()`.
    #[inline]
    pub fn row(&self, row: usize) -> &[i32; DCTSIZE2] {
        &self.data[row]
    }

    /// One 64-entry row, mutably.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [i32; DCTSIZE2] {
        &mut self.data[row]
    }

    /// Iterate rows in table order.
    pub fn rows(&self) -> std::slice::Iter<'_, [i32; DCTSIZE2]> {
        self.data.iter()
    }

    /// The flat buffer.
    pub fn as_slice(&self) -> &[i32] {
        self.data.as_flattened()
    }

    /// Produce a new table with `f` applied to every row.
    pub fn map_rows<F>(&self, backend: Backend, f: F) -> Result<Self>
    where
        F: Fn(&[i32; DCTSIZE2]) -> [i32; DCTSIZE2] + Sync + Send,
    {
        let mut out = Self::zeroed(self.blocks_per_row, self.block_rows)?;
        backend.for_each_chunk_mut(&mut out.data, 1, |row, dst| {
            dst[0] = f(self.row(row));
        });
        Ok(out)
    }
}
