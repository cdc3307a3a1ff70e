//! Chroma subsampling and block padding.
//!
//! Subsampling here is 4:2:0 by value: each 2x2 group of Cb (and Cr)
//! samples is replaced by its truncated average, written back to every
//! member of the group. The buffer keeps its full size, so the frame
//! header advertises 1x1 sampling for every component.
//!
//! Padding grows an image to whole 8x8 blocks by mirrored edge
//! replication: padding column `w + k` copies column `w - 1 - k`, and
//! padding row `h + k` copies row `h - 1 - k` of the width-extended image.
//! When the padding is wider than the image the mirror stops at the
//! first column or row.

use crate::consts::DCTSIZE;
use crate::error::{Error, Result};
use crate::executor::Backend;
use crate::types::{Channel, Image, YCbCrImage};

/// Average each 2x2 group of the Cb and Cr channels in place.
///
/// Y is untouched. A trailing odd column or row forms its own group
/// (2x1, 1x2 or 1x1) averaged over the samples it actually has.
pub fn subsample_420(image: &mut YCbCrImage, backend: Backend) {
    let width = image.width();
    let height = image.height();
    if width == 0 || height == 0 {
        return;
    }
    // Each task owns a pair of rows (the last may hold only one).
    backend.for_each_chunk_mut(image.pixels_mut(), 2 * width, |_, rows| {
        let rows_in_group = rows.len() / width;
        for x0 in (0..width).step_by(2) {
            let cols = if x0 + 1 < width { 2 } else { 1 };
            let count = (cols * rows_in_group) as u32;
            let mut sums = [0u32; 2];
            for dy in 0..rows_in_group {
                for dx in 0..cols {
                    let px = &rows[dy * width + x0 + dx];
                    sums[0] += px[Channel::Cb.index()] as u32;
                    sums[1] += px[Channel::Cr.index()] as u32;
                }
            }
            let cb = (sums[0] / count) as u8;
            let cr = (sums[1] / count) as u8;
            for dy in 0..rows_in_group {
                for dx in 0..cols {
                    let px = &mut rows[dy * width + x0 + dx];
                    px[Channel::Cb.index()] = cb;
                    px[Channel::Cr.index()] = cr;
                }
            }
        }
    });
    log::debug!("sample: 4:2:0 chroma averaging over {}x{}", width, height);
}

/// Like [`subsample_420`], but rejects odd dimensions.
pub fn subsample_420_strict(image: &mut YCbCrImage, backend: Backend) -> Result<()> {
    let (width, height) = (image.width(), image.height());
    if width % 2 != 0 || height % 2 != 0 {
        return Err(Error::OddDimensions { width, height });
    }
    subsample_420(image, backend);
    Ok(())
}

/// Round both dimensions up to the next multiple of 8.
///
/// Dimensions that are already multiples of 8 are unchanged.
pub fn padded_dimensions(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(DCTSIZE) * DCTSIZE, height.div_ceil(DCTSIZE) * DCTSIZE)
}

/// Source index for padding position `old + k`.
#[inline]
fn mirror(old: usize, k: usize) -> usize {
    old - 1 - k.min(old - 1)
}

/// Extend an image to whole 8x8 blocks by mirrored edge replication.
pub fn pad_to_blocks<T: Copy>(image: &Image<T>) -> Result<Image<T>> {
    let (old_w, old_h) = (image.width(), image.height());
    if old_w == 0 || old_h == 0 {
        return Err(Error::InvalidDimensions {
            width: old_w,
            height: old_h,
        });
    }
    let (new_w, new_h) = padded_dimensions(old_w, old_h);
    if (new_w, new_h) == (old_w, old_h) {
        return Ok(image.clone());
    }

    let fill = image.pixels()[0];
    let mut out = Image::new(new_w, new_h, fill)?;
    let pixels = out.pixels_mut();

    for y in 0..old_h {
        let src = image.row(y);
        let dst = &mut pixels[y * new_w..(y + 1) * new_w];
        dst[..old_w].copy_from_slice(src);
        for k in 0..new_w - old_w {
            dst[old_w + k] = src[mirror(old_w, k)];
        }
    }
    for k in 0..new_h - old_h {
        let src_y = mirror(old_h, k);
        let dst_y = old_h + k;
        pixels.copy_within(src_y * new_w..(src_y + 1) * new_w, dst_y * new_w);
    }

    log::debug!(
        "sample: padded {}x{} to {}x{}",
        old_w,
        old_h,
        new_w,
        new_h
    );
    Ok(out)
}
