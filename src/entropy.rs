//! Huffman entropy encoder for the baseline scan.
//!
//! This module implements baseline Huffman encoding for quantized blocks:
//! - DC coefficient encoding with differential coding
//! - AC coefficient encoding from run-length tokens
//! - EOB (End of Block) and ZRL (Zero Run Length) symbols
//!
//! Blocks are visited in raster order, interleaving the three channels of
//! each spatial block (Y, Cb, Cr). The DC predictor is a per-channel fold
//! over that order: each block's difference is taken against the previous
//! block of the same channel, starting from 0.
//!
//! Reference: ITU-T T.81 Section F.1.2

use crate::bitstream::BitWriter;
use crate::blocks::BlockTable;
use crate::consts::{MAX_AC_CATEGORY, MAX_DC_CATEGORY, NUM_COMPONENTS};
use crate::error::{Error, Result, Stage};
use crate::huffman::{DerivedTable, StandardTables};
use crate::rle::RleToken;
use crate::types::{Channel, ScanData};

/// EOB (End of Block) symbol - encodes as run=0, size=0
const EOB: u8 = 0x00;

/// ZRL (Zero Run Length 16) symbol - encodes 16 consecutive zeros
const ZRL: u8 = 0xF0;

/// Calculate the number of bits needed to represent a value.
///
/// This is the "category" in JPEG terminology:
/// - 0 → 0 bits (value must be 0)
/// - 1 → 1 bit (values -1, 1)
/// - 2 → 2 bits (values -3..-2, 2..3)
/// - etc.
#[inline]
pub fn category(value: i32) -> u8 {
    if value == 0 {
        return 0;
    }
    (32 - value.unsigned_abs().leading_zeros()) as u8
}

/// Magnitude bits of `value` within `category` bits.
///
/// Positive values are written as-is. Negative values are written as the
/// one's complement of `|value|`, which is `value - 1` masked to the
/// category width.
#[inline]
pub fn magnitude_bits(value: i32, category: u8) -> u32 {
    if category == 0 {
        return 0;
    }
    let mask = (1u32 << category) - 1;
    if value < 0 {
        (value as u32).wrapping_sub(1) & mask
    } else {
        value as u32 & mask
    }
}

/// DC differences for every row of a zig-zag block table.
///
/// Entry `row` is `dc(row) - dc(previous block of the same channel)`, with
/// the first block of each channel predicted from 0.
pub fn dc_differences(table: &BlockTable) -> Vec<i32> {
    let rows_per_channel = table.rows_per_channel();
    let mut last_dc_val = [0i32; NUM_COMPONENTS];
    table
        .rows()
        .enumerate()
        .map(|(row, block)| {
            let channel = row / rows_per_channel.max(1);
            let dc = block[0];
            let diff = dc - last_dc_val[channel];
            last_dc_val[channel] = dc;
            diff
        })
        .collect()
}

/// Baseline Huffman encoder over the standard tables.
pub struct HuffmanEncoder<'a> {
    tables: &'a StandardTables,
}

impl<'a> HuffmanEncoder<'a> {
    /// Create an encoder using `tables`.
    pub fn new(tables: &'a StandardTables) -> Self {
        Self { tables }
    }

    /// Encode a zig-zag block table and its AC tokens into packed scan bits.
    ///
    /// # Arguments
    /// * `table` - Zig-zag ordered coefficients; position 0 of each row is DC
    /// * `tokens` - Run-length tokens per row, as produced by [`crate::rle::encode_table`]
    ///
    /// # Errors
    /// [`Error::CategoryOutOfRange`] if a DC difference needs more than 11
    /// bits or an AC value more than 10. Nothing is clamped.
    pub fn encode(&self, table: &BlockTable, tokens: &[Vec<RleToken>]) -> Result<ScanData> {
        if tokens.len() != table.num_rows() {
            return Err(Error::InvalidRleStream {
                reason: "token rows do not match block table",
            });
        }

        let diffs = dc_differences(table);
        // Roughly one byte per block for smooth content
        let mut writer = BitWriter::with_capacity(table.num_rows());

        for block in 0..table.rows_per_channel() {
            for channel in Channel::ALL {
                let row = table.row_index(block, channel);
                let (dc_table, ac_table) = self.tables.for_component(channel.is_luma());
                encode_dc(&mut writer, diffs[row], dc_table, row)?;
                encode_ac(&mut writer, &tokens[row], ac_table, row)?;
            }
        }

        let scan = writer.finish();
        log::debug!(
            "entropy: {} bits ({} bytes) for {} blocks",
            scan.bit_len,
            scan.bytes.len(),
            table.num_rows()
        );
        Ok(scan)
    }
}

/// Encode one DC difference.
fn encode_dc(writer: &mut BitWriter, diff: i32, dc_table: &DerivedTable, row: usize) -> Result<()> {
    let nbits = category(diff);
    if nbits > MAX_DC_CATEGORY {
        return Err(Error::CategoryOutOfRange {
            stage: Stage::DcDifference,
            block: row,
            category: nbits,
            max: MAX_DC_CATEGORY,
        });
    }

    let (code, size) = dc_table.get_code(nbits);
    writer.put_bits(code, size);
    writer.put_bits(magnitude_bits(diff, nbits), nbits);
    Ok(())
}

/// Encode one block's AC tokens.
fn encode_ac(
    writer: &mut BitWriter,
    tokens: &[RleToken],
    ac_table: &DerivedTable,
    row: usize,
) -> Result<()> {
    for token in tokens {
        if token.is_eob() {
            let (code, size) = ac_table.get_code(EOB);
            writer.put_bits(code, size);
            continue;
        }
        if token.is_zrl() {
            let (code, size) = ac_table.get_code(ZRL);
            writer.put_bits(code, size);
            continue;
        }

        let nbits = category(token.value);
        if nbits > MAX_AC_CATEGORY {
            return Err(Error::CategoryOutOfRange {
                stage: Stage::AcCoefficient,
                block: row,
                category: nbits,
                max: MAX_AC_CATEGORY,
            });
        }
        if nbits == 0 || token.run > 15 {
            return Err(Error::InvalidRleStream {
                reason: "token is neither EOB, ZRL nor a nonzero value",
            });
        }

        // Symbol = (run << 4) | nbits
        let symbol = (token.run << 4) | nbits;
        let (code, size) = ac_table.get_code(symbol);
        writer.put_bits(code, size);
        writer.put_bits(magnitude_bits(token.value, nbits), nbits);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Backend;
    use crate::rle::encode_table;

    fn tables() -> StandardTables {
        StandardTables::new().unwrap()
    }

    #[test]
    fn test_category() {
        assert_eq!(category(0), 0);
        assert_eq!(category(1), 1);
        assert_eq!(category(-1), 1);
        assert_eq!(category(2), 2);
        assert_eq!(category(-3), 2);
        assert_eq!(category(4), 3);
        assert_eq!(category(255), 8);
        assert_eq!(category(-1024), 11);
        assert_eq!(category(2047), 11);
        assert_eq!(category(2048), 12);
    }

    #[test]
    fn test_magnitude_bits_fold() {
        assert_eq!(magnitude_bits(5, 3), 0b101);
        assert_eq!(magnitude_bits(-5, 3), 0b010);
        assert_eq!(magnitude_bits(-1, 1), 0);
        assert_eq!(magnitude_bits(1, 1), 1);
        assert_eq!(magnitude_bits(0, 0), 0);

        // Same magnitude, opposite signs: complements within the category
        for c in 1..=11u8 {
            let mask = (1u32 << c) - 1;
            for v in (1i32 << (c - 1))..(1i32 << c) {
                assert_eq!(magnitude_bits(v, c) ^ magnitude_bits(-v, c), mask);
            }
        }
    }

    #[test]
    fn test_dc_differences_per_channel() {
        let mut table = BlockTable::zeroed(2, 1).unwrap();
        // Y: 10, 15; Cb: -3, -3; Cr: 0, 7
        for (row, dc) in [10, 15, -3, -3, 0, 7].into_iter().enumerate() {
            table.row_mut(row)[0] = dc;
        }
        assert_eq!(dc_differences(&table), vec![10, 5, -3, 0, 0, 7]);
    }

    #[test]
    fn test_all_zero_blocks() {
        let tables = tables();
        let table = BlockTable::zeroed(1, 1).unwrap();
        let tokens = encode_table(&table, Backend::Sequential);
        let scan = HuffmanEncoder::new(&tables).encode(&table, &tokens).unwrap();
        // Y: "00" + "1010", Cb: "00" + "00", Cr: "00" + "00"
        assert_eq!(scan.to_bit_string(), ["001010", "0000", "0000"].concat());
    }

    #[test]
    fn test_dc_and_ac_codes() {
        let tables = tables();
        let mut table = BlockTable::zeroed(1, 1).unwrap();
        table.row_mut(0)[0] = -3; // DC luma cat 2: "011", bits "00"
        table.row_mut(0)[1] = 1; // AC luma 0x01: "00", bit "1"
        let tokens = encode_table(&table, Backend::Sequential);
        let scan = HuffmanEncoder::new(&tables).encode(&table, &tokens).unwrap();
        assert_eq!(
            scan.to_bit_string(),
            ["01100", "001", "1010", "0000", "0000"].concat()
        );
    }

    #[test]
    fn test_interleaved_order() {
        let tables = tables();
        let mut table = BlockTable::zeroed(2, 1).unwrap();
        // Cb of block 0 carries DC 1; Cb of block 1 returns to 0
        table.row_mut(table.row_index(0, Channel::Cb))[0] = 1;
        let tokens = encode_table(&table, Backend::Sequential);
        let scan = HuffmanEncoder::new(&tables).encode(&table, &tokens).unwrap();
        let y = "001010";
        let expected = [
            y, "01", "1", "00", "0000", // block 0: Y, Cb diff +1, Cr
            y, "01", "0", "00", "0000", // block 1: Y, Cb diff -1, Cr
        ]
        .concat();
        assert_eq!(scan.to_bit_string(), expected);
    }

    #[test]
    fn test_zrl_emitted() {
        let tables = tables();
        let mut table = BlockTable::zeroed(1, 1).unwrap();
        table.row_mut(0)[20] = 1; // 19 zeros: ZRL + (3, 1)
        let tokens = encode_table(&table, Backend::Sequential);
        let scan = HuffmanEncoder::new(&tables).encode(&table, &tokens).unwrap();
        let zrl = tables.ac_luma.code_string(0xF0);
        let r3 = tables.ac_luma.code_string(0x31);
        assert_eq!(
            scan.to_bit_string(),
            ["00", &zrl, &r3, "1", "1010", "0000", "0000"].concat()
        );
    }

    #[test]
    fn test_dc_category_overflow_is_error() {
        let tables = tables();
        let mut table = BlockTable::zeroed(1, 1).unwrap();
        table.row_mut(1)[0] = 2048;
        let tokens = encode_table(&table, Backend::Sequential);
        let err = HuffmanEncoder::new(&tables)
            .encode(&table, &tokens)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CategoryOutOfRange {
                stage: Stage::DcDifference,
                block: 1,
                category: 12,
                max: 11
            }
        ));
    }

    #[test]
    fn test_ac_category_overflow_is_error() {
        let tables = tables();
        let mut table = BlockTable::zeroed(1, 1).unwrap();
        table.row_mut(0)[5] = -1024;
        let tokens = encode_table(&table, Backend::Sequential);
        let err = HuffmanEncoder::new(&tables)
            .encode(&table, &tokens)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CategoryOutOfRange {
                stage: Stage::AcCoefficient,
                category: 11,
                ..
            }
        ));
    }

    #[test]
    fn test_token_row_mismatch() {
        let tables = tables();
        let table = BlockTable::zeroed(1, 1).unwrap();
        assert!(HuffmanEncoder::new(&tables).encode(&table, &[]).is_err());
    }
}
