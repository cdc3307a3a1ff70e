//! Bit packing for the entropy-coded scan.
//!
//! This module provides:
//! - MSB-first bit accumulation in a 64-bit buffer
//! - 1-bit padding of the final partial byte
//! - 0xFF byte stuffing (0xFF -> 0xFF 0x00), applied when the packed
//!   scan is copied into the file
//!
//! The packer itself never stuffs, so the packed bytes and their bit
//! count are exactly the Huffman output and can be inspected as such.

use crate::types::ScanData;

/// Size of the bit buffer in bits
const BIT_BUF_SIZE: u32 = 64;

/// MSB-first bit packer writing to a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// Completed bytes
    output: Vec<u8>,
    /// Bit accumulation buffer
    put_buffer: u64,
    /// Number of free bits remaining in the buffer
    free_bits: i32,
    /// Total bits written
    bit_len: usize,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a writer with room for `capacity` output bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
            put_buffer: 0,
            free_bits: BIT_BUF_SIZE as i32,
            bit_len: 0,
        }
    }

    /// Write bits to the stream.
    ///
    /// # Arguments
    /// * `code` - The bits to write (right-aligned)
    /// * `size` - Number of bits to write (0-16)
    #[inline]
    pub fn put_bits(&mut self, code: u32, size: u8) {
        debug_assert!(size <= 16, "Size must be <= 16 bits");
        debug_assert!(code < (1u32 << size), "Code exceeds size bits");
        if size == 0 {
            return;
        }

        self.bit_len += size as usize;
        let size = size as i32;
        self.free_bits -= size;

        if self.free_bits < 0 {
            // -free_bits = number of bits that overflow into next buffer
            let overflow_bits = (-self.free_bits) as u32;

            // Put upper bits into current buffer before flush
            self.put_buffer = (self.put_buffer << (size + self.free_bits))
                | ((code as u64) >> overflow_bits);
            self.output.extend_from_slice(&self.put_buffer.to_be_bytes());

            // Reset buffer with only the overflow (lower) bits
            self.free_bits += BIT_BUF_SIZE as i32;
            self.put_buffer = (code as u64) & ((1u64 << overflow_bits) - 1);
        } else if self.free_bits == 0 {
            self.put_buffer = (self.put_buffer << size) | (code as u64);
            self.output.extend_from_slice(&self.put_buffer.to_be_bytes());
            self.put_buffer = 0;
            self.free_bits = BIT_BUF_SIZE as i32;
        } else {
            self.put_buffer = (self.put_buffer << size) | (code as u64);
        }
    }

    /// Write a string of `'0'`/`'1'` characters; anything else is skipped.
    pub fn put_bit_string(&mut self, bits: &str) {
        for c in bits.chars() {
            match c {
                '0' => self.put_bits(0, 1),
                '1' => self.put_bits(1, 1),
                _ => {}
            }
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Flush remaining bits, padding with 1s to a byte boundary.
    ///
    /// The 1-bits keep the pad from forming a false marker prefix.
    fn flush(&mut self) {
        let bits_in_buffer = (BIT_BUF_SIZE as i32) - self.free_bits;
        if bits_in_buffer == 0 {
            return;
        }

        let padding_bits = (8 - (bits_in_buffer % 8)) % 8;
        let total_bits = bits_in_buffer + padding_bits;
        let bytes_to_write = (total_bits / 8) as usize;

        // Shift the buffer so bits are at the top, then add padding
        let mut buffer = self.put_buffer << ((BIT_BUF_SIZE as i32) - bits_in_buffer);
        if padding_bits > 0 {
            let padding_shift = (BIT_BUF_SIZE as i32) - total_bits;
            buffer |= ((1u64 << padding_bits) - 1) << padding_shift;
        }
        self.output
            .extend_from_slice(&buffer.to_be_bytes()[..bytes_to_write]);

        self.put_buffer = 0;
        self.free_bits = BIT_BUF_SIZE as i32;
    }

    /// Pad the tail and return the packed scan.
    pub fn finish(mut self) -> ScanData {
        self.flush();
        ScanData {
            bytes: self.output,
            bit_len: self.bit_len,
        }
    }
}

/// Copy `bytes` into `out`, inserting 0x00 after every 0xFF.
pub fn stuff_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    let extra = bytes.iter().filter(|&&b| b == 0xFF).count();
    out.reserve(bytes.len() + extra);
    for &byte in bytes {
        out.push(byte);
        if byte == 0xFF {
            out.push(0x00);
        }
    }
}
