//! Run-length coding of AC coefficients (T.81 F.1.2.2).
//!
//! Each nonzero AC coefficient of a zig-zag ordered block becomes a
//! `(run, value)` token, where `run` counts the zeros since the previous
//! token. Runs longer than 15 are split with ZRL tokens `(15, 0)`, each
//! standing for sixteen zeros. Trailing zeros collapse into a single EOB
//! token `(0, 0)`; a block whose last coefficient is nonzero needs none.

use crate::blocks::BlockTable;
use crate::consts::DCTSIZE2;
use crate::error::{Error, Result};
use crate::executor::Backend;

/// Number of AC coefficients per block.
pub const AC_COUNT: usize = DCTSIZE2 - 1;

/// Longest zero run a single token can carry.
pub const MAX_RUN: u8 = 15;

/// One run-length token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleToken {
    /// Zeros preceding `value` (0..=15)
    pub run: u8,
    /// Coefficient value; zero only for EOB and ZRL
    pub value: i32,
}

impl RleToken {
    /// End of block: all remaining coefficients are zero.
    pub const EOB: RleToken = RleToken { run: 0, value: 0 };

    /// Zero run length: sixteen zeros.
    pub const ZRL: RleToken = RleToken {
        run: MAX_RUN,
        value: 0,
    };

    /// Create a token.
    pub const fn new(run: u8, value: i32) -> Self {
        Self { run, value }
    }

    /// True for the end-of-block sentinel.
    pub fn is_eob(&self) -> bool {
        *self == Self::EOB
    }

    /// True for a sixteen-zero filler.
    pub fn is_zrl(&self) -> bool {
        *self == Self::ZRL
    }
}

/// Run-length code the AC coefficients (positions 1..=63) of a zig-zag block.
pub fn encode_ac(block: &[i32; DCTSIZE2]) -> Vec<RleToken> {
    let ac = &block[1..];
    let Some(last) = ac.iter().rposition(|&v| v != 0) else {
        return vec![RleToken::EOB];
    };

    let mut tokens = Vec::with_capacity(last + 2);
    let mut run = 0u8;
    for &value in &ac[..=last] {
        if value == 0 {
            run += 1;
            continue;
        }
        while run > MAX_RUN {
            tokens.push(RleToken::ZRL);
            run -= MAX_RUN + 1;
        }
        tokens.push(RleToken::new(run, value));
        run = 0;
    }
    if last + 1 < AC_COUNT {
        tokens.push(RleToken::EOB);
    }
    tokens
}

/// Expand a token stream back into the 63 AC coefficients.
///
/// Fails if the stream overruns the block, ends early without EOB,
/// continues after EOB, or contains a zero value outside EOB/ZRL.
pub fn expand_ac(tokens: &[RleToken]) -> Result<[i32; AC_COUNT]> {
    let mut ac = [0i32; AC_COUNT];
    let mut pos = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        if token.run > MAX_RUN {
            return Err(Error::InvalidRleStream {
                reason: "run longer than 15",
            });
        }
        if token.is_eob() {
            if i + 1 != tokens.len() {
                return Err(Error::InvalidRleStream {
                    reason: "tokens after end of block",
                });
            }
            return Ok(ac);
        }
        if token.value == 0 && !token.is_zrl() {
            return Err(Error::InvalidRleStream {
                reason: "zero value outside EOB/ZRL",
            });
        }
        pos += token.run as usize;
        if pos >= AC_COUNT {
            return Err(Error::InvalidRleStream {
                reason: "run past end of block",
            });
        }
        ac[pos] = token.value;
        pos += 1;
    }

    if pos == AC_COUNT {
        Ok(ac)
    } else {
        Err(Error::InvalidRleStream {
            reason: "missing end of block",
        })
    }
}

/// Run-length code every row of a zig-zag block table.
pub fn encode_table(table: &BlockTable, backend: Backend) -> Vec<Vec<RleToken>> {
    let tokens = backend.map_indexed(table.num_rows(), |row| encode_ac(table.row(row)));
    log::debug!(
        "rle: {} tokens over {} blocks",
        tokens.iter().map(Vec::len).sum::<usize>(),
        tokens.len()
    );
    tokens
}
