//! Huffman table construction for JPEG encoding.
//!
//! This module implements:
//! - The raw (bits + huffval) table format serialized into DHT segments
//! - Building derived Huffman tables for encoding (Figure C.1-C.3 of T.81)
//! - The four Annex K example tables used for every baseline scan
//!
//! The derived table format stores code and length indexed by symbol value,
//! allowing O(1) lookup during encoding. For AC tables the symbol is
//! `(run << 4) | category`, so the `[run][category]` lookup of a 2-D code
//! table becomes a single index.

use crate::consts::{
    AC_CHROMINANCE_BITS, AC_CHROMINANCE_VALUES, AC_LUMINANCE_BITS, AC_LUMINANCE_VALUES,
    DC_CHROMINANCE_BITS, DC_CHROMINANCE_VALUES, DC_LUMINANCE_BITS, DC_LUMINANCE_VALUES,
};
use crate::error::{Error, Result};

/// Maximum code length allowed by JPEG (16 bits)
pub const MAX_CODE_LENGTH: usize = 16;

/// Table class written in the high nibble of the DHT Tc/Th byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableClass {
    /// DC difference categories (symbols 0..=15)
    Dc = 0,
    /// AC run/category pairs (symbols 0..=255)
    Ac = 1,
}

/// A Huffman table in the raw format (bits + values).
///
/// This is the format stored in the JPEG file and used as input
/// to build derived tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffTable {
    /// Number of codes of each length (`bits[0]` is unused, `bits[1-16]` are counts)
    pub bits: [u8; 17],
    /// Symbol values in order of increasing code length
    pub huffval: [u8; 256],
}

impl Default for HuffTable {
    fn default() -> Self {
        Self {
            bits: [0; 17],
            huffval: [0; 256],
        }
    }
}

impl HuffTable {
    /// Build a raw table from a 17-entry bits array and its symbol list.
    pub fn from_bits_values(bits: &[u8; 17], values: &[u8]) -> Result<Self> {
        let count: usize = bits[1..].iter().map(|&b| b as usize).sum();
        if count != values.len() || count > 256 {
            return Err(Error::InvalidHuffmanTable);
        }
        let mut htbl = Self::default();
        htbl.bits.copy_from_slice(bits);
        htbl.huffval[..count].copy_from_slice(values);
        Ok(htbl)
    }

    /// Total number of symbols defined by `bits[1..=16]`.
    pub fn num_symbols(&self) -> usize {
        self.bits[1..].iter().map(|&b| b as usize).sum()
    }

    /// The 16 code-length counts, as written after the Tc/Th byte.
    pub fn counts(&self) -> &[u8] {
        &self.bits[1..]
    }

    /// Symbols in canonical order.
    pub fn symbols(&self) -> &[u8] {
        &self.huffval[..self.num_symbols().min(256)]
    }
}

/// Derived Huffman table optimized for encoding.
///
/// This format allows O(1) lookup of the code for any symbol.
#[derive(Clone, Debug)]
pub struct DerivedTable {
    /// Huffman code for each symbol (indexed by symbol value)
    pub ehufco: [u32; 256],
    /// Code length for each symbol (0 means no code assigned)
    pub ehufsi: [u8; 256],
}

impl Default for DerivedTable {
    fn default() -> Self {
        Self {
            ehufco: [0; 256],
            ehufsi: [0; 256],
        }
    }
}

impl DerivedTable {
    /// Create a new empty derived table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a derived table from a raw Huffman table.
    ///
    /// This implements Figures C.1-C.3 of ITU-T T.81.
    ///
    /// # Arguments
    /// * `htbl` - The raw Huffman table (bits + huffval)
    /// * `class` - DC tables accept symbols 0..=15, AC tables 0..=255
    ///
    /// # Returns
    /// The derived table ready for encoding, or an error if the table is invalid.
    pub fn from_huff_table(htbl: &HuffTable, class: TableClass) -> Result<Self> {
        let mut dtbl = Self::new();

        // Figure C.1: make table of Huffman code length for each symbol
        let mut huffsize = [0u8; 257];
        let mut p = 0usize;

        for l in 1..=MAX_CODE_LENGTH {
            let count = htbl.bits[l] as usize;
            if p + count > 256 {
                return Err(Error::InvalidHuffmanTable);
            }
            for _ in 0..count {
                huffsize[p] = l as u8;
                p += 1;
            }
        }
        let lastp = p;

        // Figure C.2: generate the codes themselves
        let mut huffcode = [0u32; 257];
        let mut code = 0u32;
        let mut si = huffsize[0] as usize;
        p = 0;

        while p < lastp && huffsize[p] != 0 {
            while p < lastp && huffsize[p] as usize == si {
                huffcode[p] = code;
                code += 1;
                p += 1;
            }
            if code >= (1 << si) {
                return Err(Error::InvalidHuffmanTable);
            }
            code <<= 1;
            si += 1;
        }

        // Figure C.3: encoding tables indexed by symbol.
        // Codeless symbols keep length 0 so emitting one is detectable.
        let max_symbol = match class {
            TableClass::Dc => 15,
            TableClass::Ac => 255,
        };

        for i in 0..lastp {
            let symbol = htbl.huffval[i] as usize;
            if symbol > max_symbol || dtbl.ehufsi[symbol] != 0 {
                return Err(Error::InvalidHuffmanTable);
            }
            dtbl.ehufco[symbol] = huffcode[i];
            dtbl.ehufsi[symbol] = huffsize[i];
        }

        Ok(dtbl)
    }

    /// Get the code and length for a symbol.
    ///
    /// # Returns
    /// (code, length) tuple, or (0, 0) if symbol has no code.
    #[inline]
    pub fn get_code(&self, symbol: u8) -> (u32, u8) {
        let idx = symbol as usize;
        (self.ehufco[idx], self.ehufsi[idx])
    }

    /// Render the code for `symbol` as a `'0'/'1'` string.
    pub fn code_string(&self, symbol: u8) -> String {
        let (code, size) = self.get_code(symbol);
        (0..size)
            .rev()
            .map(|i| if (code >> i) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

/// Annex K.3.1 DC luminance table.
pub fn std_dc_luma() -> HuffTable {
    standard(&DC_LUMINANCE_BITS, &DC_LUMINANCE_VALUES)
}

/// Annex K.3.2 AC luminance table.
pub fn std_ac_luma() -> HuffTable {
    standard(&AC_LUMINANCE_BITS, &AC_LUMINANCE_VALUES)
}

/// Annex K.3.1 DC chrominance table.
pub fn std_dc_chroma() -> HuffTable {
    standard(&DC_CHROMINANCE_BITS, &DC_CHROMINANCE_VALUES)
}

/// Annex K.3.2 AC chrominance table.
pub fn std_ac_chroma() -> HuffTable {
    standard(&AC_CHROMINANCE_BITS, &AC_CHROMINANCE_VALUES)
}

fn standard(bits: &[u8; 17], values: &[u8]) -> HuffTable {
    let mut htbl = HuffTable::default();
    htbl.bits.copy_from_slice(bits);
    htbl.huffval[..values.len()].copy_from_slice(values);
    htbl
}

/// The four tables of a baseline YCbCr scan, raw and derived.
#[derive(Clone, Debug)]
pub struct StandardTables {
    /// Raw tables in DHT order: DC-luma, AC-luma, DC-chroma, AC-chroma.
    pub raw: [(TableClass, u8, HuffTable); 4],
    /// DC luminance (table id 0)
    pub dc_luma: DerivedTable,
    /// AC luminance (table id 0)
    pub ac_luma: DerivedTable,
    /// DC chrominance (table id 1)
    pub dc_chroma: DerivedTable,
    /// AC chrominance (table id 1)
    pub ac_chroma: DerivedTable,
}

impl StandardTables {
    /// Derive the Annex K example tables.
    pub fn new() -> Result<Self> {
        let dc_luma = std_dc_luma();
        let ac_luma = std_ac_luma();
        let dc_chroma = std_dc_chroma();
        let ac_chroma = std_ac_chroma();
        Ok(Self {
            dc_luma: DerivedTable::from_huff_table(&dc_luma, TableClass::Dc)?,
            ac_luma: DerivedTable::from_huff_table(&ac_luma, TableClass::Ac)?,
            dc_chroma: DerivedTable::from_huff_table(&dc_chroma, TableClass::Dc)?,
            ac_chroma: DerivedTable::from_huff_table(&ac_chroma, TableClass::Ac)?,
            raw: [
                (TableClass::Dc, 0, dc_luma),
                (TableClass::Ac, 0, ac_luma),
                (TableClass::Dc, 1, dc_chroma),
                (TableClass::Ac, 1, ac_chroma),
            ],
        })
    }

    /// DC and AC tables for a component (`true` selects luminance).
    pub fn for_component(&self, luma: bool) -> (&DerivedTable, &DerivedTable) {
        if luma {
            (&self.dc_luma, &self.ac_luma)
        } else {
            (&self.dc_chroma, &self.ac_chroma)
        }
    }
}
