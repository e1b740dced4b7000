//! Exponential Golomb code mapping for ue(v) and se(v) syntax elements.
//!
//! A codeword is `M` leading zeros, a `1` marker, then `M` INFO bits:
//! `0 0 ... 1 X(M-1) ... X1 X0`, with value `2^M + INFO - 1` on the
//! unsigned decode side. The mapping here is derived from that
//! definition rather than from any table; round-trip tests pin it to the
//! standard bit patterns.

use crate::error::Result;
use crate::utils::BitWriter;

/// A mapped codeword: total length in bits (always odd, `2M + 1`) and
/// the INFO suffix value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeWord {
    pub len: u32,
    pub info: u32,
}

impl CodeWord {
    /// Number of leading zeros / INFO bits (`M`).
    pub fn prefix_len(&self) -> u32 {
        self.len / 2
    }

    /// Emits the codeword: `M` zeros, the `1` marker, the `M` INFO bits.
    pub fn append_to(&self, writer: &mut BitWriter) -> Result<()> {
        let m = self.prefix_len();
        writer.put_bits(0, m)?;
        writer.put_bit(true)?;
        writer.put_bits(self.info, m)
    }
}

/// Maps an unsigned value to its ue(v) codeword.
///
/// `M = floor(log2(value + 1))`, length `2M + 1`,
/// `INFO = value + 1 - 2^M`.
pub fn ue_code(value: u32) -> CodeWord {
    let x = value as u64 + 1;
    let m = 63 - x.leading_zeros();
    CodeWord {
        len: 2 * m + 1,
        info: (x - (1u64 << m)) as u32,
    }
}

/// Maps a signed value to its se(v) codeword by folding it onto the
/// unsigned code-number space: 0 -> 0, then positive and negative values
/// alternate with increasing magnitude (1, -1, 2, -2, ...).
///
/// The value `i32::MIN` is outside the representable range.
pub fn se_code(value: i32) -> CodeWord {
    debug_assert!(value != i32::MIN);
    let code_num = if value > 0 {
        2 * value as u32 - 1
    } else {
        2 * value.unsigned_abs()
    };
    ue_code(code_num)
}
