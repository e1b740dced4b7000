use bytes::BytesMut;

use crate::error::{AvcError, Result};
use crate::utils::{se_code, ue_code, BitWriter};

/// One syntax element value together with its coding kind.
///
/// Transient: built, written, discarded within a single `write` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxValue {
    /// Fixed-width unsigned code, u(n).
    U { width: u32, value: u32 },
    /// Single-bit flag, u(1).
    Flag(bool),
    /// Unsigned Exponential Golomb, ue(v).
    Ue(u32),
    /// Signed Exponential Golomb, se(v).
    Se(i32),
}

/// Serializes syntax elements into an owned bit buffer and accounts for
/// the number of bits emitted.
///
/// One writer per RBSP; `finish_rbsp` consumes it, so the trailing-bits
/// rule cannot run twice on the same payload.
#[derive(Debug)]
pub struct SyntaxWriter {
    bits: BitWriter,
}

impl SyntaxWriter {
    /// Creates a writer over a fixed-capacity buffer, sized once from
    /// the worst case for the payload being built.
    pub fn with_capacity(capacity: usize) -> Self {
        SyntaxWriter {
            bits: BitWriter::with_capacity(capacity),
        }
    }

    /// Writes one syntax element, returning the number of bits used.
    pub fn write(&mut self, element: SyntaxValue) -> Result<u32> {
        match element {
            SyntaxValue::U { width, value } => {
                debug_assert!(width == 32 || value < (1u32 << width));
                self.bits.put_bits(value, width)?;
                Ok(width)
            }
            SyntaxValue::Flag(value) => {
                self.bits.put_bit(value)?;
                Ok(1)
            }
            SyntaxValue::Ue(value) => {
                let code = ue_code(value);
                code.append_to(&mut self.bits)?;
                Ok(code.len)
            }
            SyntaxValue::Se(value) => {
                if value == i32::MIN {
                    return Err(AvcError::Codec(
                        "se(v) value outside representable range".into(),
                    ));
                }
                let code = se_code(value);
                code.append_to(&mut self.bits)?;
                Ok(code.len)
            }
        }
    }

    /// Fixed-width unsigned field, u(n).
    pub fn write_u(&mut self, width: u32, value: u32) -> Result<u32> {
        self.write(SyntaxValue::U { width, value })
    }

    /// Single-bit flag, u(1).
    pub fn write_flag(&mut self, value: bool) -> Result<u32> {
        self.write(SyntaxValue::Flag(value))
    }

    /// Unsigned Exponential Golomb, ue(v).
    pub fn write_ue(&mut self, value: u32) -> Result<u32> {
        self.write(SyntaxValue::Ue(value))
    }

    /// Signed Exponential Golomb, se(v).
    pub fn write_se(&mut self, value: i32) -> Result<u32> {
        self.write(SyntaxValue::Se(value))
    }

    /// Bits emitted so far, counting any partial byte.
    pub fn bits_written(&self) -> usize {
        self.bits.bits_written()
    }

    /// Appends the RBSP trailing bits (stop bit plus zero padding) and
    /// returns the closed payload.
    pub fn finish_rbsp(self) -> Result<BytesMut> {
        self.bits.finish_rbsp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::bits::test_utils::BitReader;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bit_accounting() {
        let mut writer = SyntaxWriter::with_capacity(64);
        assert_eq!(writer.write_u(8, 66).unwrap(), 8);
        assert_eq!(writer.write_flag(false).unwrap(), 1);
        assert_eq!(writer.write_ue(0).unwrap(), 1);
        assert_eq!(writer.write_ue(5).unwrap(), 5);
        assert_eq!(writer.write_se(-2).unwrap(), 5);
        assert_eq!(writer.bits_written(), 20);
    }

    #[test]
    fn test_mixed_elements_round_trip() {
        let mut writer = SyntaxWriter::with_capacity(64);
        writer.write_u(8, 0x42).unwrap();
        writer.write_flag(true).unwrap();
        writer.write_ue(17).unwrap();
        writer.write_se(-9).unwrap();
        writer.write_u(2, 3).unwrap();
        let rbsp = writer.finish_rbsp().unwrap();

        let mut reader = BitReader::new(&rbsp);
        assert_eq!(reader.read_bits(8).unwrap(), 0x42);
        assert_eq!(reader.read_bit().unwrap(), true);
        assert_eq!(reader.read_ue().unwrap(), 17);
        assert_eq!(reader.read_se().unwrap(), -9);
        assert_eq!(reader.read_bits(2).unwrap(), 3);
        assert_eq!(reader.read_bit().unwrap(), true); // stop bit
    }

    #[test]
    fn test_se_min_rejected() {
        let mut writer = SyntaxWriter::with_capacity(64);
        assert!(writer.write_se(i32::MIN).is_err());
    }

    #[test]
    fn test_finish_consumes_writer() {
        // finish_rbsp takes self by value; closing twice is a compile
        // error. Check the closed payload ends on a byte boundary.
        let mut writer = SyntaxWriter::with_capacity(16);
        writer.write_ue(3).unwrap();
        let rbsp = writer.finish_rbsp().unwrap();
        assert_eq!(rbsp.len(), 1);
        assert_eq!(rbsp[0], 0b00100100);
    }
}
