use bytes::{BufMut, Bytes, BytesMut};

use super::types::{NalRefIdc, NalUnit, NalUnitType, MAX_RBSP_SIZE};
use crate::error::{AvcError, Result};

/// How many consecutive zero bytes arm the escape check.
const ZERO_BYTES_SHORT_START_CODE: u32 = 2;

/// Result of anti-emulation encapsulation.
#[derive(Debug)]
pub struct EbspPayload {
    pub data: BytesMut,
    /// Bits injected by minimum-size stuffing (16 per stuffing word),
    /// zero outside CABAC payloads.
    pub stuffing_bits: u32,
}

/// Rewrites an RBSP into an EBSP, escaping byte patterns that would be
/// mistaken for a start code.
///
/// Whenever two consecutive zero bytes are followed by a byte whose top
/// six bits are zero (`0x00..=0x03`), a literal `0x03` escape is inserted
/// before it. The output therefore never contains `0x00 0x00 0x0{0..3}`
/// unescaped. If the result is shorter than `min_num_bytes` the payload
/// is padded with `0x00 0x00 0x03` stuffing words until the minimum is
/// met (a CABAC requirement; zero for Exp-Golomb payloads).
///
/// The input is never rewritten in place: escaping grows the data, so the
/// scan runs over the source slice while appending to a fresh buffer.
pub fn rbsp_to_ebsp(rbsp: &[u8], min_num_bytes: usize) -> EbspPayload {
    let mut out = BytesMut::with_capacity(rbsp.len() + rbsp.len() / 2 + 3);
    let mut count = 0u32;

    for &byte in rbsp {
        if count == ZERO_BYTES_SHORT_START_CODE && byte & 0xFC == 0 {
            out.put_u8(0x03);
            count = 0;
        }
        out.put_u8(byte);
        if byte == 0x00 {
            count += 1;
        } else {
            count = 0;
        }
    }

    let mut stuffing_bits = 0u32;
    while out.len() < min_num_bytes {
        out.put_u8(0x00);
        out.put_u8(0x00);
        out.put_u8(0x03);
        stuffing_bits += 16;
    }

    EbspPayload {
        data: out,
        stuffing_bits,
    }
}

impl NalUnit {
    /// Packages an RBSP into a NAL unit: builds the one-byte header,
    /// applies emulation prevention over the payload region and records
    /// the total length.
    ///
    /// `min_num_bytes` is the CABAC minimum-payload requirement, zero for
    /// all Exp-Golomb payloads. `long_start_code` must be set for
    /// parameter sets and the first slice of a picture.
    pub fn from_rbsp(
        rbsp: &[u8],
        unit_type: NalUnitType,
        ref_idc: NalRefIdc,
        min_num_bytes: usize,
        long_start_code: bool,
    ) -> Result<Self> {
        if rbsp.len() >= MAX_RBSP_SIZE {
            return Err(AvcError::Capacity(format!(
                "rbsp of {} bytes exceeds the {} byte NAL payload bound",
                rbsp.len(),
                MAX_RBSP_SIZE
            )));
        }

        let ebsp = rbsp_to_ebsp(rbsp, min_num_bytes);

        let forbidden_bit = 0u8;
        let header = forbidden_bit << 7 | (ref_idc as u8) << 5 | unit_type as u8;

        let mut payload = BytesMut::with_capacity(1 + ebsp.data.len());
        payload.put_u8(header);
        payload.extend_from_slice(&ebsp.data);

        log::debug!(
            "packaged NAL type {:?} ref_idc {:?}: {} rbsp bytes -> {} total",
            unit_type,
            ref_idc,
            rbsp.len(),
            payload.len()
        );

        Ok(NalUnit {
            ref_idc,
            unit_type,
            long_start_code,
            stuffing_bits: ebsp.stuffing_bits,
            payload: Bytes::from(payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    /// Inverse of `rbsp_to_ebsp` for round-trip checking: drops every
    /// 0x03 that follows two zeros and precedes a byte in 0x00..=0x03.
    fn strip_emulation_prevention(ebsp: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(ebsp.len());
        let mut i = 0;
        while i < ebsp.len() {
            if i + 2 < ebsp.len()
                && ebsp[i] == 0x00
                && ebsp[i + 1] == 0x00
                && ebsp[i + 2] == 0x03
            {
                out.push(0x00);
                out.push(0x00);
                i += 3;
                continue;
            }
            out.push(ebsp[i]);
            i += 1;
        }
        out
    }

    /// A start code or illegal sequence is two zeros followed by a byte
    /// in 0x00..=0x02. The escape itself (0x00 0x00 0x03) is legal and
    /// is removed by `strip_emulation_prevention`.
    fn has_unescaped_start_code(data: &[u8]) -> bool {
        data.windows(3)
            .any(|w| w[0] == 0x00 && w[1] == 0x00 && w[2] <= 0x02)
    }

    #[test]
    fn test_escape_inserted_before_low_bytes() {
        for trailer in 0x00..=0x03u8 {
            let ebsp = rbsp_to_ebsp(&[0x00, 0x00, trailer], 0);
            assert_eq!(&ebsp.data[..], &[0x00, 0x00, 0x03, trailer]);
        }
    }

    #[test]
    fn test_no_escape_for_high_bytes() {
        // 0x04 and above have a nonzero top-six-bit field.
        let ebsp = rbsp_to_ebsp(&[0x00, 0x00, 0x04], 0);
        assert_eq!(&ebsp.data[..], &[0x00, 0x00, 0x04]);

        let ebsp = rbsp_to_ebsp(&[0x01, 0x02, 0x03], 0);
        assert_eq!(&ebsp.data[..], &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_counter_resets_after_escape() {
        // Four zeros then 0x01: escape after the first pair, and the
        // remaining two zeros arm a second escape.
        let ebsp = rbsp_to_ebsp(&[0x00, 0x00, 0x00, 0x00, 0x01], 0);
        assert_eq!(&ebsp.data[..], &[0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x01]);
    }

    #[test]
    fn test_min_bytes_stuffing() {
        let ebsp = rbsp_to_ebsp(&[0xAA], 7);
        assert_eq!(&ebsp.data[..], &[0xAA, 0x00, 0x00, 0x03, 0x00, 0x00, 0x03]);
        assert_eq!(ebsp.stuffing_bits, 32);

        let ebsp = rbsp_to_ebsp(&[0xAA, 0xBB], 0);
        assert_eq!(ebsp.stuffing_bits, 0);
    }

    #[quickcheck]
    fn prop_no_start_code_emulation(rbsp: Vec<u8>) -> bool {
        let ebsp = rbsp_to_ebsp(&rbsp, 0);
        !has_unescaped_start_code(&ebsp.data)
    }

    #[quickcheck]
    fn prop_strip_reconstructs_rbsp(rbsp: Vec<u8>) -> bool {
        let ebsp = rbsp_to_ebsp(&rbsp, 0);
        strip_emulation_prevention(&ebsp.data) == rbsp
    }

    #[test]
    fn test_zero_run_boundary_cases() {
        // A zero pair at the very end needs no escape.
        let ebsp = rbsp_to_ebsp(&[0x01, 0x00, 0x00], 0);
        assert_eq!(&ebsp.data[..], &[0x01, 0x00, 0x00]);

        // Zero pair split across an escaped region.
        let input = [0x00, 0x00, 0x01, 0x00, 0x00, 0x02];
        let ebsp = rbsp_to_ebsp(&input, 0);
        assert_eq!(
            &ebsp.data[..],
            &[0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x03, 0x02]
        );
        assert_eq!(strip_emulation_prevention(&ebsp.data), input);
    }

    #[test]
    fn test_nal_header_byte() {
        let nalu = NalUnit::from_rbsp(
            &[0x42, 0x00],
            NalUnitType::Sps,
            NalRefIdc::High,
            0,
            true,
        )
        .unwrap();
        assert_eq!(nalu.header_byte(), 0x47);
        assert_eq!(nalu.len(), 3);
    }

    #[test]
    fn test_start_code_prefix_len() {
        let long = NalUnit::from_rbsp(&[0x01], NalUnitType::Sps, NalRefIdc::Highest, 0, true)
            .unwrap();
        assert_eq!(long.start_code_prefix_len(), 4);

        let short =
            NalUnit::from_rbsp(&[0x01], NalUnitType::Slice, NalRefIdc::Low, 0, false).unwrap();
        assert_eq!(short.start_code_prefix_len(), 3);
    }

    #[test]
    fn test_oversized_rbsp_rejected() {
        let rbsp = vec![0xAB; MAX_RBSP_SIZE];
        let err = NalUnit::from_rbsp(&rbsp, NalUnitType::Slice, NalRefIdc::Low, 0, false)
            .unwrap_err();
        assert!(matches!(err, AvcError::Capacity(_)));
    }
}
