use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::types::NalUnit;
use crate::error::Result;

/// Writes NAL units to a byte-oriented sink in Annex B format: an
/// optional leading zero (long start codes), the three-byte start code
/// `0x00 0x00 0x01`, then the NAL buffer verbatim.
pub struct AnnexBWriter<W: Write> {
    sink: BufWriter<W>,
    bits_written: u64,
}

impl AnnexBWriter<File> {
    /// Opens `path` for writing as an Annex B byte stream.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(AnnexBWriter::new(File::create(path)?))
    }
}

impl<W: Write> AnnexBWriter<W> {
    pub fn new(sink: W) -> Self {
        AnnexBWriter {
            sink: BufWriter::new(sink),
            bits_written: 0,
        }
    }

    /// Emits one start-code-prefixed NAL unit. Returns the number of
    /// bits written for this unit.
    pub fn write_nalu(&mut self, nalu: &NalUnit) -> Result<u32> {
        let mut bits = 0u32;

        if nalu.long_start_code {
            self.sink.write_all(&[0x00])?;
            bits += 8;
        }
        self.sink.write_all(&[0x00, 0x00, 0x01])?;
        bits += 24;

        self.sink.write_all(nalu.payload())?;
        bits += nalu.len() as u32 * 8;

        log::debug!(
            "annexb: wrote NAL type {:?}, {} byte startcode, {} bits",
            nalu.unit_type,
            nalu.start_code_prefix_len(),
            bits
        );

        self.bits_written += bits as u64;
        Ok(bits)
    }

    /// Total bits emitted over the writer's lifetime.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Flushes buffered bytes and returns the underlying sink.
    pub fn finish(self) -> Result<W> {
        Ok(self
            .sink
            .into_inner()
            .map_err(|e| e.into_error())?)
    }
}
