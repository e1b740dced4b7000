use bytes::{BufMut, BytesMut};

use crate::error::{AvcError, Result};

/// A bit-level writer for assembling binary data streams.
///
/// Implements H.264-style bit writing operations:
/// - Appending individual bits and fixed-width fields, most significant
///   bit first
/// - Flushing completed bytes into an owned output buffer
/// - Closing a String Of Data Bits into a Raw Byte Sequence Payload
///   (stop bit plus zero padding to the next byte boundary)
///
/// The output buffer capacity is fixed at construction. Exceeding it is a
/// capacity error, not a resizing event: callers size buffers once, at
/// session start, from worst-case geometry.
///
/// Example:
/// ```
/// use avcbits::utils::BitWriter;
///
/// let mut writer = BitWriter::with_capacity(16);
/// writer.put_bits(0b101, 3).unwrap();
/// writer.put_bits(0b10011, 5).unwrap();
///
/// let bytes = writer.finish_rbsp().unwrap();
/// assert_eq!(&bytes[..1], &[0b10110011]);
/// ```
#[derive(Debug)]
pub struct BitWriter {
    buf: BytesMut,
    capacity: usize,
    byte_buf: u8,
    bits_to_go: u8,
}

impl BitWriter {
    /// Creates a writer with a fixed output capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        BitWriter {
            buf: BytesMut::with_capacity(capacity),
            capacity,
            byte_buf: 0,
            bits_to_go: 8,
        }
    }

    /// Appends the `count` least significant bits of `value`, most
    /// significant of those first.
    ///
    /// Returns error if `count > 32` or if a flushed byte would exceed the
    /// writer capacity.
    pub fn put_bits(&mut self, value: u32, count: u32) -> Result<()> {
        if count > 32 {
            return Err(AvcError::Codec("too many bits for one field".into()));
        }
        if count == 0 {
            return Ok(());
        }

        let mut mask = 1u32 << (count - 1);
        for _ in 0..count {
            self.byte_buf <<= 1;
            if value & mask != 0 {
                self.byte_buf |= 1;
            }
            self.bits_to_go -= 1;
            mask >>= 1;

            if self.bits_to_go == 0 {
                self.flush_byte()?;
            }
        }

        Ok(())
    }

    /// Appends a single bit.
    pub fn put_bit(&mut self, bit: bool) -> Result<()> {
        self.put_bits(bit as u32, 1)
    }

    /// Closes the stream with the RBSP trailing bits: a single `1` stop
    /// bit, then zero fill to the byte boundary. Consumes the writer so
    /// the closing rule runs exactly once per payload.
    ///
    /// Returns the finished byte buffer.
    pub fn finish_rbsp(mut self) -> Result<BytesMut> {
        self.byte_buf <<= 1;
        self.byte_buf |= 1;
        self.bits_to_go -= 1;
        self.byte_buf <<= self.bits_to_go;
        self.bits_to_go = 0;
        self.flush_byte()?;
        Ok(self.buf)
    }

    /// Number of bits appended so far, counting the partial byte.
    pub fn bits_written(&self) -> usize {
        self.buf.len() * 8 + (8 - self.bits_to_go) as usize
    }

    /// Number of completed bytes in the output buffer.
    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }

    /// True when no partial byte is pending.
    pub fn is_byte_aligned(&self) -> bool {
        self.bits_to_go == 8
    }

    fn flush_byte(&mut self) -> Result<()> {
        if self.buf.len() >= self.capacity {
            return Err(AvcError::Capacity(format!(
                "bit buffer full at {} bytes",
                self.capacity
            )));
        }
        self.buf.put_u8(self.byte_buf);
        self.byte_buf = 0;
        self.bits_to_go = 8;
        Ok(())
    }
}
