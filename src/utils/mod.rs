//! # Utility Functions and Types
//!
//! This module provides the bit-level plumbing used throughout the
//! avcbits library:
//!
//! - Bit-oriented output buffering with capacity enforcement
//! - Exponential Golomb codeword mapping for ue(v)/se(v) syntax elements
//!
//! ## Bit Writing
//!
//! ```rust
//! use avcbits::utils::BitWriter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = BitWriter::with_capacity(64);
//! writer.put_bits(0b101, 3)?; // appends bits 1 0 1
//! let rbsp = writer.finish_rbsp()?; // stop bit + zero padding
//! assert_eq!(&rbsp[..], &[0b10110000]);
//! # Ok(())
//! # }
//! ```

/// Bit accumulation and byte-buffer output
pub mod bits;

/// Exponential Golomb codeword mapping
pub mod golomb;

// Re-export commonly used types
pub use bits::BitWriter;
pub use golomb::{se_code, ue_code, CodeWord};
