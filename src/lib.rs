#![doc(html_root_url = "https://docs.rs/avcbits/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # avcbits - H.264/AVC Bitstream Assembly
//!
//! `avcbits` is the bitstream-assembly layer of an H.264/AVC encoder: it
//! serializes already-decided syntax values into a standards-exact Annex B
//! byte stream. The crate owns the bit-level protocol work (exact field
//! widths, context-sensitive field presence, start-code emulation
//! prevention and the Exp-Golomb integer codes) while mode decision,
//! transform coding, rate control and reference management live in the
//! surrounding encoder.
//!
//! ## Features
//!
//! - Bit-exact syntax-element serialization: u(n), flags, ue(v), se(v)
//! - SODB -> RBSP -> EBSP conversion with anti-emulation byte stuffing
//! - NAL unit packaging for the full encoder type space (1..=12)
//! - Sequence and Picture Parameter Set construction from a validated
//!   configuration, with profile feature gating
//! - Annex B byte-stream output over any `std::io::Write` sink
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! avcbits = "0.1.0"
//! ```
//!
//! ### Writing Parameter Sets
//!
//! ```rust
//! use avcbits::codec::h264::{AnnexBWriter, SessionContext};
//! use avcbits::config::{EncoderConfig, FrameNumbering};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SessionContext::new(
//!         EncoderConfig::default(),
//!         FrameNumbering { log2_max_frame_num_minus4: 0 },
//!     )?;
//!
//!     let mut out = AnnexBWriter::new(Vec::new());
//!     session.write_parameter_sets(&mut out)?;
//!
//!     let stream = out.finish()?;
//!     assert_eq!(&stream[..4], &[0x00, 0x00, 0x00, 0x01]);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `codec`: the H.264-specific layer
//!   - Syntax-element and parameter-set serialization
//!   - NAL packaging and Annex B output
//!
//! - `config`: the validated configuration record consumed from the
//!   surrounding encoder, with profile/geometry validation
//!
//! - `error`: error types and utilities
//!   - One variant per failure category, with exit-code mapping for the
//!     terminal boundary
//!
//! - `utils`: bit-level plumbing
//!   - Capacity-bounded bit writing
//!   - Exp-Golomb codeword mapping

/// Codec implementations (H.264 bitstream assembly)
pub mod codec;

/// Encoder configuration and validation
pub mod config;

/// Error types and utilities
pub mod error;

/// Bit-level utilities
pub mod utils;

pub use error::{AvcError, Result};
