//! # H.264/AVC Bitstream Assembly
//!
//! This module turns decided syntax values into standards-exact H.264
//! byte streams. It covers:
//!
//! - Syntax-element serialization (u(n), flags, ue(v)/se(v) Exp-Golomb)
//! - RBSP finalization and start-code emulation prevention
//! - NAL unit packaging with header assembly and range enforcement
//! - Sequence and Picture Parameter Set construction and emission
//! - Annex B byte-stream output
//!
//! ## Example: Emitting Parameter Sets
//!
//! ```rust
//! use avcbits::codec::h264::{AnnexBWriter, SessionContext};
//! use avcbits::config::{EncoderConfig, FrameNumbering};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SessionContext::new(
//!     EncoderConfig::default(),
//!     FrameNumbering { log2_max_frame_num_minus4: 0 },
//! )?;
//!
//! let mut out = AnnexBWriter::new(Vec::new());
//! let bits = session.write_parameter_sets(&mut out)?;
//! assert!(bits > 0);
//! # Ok(())
//! # }
//! ```

/// Annex B byte-stream output
pub mod annexb;
/// NAL unit packaging and emulation prevention
pub mod nalu;
/// Parameter set construction and serialization
pub mod paramset;
/// Syntax-element serialization
pub mod syntax;
/// Value structures: NAL units, SPS/PPS, slice-group maps
pub mod types;

// Re-export commonly used types from submodules for easier access
#[doc(inline)]
pub use annexb::AnnexBWriter;
#[doc(inline)]
pub use nalu::{rbsp_to_ebsp, EbspPayload};
#[doc(inline)]
pub use paramset::{
    build_parameter_sets, generate_pps_nalu, generate_sps_nalu, SessionContext,
};
#[doc(inline)]
pub use syntax::{SyntaxValue, SyntaxWriter};
#[doc(inline)]
pub use types::{
    CropRect, EntropyCoding, NalRefIdc, NalUnit, NalUnitType, PicOrderCnt, Pps, Profile,
    SliceGroupChange, SliceGroupMap, SliceGroupRect, SliceGroups, Sps,
};
