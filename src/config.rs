use crate::codec::h264::types::{
    CropRect, EntropyCoding, PicOrderCnt, Profile, SliceGroupMap, SliceGroups,
};
use crate::error::{AvcError, Result};

/// Macroblock edge length in luma samples.
pub const MB_BLOCK_SIZE: u32 = 16;

/// Upper bound on the decoded-picture reference buffer.
pub const MAX_REFERENCE_FRAMES: u32 = 16;

/// Maximum entries in a picture-order-count type 1 offset cycle.
pub const MAX_POC_CYCLE_LEN: usize = 256;

/// Picture- or macroblock-level interlace handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterlaceMode {
    Frame,
    Field,
    Adaptive,
}

/// Frame-numbering bit widths computed by the picture-order-count setup
/// that runs before parameter-set generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameNumbering {
    pub log2_max_frame_num_minus4: u32,
}

/// Validated encoder configuration, the record this crate consumes from
/// the surrounding encoder.
///
/// The textual configuration-file loader lives outside this crate; by the
/// time a value of this type reaches parameter-set generation it has been
/// populated from parsed input, and `validate` has the final word on
/// profile and geometry consistency.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub profile: Profile,
    pub level_idc: u8,
    /// Luma picture width in samples, a multiple of 16.
    pub width: u32,
    /// Luma picture height in samples, a multiple of 16 (32 when any
    /// interlace mode is active).
    pub height: u32,
    pub pic_interlace: InterlaceMode,
    pub mb_interlace: InterlaceMode,
    /// Number of successive B pictures between anchor frames.
    pub num_b_frames: u32,
    /// SP-picture insertion period, zero to disable.
    pub sp_periodicity: u32,
    pub data_partitioning: bool,
    pub redundant_slices: bool,
    pub entropy_coding: EntropyCoding,
    pub weighted_prediction: bool,
    /// 0 = off, 1 = explicit, 2 = implicit bi-prediction weighting.
    pub weighted_biprediction: u8,
    pub num_reference_frames: u32,
    pub pic_order_cnt: PicOrderCnt,
    pub pic_order_present: bool,
    pub direct_8x8_inference: bool,
    pub slice_groups: Option<SliceGroups>,
    pub chroma_qp_index_offset: i32,
    pub pic_init_qp_minus26: i32,
    pub pic_init_qs_minus26: i32,
    pub deblocking_filter_control: bool,
    pub constrained_intra_pred: bool,
    pub frame_cropping: Option<CropRect>,
    pub vui_parameters_present: bool,
}

impl Default for EncoderConfig {
    /// QCIF baseline defaults: progressive frame coding, CAVLC, a single
    /// reference frame, no FMO.
    fn default() -> Self {
        EncoderConfig {
            profile: Profile::Baseline,
            level_idc: 30,
            width: 176,
            height: 144,
            pic_interlace: InterlaceMode::Frame,
            mb_interlace: InterlaceMode::Frame,
            num_b_frames: 0,
            sp_periodicity: 0,
            data_partitioning: false,
            redundant_slices: false,
            entropy_coding: EntropyCoding::Cavlc,
            weighted_prediction: false,
            weighted_biprediction: 0,
            num_reference_frames: 1,
            pic_order_cnt: PicOrderCnt::Counter {
                log2_max_pic_order_cnt_lsb_minus4: 0,
            },
            pic_order_present: false,
            direct_8x8_inference: true,
            slice_groups: None,
            chroma_qp_index_offset: 0,
            pic_init_qp_minus26: 0,
            pic_init_qs_minus26: 0,
            deblocking_filter_control: false,
            constrained_intra_pred: false,
            frame_cropping: None,
            vui_parameters_present: false,
        }
    }
}

impl EncoderConfig {
    /// True when every macroblock is frame-coded and no field pictures
    /// occur, i.e. `frame_mbs_only_flag` in the SPS.
    pub fn frame_mbs_only(&self) -> bool {
        self.pic_interlace == InterlaceMode::Frame && self.mb_interlace == InterlaceMode::Frame
    }

    pub fn interlace_active(&self) -> bool {
        !self.frame_mbs_only()
    }

    /// Picture width in macroblocks.
    pub fn width_in_mbs(&self) -> u32 {
        self.width / MB_BLOCK_SIZE
    }

    /// Picture height in map units (macroblocks, or macroblock pairs
    /// when field coding is possible).
    pub fn height_in_map_units(&self) -> u32 {
        (self.height / MB_BLOCK_SIZE) / if self.frame_mbs_only() { 1 } else { 2 }
    }

    /// Checks profile feature constraints and geometry before any
    /// bitstream is produced. Violations are configuration errors, never
    /// silently corrected.
    pub fn validate(&self) -> Result<()> {
        self.check_geometry()?;
        self.check_profile()?;
        self.check_poc()?;
        self.check_slice_groups()?;

        if self.num_reference_frames == 0 || self.num_reference_frames > MAX_REFERENCE_FRAMES {
            return Err(AvcError::Config(format!(
                "number of reference frames must be in 1..={}, got {}",
                MAX_REFERENCE_FRAMES, self.num_reference_frames
            )));
        }
        if self.weighted_biprediction > 2 {
            return Err(AvcError::Config(
                "weighted bi-prediction mode must be 0, 1 or 2".into(),
            ));
        }
        if self.vui_parameters_present {
            return Err(AvcError::Unsupported(
                "VUI sequence parameters are not implemented".into(),
            ));
        }

        log::debug!(
            "configuration valid: profile {:?} level {} {}x{}",
            self.profile,
            self.level_idc,
            self.width,
            self.height
        );
        Ok(())
    }

    fn check_geometry(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AvcError::Config("picture dimensions must be nonzero".into()));
        }
        if self.width % MB_BLOCK_SIZE != 0 || self.height % MB_BLOCK_SIZE != 0 {
            return Err(AvcError::Config(format!(
                "unsupported image format {}x{}, dimensions must be a multiple of 16",
                self.width, self.height
            )));
        }
        if self.interlace_active() && self.height % 32 != 0 {
            return Err(AvcError::Config(format!(
                "unsupported image height {}, must be a multiple of 32 for field or adaptive frame/field coding",
                self.height
            )));
        }
        Ok(())
    }

    fn check_profile(&self) -> Result<()> {
        match self.profile {
            Profile::Baseline => {
                if self.num_b_frames > 0 {
                    return Err(AvcError::Config(
                        "B pictures are not allowed in baseline".into(),
                    ));
                }
                if self.sp_periodicity > 0 {
                    return Err(AvcError::Config(
                        "SP pictures are not allowed in baseline".into(),
                    ));
                }
                if self.data_partitioning {
                    return Err(AvcError::Config(
                        "data partitioning is not allowed in baseline".into(),
                    ));
                }
                if self.weighted_prediction || self.weighted_biprediction > 0 {
                    return Err(AvcError::Config(
                        "weighted prediction is not allowed in baseline".into(),
                    ));
                }
                if self.entropy_coding == EntropyCoding::Cabac {
                    return Err(AvcError::Config("CABAC is not allowed in baseline".into()));
                }
            }
            Profile::Main => {
                if self.sp_periodicity > 0 {
                    return Err(AvcError::Config("SP pictures are not allowed in main".into()));
                }
                if self.data_partitioning {
                    return Err(AvcError::Config(
                        "data partitioning is not allowed in main".into(),
                    ));
                }
                if self.slice_groups.is_some() {
                    return Err(AvcError::Config(
                        "slice groups (FMO) are not allowed in main".into(),
                    ));
                }
                if self.redundant_slices {
                    return Err(AvcError::Config(
                        "redundant pictures are not allowed in main".into(),
                    ));
                }
            }
            Profile::Extended => {
                if !self.direct_8x8_inference {
                    return Err(AvcError::Config(
                        "direct 8x8 inference must be enabled in extended".into(),
                    ));
                }
                if self.entropy_coding == EntropyCoding::Cabac {
                    return Err(AvcError::Config("CABAC is not allowed in extended".into()));
                }
            }
        }
        Ok(())
    }

    fn check_poc(&self) -> Result<()> {
        if let PicOrderCnt::Cyclic {
            offsets_for_ref_frames,
            ..
        } = &self.pic_order_cnt
        {
            if offsets_for_ref_frames.is_empty() {
                return Err(AvcError::Config(
                    "picture order count type 1 requires a populated offset cycle".into(),
                ));
            }
            if offsets_for_ref_frames.len() > MAX_POC_CYCLE_LEN {
                return Err(AvcError::Config(format!(
                    "picture order count cycle of {} entries exceeds the {} entry bound",
                    offsets_for_ref_frames.len(),
                    MAX_POC_CYCLE_LEN
                )));
            }
        }
        Ok(())
    }

    fn check_slice_groups(&self) -> Result<()> {
        let Some(groups) = &self.slice_groups else {
            return Ok(());
        };
        let num = groups.num_slice_groups_minus1;
        if num == 0 {
            return Err(AvcError::Config(
                "slice group configuration present but only one group requested".into(),
            ));
        }

        match &groups.map {
            SliceGroupMap::Interleaved { run_length_minus1 } => {
                if run_length_minus1.len() != num as usize + 1 {
                    return Err(AvcError::Config(format!(
                        "interleaved map needs {} run lengths, got {}",
                        num + 1,
                        run_length_minus1.len()
                    )));
                }
            }
            SliceGroupMap::Dispersed => {}
            SliceGroupMap::ForegroundBackground { rectangles } => {
                if rectangles.len() != num as usize {
                    return Err(AvcError::Config(format!(
                        "foreground map needs {} rectangles, got {}",
                        num,
                        rectangles.len()
                    )));
                }
                for rect in rectangles {
                    if rect.top_left > rect.bottom_right {
                        return Err(AvcError::Config(
                            "slice group rectangle corners out of order".into(),
                        ));
                    }
                }
            }
            SliceGroupMap::BoxOut(_) | SliceGroupMap::RasterScan(_) | SliceGroupMap::Wipe(_) => {}
            SliceGroupMap::Explicit { slice_group_id } => {
                let map_units = (self.width_in_mbs() * self.height_in_map_units()) as usize;
                if slice_group_id.len() != map_units {
                    return Err(AvcError::Config(format!(
                        "explicit slice group map needs {} entries, got {}",
                        map_units,
                        slice_group_id.len()
                    )));
                }
                if slice_group_id.iter().any(|&id| id > num) {
                    return Err(AvcError::Config(
                        "explicit slice group id exceeds the group count".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::h264::types::SliceGroupRect;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_valid() {
        assert!(EncoderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_baseline_rejects_b_frames() {
        let config = EncoderConfig {
            num_b_frames: 2,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AvcError::Config(_)));
        assert!(err.to_string().contains("B pictures"));
    }

    #[test]
    fn test_baseline_rejects_cabac_and_weighting() {
        let config = EncoderConfig {
            entropy_coding: EntropyCoding::Cabac,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EncoderConfig {
            weighted_prediction: true,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_main_rejects_slice_groups() {
        let config = EncoderConfig {
            profile: Profile::Main,
            slice_groups: Some(SliceGroups {
                num_slice_groups_minus1: 1,
                map: SliceGroupMap::Dispersed,
            }),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("FMO"));
    }

    #[test]
    fn test_main_allows_b_frames_and_cabac() {
        let config = EncoderConfig {
            profile: Profile::Main,
            num_b_frames: 2,
            entropy_coding: EntropyCoding::Cabac,
            weighted_prediction: true,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extended_requires_direct_inference() {
        let config = EncoderConfig {
            profile: Profile::Extended,
            direct_8x8_inference: false,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_geometry_multiples() {
        let config = EncoderConfig {
            width: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // 176x144 is fine progressive but 144 is not a multiple of 32.
        let config = EncoderConfig {
            pic_interlace: InterlaceMode::Adaptive,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EncoderConfig {
            pic_interlace: InterlaceMode::Adaptive,
            height: 160,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reference_frame_bound() {
        let config = EncoderConfig {
            num_reference_frames: 17,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_vui_rejected_loudly() {
        let config = EncoderConfig {
            vui_parameters_present: true,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AvcError::Unsupported(_)));
    }

    #[test]
    fn test_poc_cycle_bounds() {
        let config = EncoderConfig {
            pic_order_cnt: PicOrderCnt::Cyclic {
                delta_pic_order_always_zero: false,
                offset_for_non_ref_pic: 0,
                offset_for_top_to_bottom_field: 0,
                offsets_for_ref_frames: vec![],
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EncoderConfig {
            pic_order_cnt: PicOrderCnt::Cyclic {
                delta_pic_order_always_zero: false,
                offset_for_non_ref_pic: 0,
                offset_for_top_to_bottom_field: 0,
                offsets_for_ref_frames: vec![0; 257],
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_slice_group_shape_checks() {
        let base = EncoderConfig::default();

        let config = EncoderConfig {
            slice_groups: Some(SliceGroups {
                num_slice_groups_minus1: 1,
                map: SliceGroupMap::Interleaved {
                    run_length_minus1: vec![10],
                },
            }),
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = EncoderConfig {
            slice_groups: Some(SliceGroups {
                num_slice_groups_minus1: 1,
                map: SliceGroupMap::ForegroundBackground {
                    rectangles: vec![SliceGroupRect {
                        top_left: 0,
                        bottom_right: 50,
                    }],
                },
            }),
            ..base.clone()
        };
        assert!(config.validate().is_ok());

        // Explicit map must cover every map unit: 11x9 for QCIF.
        let config = EncoderConfig {
            slice_groups: Some(SliceGroups {
                num_slice_groups_minus1: 1,
                map: SliceGroupMap::Explicit {
                    slice_group_id: vec![0; 99],
                },
            }),
            ..base.clone()
        };
        assert!(config.validate().is_ok());

        let config = EncoderConfig {
            slice_groups: Some(SliceGroups {
                num_slice_groups_minus1: 1,
                map: SliceGroupMap::Explicit {
                    slice_group_id: vec![2; 99],
                },
            }),
            ..base
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_map_unit_geometry() {
        let config = EncoderConfig::default();
        assert_eq!(config.width_in_mbs(), 11);
        assert_eq!(config.height_in_map_units(), 9);
        assert!(config.frame_mbs_only());

        let config = EncoderConfig {
            mb_interlace: InterlaceMode::Adaptive,
            height: 160,
            ..Default::default()
        };
        assert_eq!(config.height_in_map_units(), 5);
        assert!(!config.frame_mbs_only());
    }
}
