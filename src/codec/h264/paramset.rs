use bytes::BytesMut;

use super::syntax::SyntaxWriter;
use super::types::{
    NalRefIdc, NalUnit, NalUnitType, PicOrderCnt, Pps, SliceGroupMap, Sps,
    MAX_PARAM_SET_RBSP_SIZE,
};
use crate::config::{EncoderConfig, FrameNumbering, InterlaceMode};
use crate::error::{AvcError, Result};

/// Builds the sequence and picture parameter sets from a validated
/// configuration and derived geometry.
///
/// Pure: no bitstream is produced here, only the value structures. A
/// single parameter set pair per session is supported, so both set ids
/// are zero.
pub fn build_parameter_sets(
    config: &EncoderConfig,
    numbering: &FrameNumbering,
) -> Result<(Sps, Pps)> {
    config.validate()?;

    let frame_mbs_only = config.frame_mbs_only();

    let sps = Sps {
        profile: config.profile,
        // Constraint flags would assert Annex A conformance subsets;
        // none are claimed.
        constrained_set0: false,
        constrained_set1: false,
        constrained_set2: false,
        level_idc: config.level_idc,
        seq_parameter_set_id: 0,
        log2_max_frame_num_minus4: numbering.log2_max_frame_num_minus4,
        pic_order_cnt: config.pic_order_cnt.clone(),
        num_ref_frames: config.num_reference_frames,
        gaps_in_frame_num_value_allowed: false,
        pic_width_in_mbs_minus1: config.width_in_mbs() - 1,
        pic_height_in_map_units_minus1: config.height_in_map_units() - 1,
        frame_mbs_only,
        mb_adaptive_frame_field: config.mb_interlace != InterlaceMode::Frame,
        direct_8x8_inference: config.direct_8x8_inference,
        frame_cropping: config.frame_cropping,
        vui_parameters_present: config.vui_parameters_present,
    };

    // Reference list sizes default to the full buffer, doubled when
    // field pictures may split frames into two fields.
    let num_ref_idx_default = if frame_mbs_only {
        config.num_reference_frames - 1
    } else {
        2 * config.num_reference_frames - 1
    };

    let pps = Pps {
        pic_parameter_set_id: 0,
        seq_parameter_set_id: sps.seq_parameter_set_id,
        entropy_coding: config.entropy_coding,
        pic_order_present: config.pic_order_present,
        slice_groups: config.slice_groups.clone(),
        num_ref_idx_l0_active_minus1: num_ref_idx_default,
        num_ref_idx_l1_active_minus1: num_ref_idx_default,
        weighted_pred: config.weighted_prediction,
        weighted_bipred_idc: config.weighted_biprediction,
        pic_init_qp_minus26: config.pic_init_qp_minus26,
        pic_init_qs_minus26: config.pic_init_qs_minus26,
        chroma_qp_index_offset: config.chroma_qp_index_offset,
        deblocking_filter_control_present: config.deblocking_filter_control,
        constrained_intra_pred: config.constrained_intra_pred,
        redundant_pic_cnt_present: false,
    };

    log::info!(
        "parameter sets built: profile {:?} level {} {}x{} mbs, poc type {}",
        sps.profile,
        sps.level_idc,
        sps.pic_width_in_mbs_minus1 + 1,
        sps.pic_height_in_map_units_minus1 + 1,
        sps.pic_order_cnt.type_code()
    );

    Ok((sps, pps))
}

/// Serializes an SPS into its RBSP, fields in the mandated order.
pub fn write_sps_rbsp(sps: &Sps) -> Result<BytesMut> {
    let mut w = SyntaxWriter::with_capacity(MAX_PARAM_SET_RBSP_SIZE);

    w.write_u(8, sps.profile.idc() as u32)?;
    w.write_flag(sps.constrained_set0)?;
    w.write_flag(sps.constrained_set1)?;
    w.write_flag(sps.constrained_set2)?;
    w.write_u(5, 0)?; // reserved_zero
    w.write_u(8, sps.level_idc as u32)?;
    w.write_ue(sps.seq_parameter_set_id as u32)?;
    w.write_ue(sps.log2_max_frame_num_minus4)?;
    w.write_ue(sps.pic_order_cnt.type_code())?;

    match &sps.pic_order_cnt {
        PicOrderCnt::Counter {
            log2_max_pic_order_cnt_lsb_minus4,
        } => {
            w.write_ue(*log2_max_pic_order_cnt_lsb_minus4)?;
        }
        PicOrderCnt::Cyclic {
            delta_pic_order_always_zero,
            offset_for_non_ref_pic,
            offset_for_top_to_bottom_field,
            offsets_for_ref_frames,
        } => {
            w.write_flag(*delta_pic_order_always_zero)?;
            w.write_se(*offset_for_non_ref_pic)?;
            w.write_se(*offset_for_top_to_bottom_field)?;
            w.write_ue(offsets_for_ref_frames.len() as u32)?;
            for &offset in offsets_for_ref_frames {
                w.write_se(offset)?;
            }
        }
        PicOrderCnt::FrameNumbersOnly => {}
    }

    w.write_ue(sps.num_ref_frames)?;
    w.write_flag(sps.gaps_in_frame_num_value_allowed)?;
    w.write_ue(sps.pic_width_in_mbs_minus1)?;
    w.write_ue(sps.pic_height_in_map_units_minus1)?;
    w.write_flag(sps.frame_mbs_only)?;
    if !sps.frame_mbs_only {
        w.write_flag(sps.mb_adaptive_frame_field)?;
    }
    w.write_flag(sps.direct_8x8_inference)?;

    w.write_flag(sps.frame_cropping.is_some())?;
    if let Some(crop) = &sps.frame_cropping {
        w.write_ue(crop.left_offset)?;
        w.write_ue(crop.right_offset)?;
        w.write_ue(crop.top_offset)?;
        w.write_ue(crop.bottom_offset)?;
    }

    w.write_flag(sps.vui_parameters_present)?;
    if sps.vui_parameters_present {
        return Err(AvcError::Unsupported(
            "VUI sequence parameters are not implemented".into(),
        ));
    }

    log::debug!("sps rbsp: {} bits before trailing", w.bits_written());
    w.finish_rbsp()
}

/// Serializes a PPS into its RBSP, fields in the mandated order.
pub fn write_pps_rbsp(pps: &Pps) -> Result<BytesMut> {
    let mut w = SyntaxWriter::with_capacity(MAX_PARAM_SET_RBSP_SIZE);

    w.write_ue(pps.pic_parameter_set_id as u32)?;
    w.write_ue(pps.seq_parameter_set_id as u32)?;
    w.write_flag(pps.entropy_coding as u8 != 0)?;
    w.write_flag(pps.pic_order_present)?;

    match &pps.slice_groups {
        None => {
            w.write_ue(0)?;
        }
        Some(groups) => {
            let num = groups.num_slice_groups_minus1;
            w.write_ue(num)?;
            w.write_ue(groups.map.map_type())?;
            match &groups.map {
                SliceGroupMap::Interleaved { run_length_minus1 } => {
                    for &run in run_length_minus1 {
                        w.write_ue(run)?;
                    }
                }
                SliceGroupMap::Dispersed => {}
                SliceGroupMap::ForegroundBackground { rectangles } => {
                    // No rectangle for the background group.
                    for rect in rectangles {
                        w.write_ue(rect.top_left)?;
                        w.write_ue(rect.bottom_right)?;
                    }
                }
                SliceGroupMap::BoxOut(change)
                | SliceGroupMap::RasterScan(change)
                | SliceGroupMap::Wipe(change) => {
                    w.write_flag(change.change_direction)?;
                    w.write_ue(change.change_rate_minus1)?;
                }
                SliceGroupMap::Explicit { slice_group_id } => {
                    let id_bits = match num {
                        n if n >= 4 => 3,
                        n if n >= 2 => 2,
                        n if n >= 1 => 1,
                        _ => 0,
                    };
                    w.write_ue(slice_group_id.len() as u32 - 1)?;
                    for &id in slice_group_id {
                        w.write_u(id_bits, id)?;
                    }
                }
            }
        }
    }

    w.write_ue(pps.num_ref_idx_l0_active_minus1)?;
    w.write_ue(pps.num_ref_idx_l1_active_minus1)?;
    w.write_flag(pps.weighted_pred)?;
    w.write_u(2, pps.weighted_bipred_idc as u32)?;
    w.write_se(pps.pic_init_qp_minus26)?;
    w.write_se(pps.pic_init_qs_minus26)?;
    w.write_se(pps.chroma_qp_index_offset)?;
    w.write_flag(pps.deblocking_filter_control_present)?;
    w.write_flag(pps.constrained_intra_pred)?;
    w.write_flag(pps.redundant_pic_cnt_present)?;

    log::debug!("pps rbsp: {} bits before trailing", w.bits_written());
    w.finish_rbsp()
}

/// Wraps an SPS into its NAL unit: highest reference priority, long
/// start code.
pub fn generate_sps_nalu(sps: &Sps) -> Result<NalUnit> {
    let rbsp = write_sps_rbsp(sps)?;
    NalUnit::from_rbsp(&rbsp, NalUnitType::Sps, NalRefIdc::Highest, 0, true)
}

/// Wraps a PPS into its NAL unit: highest reference priority, long
/// start code.
pub fn generate_pps_nalu(pps: &Pps) -> Result<NalUnit> {
    let rbsp = write_pps_rbsp(pps)?;
    NalUnit::from_rbsp(&rbsp, NalUnitType::Pps, NalRefIdc::Highest, 0, true)
}

/// Owns the single active parameter-set pair for one encoding session.
///
/// Slice encoding reads the active sets from here for the lifetime of
/// the session; tearing the context down retires them.
#[derive(Debug)]
pub struct SessionContext {
    config: EncoderConfig,
    sps: Sps,
    pps: Pps,
}

impl SessionContext {
    /// Validates the configuration and builds the active parameter sets.
    pub fn new(config: EncoderConfig, numbering: FrameNumbering) -> Result<Self> {
        let (sps, pps) = build_parameter_sets(&config, &numbering)?;
        Ok(SessionContext { config, sps, pps })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn sps(&self) -> &Sps {
        &self.sps
    }

    pub fn pps(&self) -> &Pps {
        &self.pps
    }

    /// Serializes the active SPS into a fresh NAL unit.
    pub fn sps_nalu(&self) -> Result<NalUnit> {
        generate_sps_nalu(&self.sps)
    }

    /// Serializes the active PPS into a fresh NAL unit.
    pub fn pps_nalu(&self) -> Result<NalUnit> {
        generate_pps_nalu(&self.pps)
    }

    /// Emits the SPS then PPS NAL units to an Annex B sink, the order
    /// every stream must open with. Returns the bits written.
    pub fn write_parameter_sets<W: std::io::Write>(
        &self,
        out: &mut super::annexb::AnnexBWriter<W>,
    ) -> Result<u32> {
        let mut bits = out.write_nalu(&self.sps_nalu()?)?;
        bits += out.write_nalu(&self.pps_nalu()?)?;
        Ok(bits)
    }
}
