use bytes::Bytes;

/// Upper bound on a raw byte sequence payload handed to NAL packaging.
pub const MAX_RBSP_SIZE: usize = 64_000;

/// Generous fixed capacity for a parameter-set RBSP buffer.
pub const MAX_PARAM_SET_RBSP_SIZE: usize = 1_500;

/// NAL unit type codes used by the encoder.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NalUnitType {
    Slice = 1,
    DataPartitionA = 2,
    DataPartitionB = 3,
    DataPartitionC = 4,
    IdrSlice = 5,
    Sei = 6,
    Sps = 7,
    Pps = 8,
    AccessUnitDelimiter = 9,
    EndOfSequence = 10,
    EndOfStream = 11,
    FillerData = 12,
}

impl NalUnitType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NalUnitType::Slice),
            2 => Some(NalUnitType::DataPartitionA),
            3 => Some(NalUnitType::DataPartitionB),
            4 => Some(NalUnitType::DataPartitionC),
            5 => Some(NalUnitType::IdrSlice),
            6 => Some(NalUnitType::Sei),
            7 => Some(NalUnitType::Sps),
            8 => Some(NalUnitType::Pps),
            9 => Some(NalUnitType::AccessUnitDelimiter),
            10 => Some(NalUnitType::EndOfSequence),
            11 => Some(NalUnitType::EndOfStream),
            12 => Some(NalUnitType::FillerData),
            _ => None,
        }
    }
}

/// NAL reference priority, two bits in the unit header. 0 is disposable,
/// 3 the highest priority (used for parameter sets).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NalRefIdc {
    Disposable = 0,
    Low = 1,
    High = 2,
    Highest = 3,
}

impl NalRefIdc {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NalRefIdc::Disposable),
            1 => Some(NalRefIdc::Low),
            2 => Some(NalRefIdc::High),
            3 => Some(NalRefIdc::Highest),
            _ => None,
        }
    }
}

/// A packaged NAL unit: header byte plus emulation-protected payload,
/// ready for a byte-stream writer.
///
/// The forbidden bit is always zero by construction.
#[derive(Debug)]
pub struct NalUnit {
    pub ref_idc: NalRefIdc,
    pub unit_type: NalUnitType,
    pub long_start_code: bool,
    /// Bits injected by minimum-size payload stuffing, for statistics.
    pub stuffing_bits: u32,
    pub(crate) payload: Bytes,
}

impl NalUnit {
    /// Header byte followed by the EBSP payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Total NAL length in bytes (header byte included, start code not).
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Start code prefix length in bytes: 4 for parameter sets and the
    /// first slice of a picture, else 3.
    pub fn start_code_prefix_len(&self) -> usize {
        if self.long_start_code {
            4
        } else {
            3
        }
    }

    pub fn header_byte(&self) -> u8 {
        self.payload[0]
    }
}

/// H.264 profiles supported by this encoder.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Baseline = 66,
    Main = 77,
    Extended = 88,
}

impl Profile {
    pub fn idc(&self) -> u8 {
        *self as u8
    }

    pub fn from_idc(idc: u8) -> Option<Self> {
        match idc {
            66 => Some(Profile::Baseline),
            77 => Some(Profile::Main),
            88 => Some(Profile::Extended),
            _ => None,
        }
    }
}

/// Entropy coding mode signalled in the PPS.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyCoding {
    Cavlc = 0,
    Cabac = 1,
}

/// Picture order count signalling mode carried in the SPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PicOrderCnt {
    /// Type 0: an lsb counter with an explicit maximum.
    Counter { log2_max_pic_order_cnt_lsb_minus4: u32 },
    /// Type 1: cyclic offsets relative to frame numbers.
    Cyclic {
        delta_pic_order_always_zero: bool,
        offset_for_non_ref_pic: i32,
        offset_for_top_to_bottom_field: i32,
        /// One signed offset per reference frame in the cycle, at most
        /// 256 entries.
        offsets_for_ref_frames: Vec<i32>,
    },
    /// Type 2: order derived from frame numbers alone, no extra fields.
    FrameNumbersOnly,
}

impl PicOrderCnt {
    pub fn type_code(&self) -> u32 {
        match self {
            PicOrderCnt::Counter { .. } => 0,
            PicOrderCnt::Cyclic { .. } => 1,
            PicOrderCnt::FrameNumbersOnly => 2,
        }
    }
}

/// Frame cropping rectangle, in the units the SPS mandates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left_offset: u32,
    pub right_offset: u32,
    pub top_offset: u32,
    pub bottom_offset: u32,
}

/// Direction/rate parameters shared by the three evolving slice-group
/// map types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceGroupChange {
    pub change_direction: bool,
    pub change_rate_minus1: u32,
}

/// One foreground rectangle for map type 2, both corners in map-unit
/// raster order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceGroupRect {
    pub top_left: u32,
    pub bottom_right: u32,
}

/// Slice group (FMO) map configuration. Each variant carries exactly the
/// fields its map type emits, so field presence is bound to map type by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceGroupMap {
    /// Type 0: run lengths, one per slice group.
    Interleaved { run_length_minus1: Vec<u32> },
    /// Type 1: dispersed (checkerboard) assignment, no parameters.
    Dispersed,
    /// Type 2: foreground rectangles over a background group; one
    /// rectangle per slice group except the last.
    ForegroundBackground { rectangles: Vec<SliceGroupRect> },
    /// Type 3: box-out.
    BoxOut(SliceGroupChange),
    /// Type 4: raster scan.
    RasterScan(SliceGroupChange),
    /// Type 5: wipe.
    Wipe(SliceGroupChange),
    /// Type 6: explicit per-map-unit group ids.
    Explicit { slice_group_id: Vec<u32> },
}

impl SliceGroupMap {
    pub fn map_type(&self) -> u32 {
        match self {
            SliceGroupMap::Interleaved { .. } => 0,
            SliceGroupMap::Dispersed => 1,
            SliceGroupMap::ForegroundBackground { .. } => 2,
            SliceGroupMap::BoxOut(_) => 3,
            SliceGroupMap::RasterScan(_) => 4,
            SliceGroupMap::Wipe(_) => 5,
            SliceGroupMap::Explicit { .. } => 6,
        }
    }
}

/// Slice-group partitioning: group count above one plus the map that
/// assigns macroblocks to groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceGroups {
    pub num_slice_groups_minus1: u32,
    pub map: SliceGroupMap,
}

/// Sequence parameter set values, one active instance per session.
///
/// Instances come out of the parameter-set builder only, after the full
/// configuration validation has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sps {
    pub profile: Profile,
    pub constrained_set0: bool,
    pub constrained_set1: bool,
    pub constrained_set2: bool,
    pub level_idc: u8,
    /// Identifier in 0..=31. A single parameter set per session is
    /// supported, so this is always zero today.
    pub seq_parameter_set_id: u8,
    pub log2_max_frame_num_minus4: u32,
    pub pic_order_cnt: PicOrderCnt,
    pub num_ref_frames: u32,
    pub gaps_in_frame_num_value_allowed: bool,
    pub pic_width_in_mbs_minus1: u32,
    pub pic_height_in_map_units_minus1: u32,
    pub frame_mbs_only: bool,
    pub mb_adaptive_frame_field: bool,
    pub direct_8x8_inference: bool,
    pub frame_cropping: Option<CropRect>,
    pub vui_parameters_present: bool,
}

/// Picture parameter set values, one active instance per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pps {
    pub pic_parameter_set_id: u8,
    pub seq_parameter_set_id: u8,
    pub entropy_coding: EntropyCoding,
    pub pic_order_present: bool,
    /// `None` encodes num_slice_groups_minus1 == 0 (a single group, no
    /// map fields).
    pub slice_groups: Option<SliceGroups>,
    pub num_ref_idx_l0_active_minus1: u32,
    pub num_ref_idx_l1_active_minus1: u32,
    pub weighted_pred: bool,
    pub weighted_bipred_idc: u8,
    pub pic_init_qp_minus26: i32,
    pub pic_init_qs_minus26: i32,
    pub chroma_qp_index_offset: i32,
    pub deblocking_filter_control_present: bool,
    pub constrained_intra_pred: bool,
    pub redundant_pic_cnt_present: bool,
}
