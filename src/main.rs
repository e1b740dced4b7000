//! Terminal boundary for the bitstream-assembly crate: builds the
//! parameter sets for a configuration given on the command line and
//! writes them to an Annex B file. All library errors surface here, once,
//! as a message on stderr and a category exit code.

use std::process;

use clap::Parser;

use avcbits::codec::h264::{AnnexBWriter, Profile, SessionContext};
use avcbits::config::{EncoderConfig, FrameNumbering};
use avcbits::{AvcError, Result};

#[derive(Parser, Debug)]
#[command(
    name = "avcbits",
    about = "Writes H.264 SPS/PPS parameter sets to an Annex B byte stream"
)]
struct Args {
    /// Output file for the Annex B byte stream
    output: String,

    /// Luma picture width in samples (multiple of 16)
    #[arg(long, default_value_t = 176)]
    width: u32,

    /// Luma picture height in samples (multiple of 16)
    #[arg(long, default_value_t = 144)]
    height: u32,

    /// Profile indication: 66 baseline, 77 main, 88 extended
    #[arg(long, default_value_t = 66)]
    profile: u8,

    /// Level indication
    #[arg(long, default_value_t = 30)]
    level: u8,

    /// Reference frame count (1..=16)
    #[arg(long, default_value_t = 1)]
    ref_frames: u32,
}

fn run(args: &Args) -> Result<u64> {
    let profile = Profile::from_idc(args.profile).ok_or_else(|| {
        AvcError::Config(format!(
            "profile must be baseline(66)/main(77)/extended(88), got {}",
            args.profile
        ))
    })?;

    let config = EncoderConfig {
        profile,
        level_idc: args.level,
        width: args.width,
        height: args.height,
        num_reference_frames: args.ref_frames,
        ..Default::default()
    };

    let session = SessionContext::new(
        config,
        FrameNumbering {
            log2_max_frame_num_minus4: 0,
        },
    )?;

    let mut out = AnnexBWriter::create(&args.output)?;
    session.write_parameter_sets(&mut out)?;
    let bits = out.bits_written();
    out.finish()?;

    Ok(bits)
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(bits) => {
            println!("{}: {} bits of parameter sets written", args.output, bits);
        }
        Err(err) => {
            eprintln!("avcbits: {}", err);
            process::exit(err.exit_code());
        }
    }
}
