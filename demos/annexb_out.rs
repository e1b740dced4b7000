//! Builds parameter sets for a QCIF baseline session and dumps the
//! resulting Annex B stream as hex.
//!
//! Run with: `cargo run --example annexb_out`

use avcbits::codec::h264::{AnnexBWriter, SessionContext};
use avcbits::config::{EncoderConfig, FrameNumbering};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let session = SessionContext::new(
        EncoderConfig::default(),
        FrameNumbering {
            log2_max_frame_num_minus4: 0,
        },
    )?;

    let mut out = AnnexBWriter::new(Vec::new());
    let bits = session.write_parameter_sets(&mut out)?;
    let stream = out.finish()?;

    println!("{} bits of parameter sets:", bits);
    for (i, byte) in stream.iter().enumerate() {
        if i % 16 == 0 {
            print!("\n{:04x}:", i);
        }
        print!(" {:02x}", byte);
    }
    println!();

    Ok(())
}
