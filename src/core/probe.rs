//! core/probe.rs
//! Audio length via Symphonia, used only for the report and sanity warnings.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::debug;

/// Best-effort length of the default track. `None` if the file can't be
/// probed or the container doesn't say.
pub fn probe_duration(path: &Path) -> Option<Duration> {
    match try_probe(path) {
        Ok(d) => d,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "audio probe failed");
            None
        }
    }
}

fn try_probe(path: &Path) -> Result<Option<Duration>, String> {
    let file = File::open(path).map_err(|e| format!("Open failed: {e}"))?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| format!("Format probe failed: {e}"))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| "No supported audio track found.".to_string())?;

    Ok(duration_from_params(
        track.codec_params.time_base,
        track.codec_params.n_frames,
    ))
}

fn duration_from_params(time_base: Option<TimeBase>, n_frames: Option<u64>) -> Option<Duration> {
    let tb = time_base?;
    let frames = n_frames?;

    // Time is { seconds: u64, frac: f64 } in symphonia 0.5.x.
    let t = tb.calc_time(frames);
    Some(Duration::from_secs(t.seconds) + Duration::from_secs_f64(t.frac))
}
