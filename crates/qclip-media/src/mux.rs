//! Still-loop encoding: one held frame over a narration track.

use std::path::Path;
use std::time::{Duration, Instant};

use qclip_models::EncodingConfig;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_media;

/// Upper bound on reading the narration length before encoding.
const NARRATION_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the FFmpeg command that loops `still` for the length of `audio`.
pub fn still_loop_command(
    still: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input_with(["-loop", "1"], still)
        .input(audio)
        .output_args(encoding.to_ffmpeg_args())
}

/// Expected output length in milliseconds: the narration length clipped to
/// the cap, or the cap itself when the narration length is unknown.
pub fn expected_output_ms(narration_secs: Option<f64>, max_duration_secs: u32) -> i64 {
    let cap_ms = i64::from(max_duration_secs) * 1000;
    match narration_secs {
        Some(secs) if secs.is_finite() && secs > 0.0 => ((secs * 1000.0) as i64).min(cap_ms),
        _ => cap_ms,
    }
}

async fn narration_secs(audio: &Path) -> Option<f64> {
    match tokio::time::timeout(NARRATION_LOOKUP_TIMEOUT, probe_media(audio)).await {
        Ok(Ok(info)) => Some(info.duration),
        Ok(Err(e)) => {
            debug!(error = %e, "Narration length unavailable, reporting progress against the cap");
            None
        }
        Err(_) => None,
    }
}

/// Encode a still image and an audio track into an MP4.
///
/// Output stops at the end of the audio or at the configured cap,
/// whichever comes first.
pub async fn encode_still_loop(
    runner: &FfmpegRunner,
    still: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let audio = audio.as_ref();
    let total_ms = expected_output_ms(narration_secs(audio).await, encoding.max_duration_secs);
    let cmd = still_loop_command(still, audio, output, encoding);
    let start = Instant::now();

    runner
        .run_with_progress(&cmd, move |progress| {
            debug!(
                out_time_ms = progress.out_time_ms,
                percent = progress.percentage(total_ms),
                "Encoding progress"
            );
        })
        .await?;

    info!(
        output = %cmd.output_path().display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Still-loop encode finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_loop_arguments() {
        let cmd = still_loop_command(
            "/w/quote_image.jpg",
            "/w/audio.mp3",
            "/w/output.mp4",
            &EncodingConfig::default(),
        );
        let args = cmd.build_args().join(" ");

        assert!(args.contains("-loop 1 -i /w/quote_image.jpg -i /w/audio.mp3"));
        assert!(args.contains("-c:v libx264 -tune stillimage"));
        assert!(args.contains("-c:a aac -b:a 192k"));
        assert!(args.contains("-pix_fmt yuv420p -shortest -t 15"));
        assert!(args.ends_with("/w/output.mp4"));
        assert_eq!(args.matches("-v error").count(), 1);
    }

    #[test]
    fn test_expected_output_follows_narration() {
        assert_eq!(expected_output_ms(Some(4.2), 15), 4200);
        assert_eq!(expected_output_ms(Some(40.0), 15), 15000);
        assert_eq!(expected_output_ms(None, 15), 15000);
        assert_eq!(expected_output_ms(Some(0.0), 15), 15000);
        assert_eq!(expected_output_ms(Some(f64::NAN), 15), 15000);
    }
}
