use log::{debug, info};
use std::path::Path;
use std::process::Command;

use crate::error::{ClipError, ClipResult};

/// Handles all FFmpeg-related operations for probing and cutting video
pub struct FFmpeg;

impl FFmpeg {
    /// Checks if FFmpeg is available on the system
    pub fn check_ffmpeg() -> ClipResult<()> {
        Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map_err(|_| {
                ClipError::ExternalTool(
                    "FFmpeg is not installed or not available in system PATH".to_string(),
                )
            })?;
        Ok(())
    }

    /// Gets the duration of a video file in seconds
    pub fn probe_duration(input_path: &Path) -> ClipResult<f64> {
        let input = input_path.to_string_lossy();
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                input.as_ref(),
            ])
            .output()
            .map_err(|e| ClipError::ExternalTool(format!("failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(ClipError::ExternalTool(format!(
                "ffprobe failed on {}: {}",
                input_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let duration_str = String::from_utf8_lossy(&output.stdout);
        let duration = duration_str.trim().parse::<f64>().map_err(|_| {
            ClipError::ExternalTool(format!(
                "could not read duration of {} from ffprobe output",
                input_path.display()
            ))
        })?;

        debug!("{} is {:.3}s long", input_path.display(), duration);
        Ok(duration)
    }

    /// Losslessly cuts a clip out of the source video
    ///
    /// # Arguments
    /// * `input_path` - Path to the source video
    /// * `output_path` - Path where the clip will be written
    /// * `start_secs` - Offset into the source at which the clip starts
    /// * `duration_secs` - Length of the clip
    pub fn cut_clip(
        input_path: &Path,
        output_path: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> ClipResult<()> {
        let args = Self::cut_args(input_path, output_path, start_secs, duration_secs);
        info!(
            "Cutting {:.3}s starting at {:.3}s from {}",
            duration_secs,
            start_secs,
            input_path.display()
        );
        debug!("ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .output()
            .map_err(|e| ClipError::ExternalTool(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            return Err(ClipError::ExternalTool(format!(
                "ffmpeg cut failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    /// Builds the argument list for a stream-copy cut
    fn cut_args(
        input_path: &Path,
        output_path: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> Vec<String> {
        vec![
            "-ss".to_string(),
            start_secs.to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().into_owned(),
            "-t".to_string(),
            duration_secs.to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            output_path.to_string_lossy().into_owned(),
            "-y".to_string(),
        ]
    }
}
