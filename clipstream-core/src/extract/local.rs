//! Local ffmpeg subprocess extraction strategy.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use bytes::Bytes;

use super::{ClipExtractor, ClipRequest, ClipResult, ExtractError, mp4};
use crate::config::ExtractionConfig;

/// Extracts clips by invoking ffmpeg directly against the source URL.
///
/// ffmpeg reads HLS playlists and remote HTTP sources natively; the command
/// sets a protocol allowlist and reconnect options so transient connection
/// drops do not abort the copy.
pub struct LocalProcessExtractor {
    config: ExtractionConfig,
}

impl LocalProcessExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Checks that the configured ffmpeg binary runs at all.
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Builds the ffmpeg argument list for a stream-copy trim.
///
/// Input options (allowlist, reconnect, seek) must precede `-i`; the seek is
/// applied on the input side so ffmpeg jumps to the nearest keyframe instead
/// of decoding from the start. `-avoid_negative_ts make_zero` rebases the
/// output container to zero timestamps.
fn build_ffmpeg_args(request: &ClipRequest, output: &Path) -> Vec<String> {
    let range = &request.range;
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-protocol_whitelist".to_string(),
        "file,http,https,tcp,tls".to_string(),
        "-reconnect".to_string(),
        "1".to_string(),
        "-reconnect_streamed".to_string(),
        "1".to_string(),
        "-reconnect_delay_max".to_string(),
        "5".to_string(),
        "-ss".to_string(),
        range.start_seconds.to_string(),
        "-i".to_string(),
        request.source().to_string(),
        "-t".to_string(),
        range.duration_seconds().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        "-avoid_negative_ts".to_string(),
        "make_zero".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-f".to_string(),
        "mp4".to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

#[async_trait::async_trait]
impl ClipExtractor for LocalProcessExtractor {
    async fn extract(&self, request: &ClipRequest) -> Result<ClipResult, ExtractError> {
        let started = Instant::now();

        // Unique output path owned by this invocation; the TempPath guard
        // removes it on every exit path, including timeout and panic.
        let mut builder = tempfile::Builder::new();
        builder.prefix("clipstream-").suffix(".mp4");
        let temp_file = match &self.config.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let output_path = temp_file.into_temp_path();

        let args = build_ffmpeg_args(request, &output_path);
        tracing::debug!(
            source = request.source(),
            start = request.range.start_seconds,
            duration = request.range.duration_seconds(),
            "starting ffmpeg stream-copy trim"
        );

        let mut command = tokio::process::Command::new(&self.config.ffmpeg_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| ExtractError::EngineFailed {
            detail: format!("failed to spawn {}: {e}", self.config.ffmpeg_path),
        })?;

        let timeout = self.config.extraction_timeout;
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            // Dropping the child future kills the subprocess (kill_on_drop);
            // the TempPath guard removes the partial output below.
            Err(_) => {
                return Err(ExtractError::Timeout {
                    seconds: timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(exit = ?output.status.code(), "ffmpeg trim failed");
            return Err(ExtractError::EngineFailed {
                detail: format!("ffmpeg exited with {}: {stderr}", output.status),
            });
        }

        let clip_bytes = tokio::fs::read(&output_path).await?;
        mp4::validate_clip_bytes(&clip_bytes)?;

        tracing::info!(
            bytes = clip_bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "clip extracted via local process"
        );

        Ok(ClipResult {
            bytes: Bytes::from(clip_bytes),
            mime_type: mp4::MP4_MIME.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timecode::TimeRange;

    fn request() -> ClipRequest {
        ClipRequest::new(
            "https://cdn.example.net/vod/chunked/index-dvr.m3u8",
            TimeRange {
                start_seconds: 10,
                end_seconds: 15,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_args_are_stream_copy_with_input_seek() {
        let args = build_ffmpeg_args(&request(), Path::new("/tmp/out.mp4"));

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input, "seek must be an input option");
        assert_eq!(args[ss + 1], "10");

        let duration = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[duration + 1], "5");

        let codec = args.iter().position(|a| a == "-c").unwrap();
        assert_eq!(args[codec + 1], "copy");

        assert!(args.contains(&"-avoid_negative_ts".to_string()));
        assert!(args.contains(&"-protocol_whitelist".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
    }

    #[test]
    fn test_reconnect_options_precede_input() {
        let args = build_ffmpeg_args(&request(), Path::new("/tmp/out.mp4"));
        let reconnect = args.iter().position(|a| a == "-reconnect").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(reconnect < input);
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_failure() {
        let config = ExtractionConfig {
            ffmpeg_path: "/nonexistent/clipstream-test-ffmpeg".to_string(),
            ..Default::default()
        };
        let extractor = LocalProcessExtractor::new(config);

        let result = extractor.extract(&request()).await;
        assert!(matches!(result, Err(ExtractError::EngineFailed { .. })));
    }

    #[test]
    fn test_availability_check_for_missing_binary() {
        let config = ExtractionConfig {
            ffmpeg_path: "/nonexistent/clipstream-test-ffmpeg".to_string(),
            ..Default::default()
        };
        assert!(!LocalProcessExtractor::new(config).is_available());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_engine_and_removes_partial_output() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Duration;

        // A stand-in engine that never finishes.
        let stub_dir = tempfile::tempdir().unwrap();
        let stub = stub_dir.path().join("hanging-engine.sh");
        std::fs::write(&stub, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output_dir = tempfile::tempdir().unwrap();
        let config = ExtractionConfig {
            ffmpeg_path: stub.to_string_lossy().to_string(),
            extraction_timeout: Duration::from_millis(300),
            temp_dir: Some(output_dir.path().to_path_buf()),
            ..Default::default()
        };
        let extractor = LocalProcessExtractor::new(config);

        let result = extractor.extract(&request()).await;
        assert!(matches!(result, Err(ExtractError::Timeout { .. })));

        let leftover = std::fs::read_dir(output_dir.path()).unwrap().count();
        assert_eq!(leftover, 0, "timed-out run must not leave a partial file");
    }
}
