//! FFmpeg subprocess backend.
//!
//! Durations come from `ffprobe`, audio is decoded to raw `f32le` on a
//! pipe, and merged files are encoded with the processed PCM streamed into
//! FFmpeg's stdin.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::thread;

use serde_json::Value;

use super::audio::AudioTrack;
use super::command::{EncodeParams, FfmpegCommand};
use super::types::{stderr_tail, MediaError, MediaResult};
use super::{EncodeRequest, MediaBackend};
use crate::config::MergeSettings;

/// Lines of tool stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Media backend that shells out to `ffmpeg` and `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    params: EncodeParams,
}

impl FfmpegBackend {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>, params: EncodeParams) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            params,
        }
    }

    /// Build from the `[merge]` config section.
    pub fn from_settings(settings: &MergeSettings) -> Self {
        Self::new(
            &settings.ffmpeg_path,
            &settings.ffprobe_path,
            EncodeParams {
                video_codec: settings.video_codec.clone(),
                audio_codec: settings.audio_codec.clone(),
                sample_rate: settings.sample_rate,
                channels: settings.channels,
            },
        )
    }

    pub fn params(&self) -> &EncodeParams {
        &self.params
    }

    fn decode_command(&self, path: &Path) -> FfmpegCommand {
        FfmpegCommand::decode_pcm(
            &self.ffmpeg,
            path,
            self.params.sample_rate,
            self.params.channels,
        )
    }

    /// The stdin stream is declared with the layout of the track sent.
    fn merge_command(&self, request: &EncodeRequest<'_>) -> FfmpegCommand {
        let params = EncodeParams {
            sample_rate: request.audio.sample_rate(),
            channels: request.audio.channels(),
            ..self.params.clone()
        };
        FfmpegCommand::merge(
            &self.ffmpeg,
            request.video_path,
            request.output_path,
            request.duration_secs,
            &params,
        )
    }

    /// Run a command to completion, capturing stdout and stderr.
    fn run(&self, command: &FfmpegCommand) -> MediaResult<Output> {
        tracing::debug!("Running: {}", command);

        let output = command
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MediaError::ToolUnavailable {
                tool: command.tool_name(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(MediaError::command_failed(
                command.tool_name(),
                output.status.code(),
                stderr_tail(&output.stderr, STDERR_TAIL_LINES),
            ));
        }

        Ok(output)
    }
}

impl MediaBackend for FfmpegBackend {
    fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        ensure_exists(path)?;
        let output = self.run(&FfmpegCommand::probe_duration(&self.ffprobe, path))?;
        parse_duration_json(&output.stdout)
    }

    fn decode_audio(&self, path: &Path) -> MediaResult<AudioTrack> {
        ensure_exists(path)?;
        let output = self.run(&self.decode_command(path))?;

        let track = AudioTrack::from_le_bytes(
            &output.stdout,
            self.params.sample_rate,
            self.params.channels,
        );
        if track.is_empty() {
            return Err(MediaError::EmptyAudio(path.to_path_buf()));
        }

        tracing::debug!(
            "Decoded {} frames ({:.2}s) from {}",
            track.frames(),
            track.duration_secs(),
            path.display()
        );
        Ok(track)
    }

    fn encode_merged(&self, request: &EncodeRequest<'_>) -> MediaResult<()> {
        ensure_exists(request.video_path)?;
        if request.output_path.exists() {
            return Err(MediaError::OutputExists(request.output_path.to_path_buf()));
        }

        let command = self.merge_command(request);
        tracing::debug!("Running: {}", command);

        let mut child = command
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MediaError::ToolUnavailable {
                tool: command.tool_name(),
                source: e,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| MediaError::io("encode", io::Error::other("stdin not captured")))?;

        // Feed PCM from a helper thread while stderr is drained here.
        // stdin is dropped when the writer finishes, closing the stream.
        let audio = request.audio;
        let (output, write_result) = thread::scope(|scope| {
            let writer = scope.spawn(move || audio.write_le(&mut stdin));
            let output = child.wait_with_output();
            let write_result = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("PCM writer thread panicked")));
            (output, write_result)
        });
        let output = output.map_err(|e| MediaError::io("waiting for ffmpeg", e))?;

        if !output.status.success() {
            return Err(MediaError::command_failed(
                command.tool_name(),
                output.status.code(),
                stderr_tail(&output.stderr, STDERR_TAIL_LINES),
            ));
        }
        write_result.map_err(|e| MediaError::io("streaming audio to ffmpeg", e))?;

        verify_output(request.output_path)
    }

    fn decode_command_line(&self, path: &Path) -> Option<String> {
        Some(self.decode_command(path).to_string())
    }

    fn encode_command_line(&self, request: &EncodeRequest<'_>) -> Option<String> {
        Some(self.merge_command(request).to_string())
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

fn ensure_exists(path: &Path) -> MediaResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(MediaError::SourceNotFound(path.to_path_buf()))
    }
}

/// Check the encoded file is present and non-empty, then flush it to disk.
pub(crate) fn verify_output(path: &Path) -> MediaResult<()> {
    let metadata = fs::metadata(path).map_err(|_| {
        MediaError::InvalidOutput(format!("{} was not created", path.display()))
    })?;
    if metadata.len() == 0 {
        return Err(MediaError::InvalidOutput(format!(
            "{} is empty",
            path.display()
        )));
    }

    File::open(path)
        .and_then(|f| f.sync_all())
        .map_err(|e| MediaError::io("flushing encoded output", e))
}

/// Parse `ffprobe -show_entries format=duration -of json` output.
fn parse_duration_json(stdout: &[u8]) -> MediaResult<f64> {
    let json: Value = serde_json::from_slice(stdout)
        .map_err(|e| MediaError::parse("ffprobe output", e.to_string()))?;

    let raw = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .ok_or_else(|| MediaError::parse("duration", "no format.duration in ffprobe output"))?;

    // ffprobe prints the duration as a string; accept a number too.
    let duration = match raw {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| MediaError::parse("duration", format!("'{}': {}", s, e)))?,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MediaError::parse("duration", n.to_string()))?,
        other => return Err(MediaError::parse("duration", other.to_string())),
    };

    if !duration.is_finite() || duration < 0.0 {
        return Err(MediaError::parse("duration", format!("out of range: {}", duration)));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn backend() -> FfmpegBackend {
        FfmpegBackend::from_settings(&MergeSettings::default())
    }

    #[test]
    fn parses_string_duration() {
        let json = br#"{"format": {"duration": "30.016000"}}"#;
        assert!((parse_duration_json(json).unwrap() - 30.016).abs() < 1e-9);
    }

    #[test]
    fn parses_numeric_duration() {
        let json = br#"{"format": {"duration": 12.5}}"#;
        assert!((parse_duration_json(json).unwrap() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_missing_or_bad_duration() {
        assert!(parse_duration_json(br#"{"format": {}}"#).is_err());
        assert!(parse_duration_json(br#"{"format": {"duration": "N/A"}}"#).is_err());
        assert!(parse_duration_json(br#"{"format": {"duration": "-1"}}"#).is_err());
        assert!(parse_duration_json(b"not json").is_err());
    }

    #[test]
    fn probe_rejects_missing_file() {
        let result = backend().probe_duration(Path::new("/nonexistent/clip.mp4"));
        assert!(matches!(result, Err(MediaError::SourceNotFound(_))));
    }

    #[test]
    fn decode_rejects_missing_file() {
        let result = backend().decode_audio(Path::new("/nonexistent/loop.mp3"));
        assert!(matches!(result, Err(MediaError::SourceNotFound(_))));
    }

    #[test]
    fn missing_tool_is_reported() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        fs::write(&input, b"data").unwrap();

        let backend = FfmpegBackend::new(
            dir.path().join("no-such-ffmpeg"),
            dir.path().join("no-such-ffprobe"),
            backend().params().clone(),
        );
        let result = backend.probe_duration(&input);
        assert!(matches!(result, Err(MediaError::ToolUnavailable { .. })));
    }

    #[test]
    fn verify_output_rejects_empty_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.mp4");
        fs::write(&out, b"").unwrap();
        assert!(matches!(verify_output(&out), Err(MediaError::InvalidOutput(_))));

        fs::write(&out, b"mp4").unwrap();
        assert!(verify_output(&out).is_ok());
    }

    #[test]
    fn encode_refuses_existing_output() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        let output = dir.path().join("clip_with_audio_50%.mp4");
        fs::write(&video, b"video").unwrap();
        fs::write(&output, b"kept from an earlier run").unwrap();

        let audio = AudioTrack::new(vec![0.0; 10], 10, 1);
        let request = EncodeRequest {
            video_path: &video,
            audio: &audio,
            output_path: &output,
            duration_secs: 1.0,
        };
        let result = backend().encode_merged(&request);

        assert!(matches!(result, Err(MediaError::OutputExists(_))));
        assert_eq!(fs::read(&output).unwrap(), b"kept from an earlier run");
    }

    #[test]
    fn command_lines_name_the_files() {
        let audio = AudioTrack::new(vec![0.0; 10], 10, 1);
        let request = EncodeRequest {
            video_path: Path::new("/clips/a.mp4"),
            audio: &audio,
            output_path: Path::new("/clips/a_with_audio_50%.mp4"),
            duration_secs: 1.0,
        };
        let backend = backend();

        let encode = backend.encode_command_line(&request).unwrap();
        assert!(encode.starts_with("ffmpeg -n"));
        assert!(encode.contains("-ar 10 -ac 1 -i pipe:0"));
        assert!(encode.ends_with("/clips/a_with_audio_50%.mp4"));

        let decode = backend.decode_command_line(Path::new("/music/loop.mp3")).unwrap();
        assert!(decode.contains("-i /music/loop.mp3"));
    }

    #[test]
    fn verify_output_rejects_missing_file() {
        let dir = tempdir().unwrap();
        let result = verify_output(&dir.path().join("never_written.mp4"));
        assert!(matches!(result, Err(MediaError::InvalidOutput(_))));
    }
}
