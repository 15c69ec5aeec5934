//! FFmpeg / FFprobe command lines.
//!
//! Commands are built as plain argument lists first so they can be logged
//! and checked without running anything.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Codec and PCM layout used when encoding a merged file.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub video_codec: String,
    pub audio_codec: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// An external tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl FfmpegCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// `ffprobe` query for the container duration as JSON.
    pub fn probe_duration(ffprobe: impl Into<PathBuf>, input: &Path) -> Self {
        Self::new(ffprobe)
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("json")
            .arg(input)
    }

    /// Decode the first audio stream to raw `f32le` on stdout.
    pub fn decode_pcm(ffmpeg: impl Into<PathBuf>, input: &Path, sample_rate: u32, channels: u16) -> Self {
        Self::new(ffmpeg)
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(input)
            .arg("-vn") // No video
            .arg("-ac")
            .arg(channels.to_string())
            .arg("-ar")
            .arg(sample_rate.to_string())
            .arg("-f")
            .arg("f32le")
            .arg("-acodec")
            .arg("pcm_f32le")
            .arg("pipe:1")
    }

    /// Re-encode `video`'s picture with raw PCM read from stdin as the only
    /// audio, bounded to `duration_secs`.
    pub fn merge(
        ffmpeg: impl Into<PathBuf>,
        video: &Path,
        output: &Path,
        duration_secs: f64,
        params: &EncodeParams,
    ) -> Self {
        Self::new(ffmpeg)
            .arg("-n") // Never overwrite
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(video)
            .arg("-f")
            .arg("f32le")
            .arg("-ar")
            .arg(params.sample_rate.to_string())
            .arg("-ac")
            .arg(params.channels.to_string())
            .arg("-i")
            .arg("pipe:0")
            .arg("-map")
            .arg("0:v:0")
            .arg("-map")
            .arg("1:a:0")
            .arg("-c:v")
            .arg(&params.video_codec)
            .arg("-c:a")
            .arg(&params.audio_codec)
            .arg("-t")
            .arg(duration_secs.to_string())
            .arg("-movflags")
            .arg("+faststart")
            .arg("-f")
            .arg("mp4")
            .arg(output)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Short tool name for error messages.
    pub fn tool_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for FfmpegCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EncodeParams {
        EncodeParams {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            sample_rate: 44100,
            channels: 2,
        }
    }

    fn strings(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.args()
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn merge_maps_video_from_file_and_audio_from_stdin() {
        let cmd = FfmpegCommand::merge(
            "ffmpeg",
            Path::new("/clips/a.mp4"),
            Path::new("/clips/a_with_audio_50%.mp4"),
            30.016,
            &params(),
        );
        let args = strings(&cmd);
        let joined = args.join(" ");

        assert!(joined.contains("-i /clips/a.mp4"));
        assert!(joined.contains("-f f32le -ar 44100 -ac 2 -i pipe:0"));
        assert!(joined.contains("-map 0:v:0 -map 1:a:0"));
        assert!(joined.contains("-c:v libx264 -c:a aac"));
        assert!(joined.contains("-t 30.016"));
        assert_eq!(args.first().map(String::as_str), Some("-n"));
        assert!(!args.contains(&"-y".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/clips/a_with_audio_50%.mp4"));
    }

    #[test]
    fn merge_bound_keeps_full_precision() {
        let cmd = FfmpegCommand::merge(
            "ffmpeg",
            Path::new("a.mp4"),
            Path::new("a_with_audio_10%.mp4"),
            0.0004,
            &params(),
        );
        let args = strings(&cmd);
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "0.0004");
    }

    #[test]
    fn decode_outputs_raw_float_pcm() {
        let cmd = FfmpegCommand::decode_pcm("ffmpeg", Path::new("loop.mp3"), 48000, 1);
        let joined = strings(&cmd).join(" ");
        assert!(joined.contains("-vn -ac 1 -ar 48000"));
        assert!(joined.ends_with("-f f32le -acodec pcm_f32le pipe:1"));
    }

    #[test]
    fn probe_asks_for_json_duration() {
        let cmd = FfmpegCommand::probe_duration("/usr/bin/ffprobe", Path::new("a.mp4"));
        assert_eq!(cmd.tool_name(), "ffprobe");
        assert!(strings(&cmd).contains(&"format=duration".to_string()));
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let cmd = FfmpegCommand::new("ffmpeg").arg("-i").arg("my clip.mp4");
        assert_eq!(cmd.to_string(), "ffmpeg -i \"my clip.mp4\"");
    }
}
