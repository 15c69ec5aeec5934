//! Batch processor running every video of a request through the merge steps.
//!
//! The source audio is decoded once per batch and never modified. Each job
//! derives its own working copy (extend, trim, scale), encodes a staging
//! file next to the video, and only then replaces the original.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{MergeError, MergeResult};
use super::naming::{final_path, staging_path};
use super::replace::commit;
use super::report::BatchReport;
use crate::logging::JobLogger;
use crate::media::{AudioTrack, EncodeRequest, MediaBackend, MediaError};
use crate::models::{JobOutcome, MergeJob, MergeRequest};

/// Runs merge batches against a media backend.
///
/// # Example
///
/// ```ignore
/// let processor = BatchProcessor::new(FfmpegBackend::from_settings(&settings.merge))
///     .with_logger(JobLogger::for_batch(&logs_dir, LogConfig::default())?);
/// let report = processor.process(&request)?;
/// ```
pub struct BatchProcessor {
    backend: Box<dyn MediaBackend>,
    logger: Option<JobLogger>,
}

impl BatchProcessor {
    pub fn new(backend: impl MediaBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            logger: None,
        }
    }

    /// Write a per-batch log file as well as `tracing` events.
    pub fn with_logger(mut self, logger: JobLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.logger.as_ref().map(JobLogger::log_path)
    }

    /// Process every video of `request` in order.
    ///
    /// Returns `Err` only when the audio source cannot be loaded, in which
    /// case no video has been touched. Per-job failures are collected in the
    /// report and the batch moves on.
    pub fn process(&self, request: &MergeRequest) -> MergeResult<BatchReport> {
        let total = request.videos().len();
        tracing::info!(
            "Starting batch: {} video(s), audio {}, volume {} ({})",
            total,
            request.audio().display(),
            request.volume(),
            self.backend.name()
        );
        self.with_log(|l| {
            l.phase("Loading audio");
            l.info(&format!("Audio: {}", request.audio().display()));
            l.info(&format!("Volume: {}", request.volume()));
        });

        if let Some(line) = self.backend.decode_command_line(request.audio()) {
            self.with_log(|l| l.command(&line));
        }
        let source = match self.backend.decode_audio(request.audio()) {
            Ok(track) => track,
            Err(e) => {
                self.report_media_error("decode", &e);
                tracing::error!("Cannot load audio {}: {}", request.audio().display(), e);
                self.with_log(|l| {
                    l.error(&format!("Cannot load audio: {}", e));
                    l.flush();
                });
                return Err(MergeError::decode(request.audio(), e));
            }
        };
        self.with_log(|l| {
            l.info(&format!(
                "Audio: {:.3}s, {} Hz, {} channel(s)",
                source.duration_secs(),
                source.sample_rate(),
                source.channels()
            ))
        });

        let mut report =
            BatchReport::new().with_log_path(self.log_path().map(Path::to_path_buf));

        for job in request.jobs() {
            self.with_log(|l| l.phase(&format!("Job {}/{}: {}", job.index, total, job.name())));

            let result = self.process_job(&job, &source);
            match &result {
                Ok(outcome) => {
                    tracing::info!(
                        "Job {}/{} done: {}",
                        job.index,
                        total,
                        outcome.final_path.display()
                    );
                    self.with_log(|l| {
                        l.success(&format!("Saved {}", outcome.final_path.display()))
                    });
                }
                Err(e) => {
                    tracing::warn!("Job {}/{} failed: {}", job.index, total, e);
                    self.with_log(|l| l.error(&e.to_string()));
                }
            }
            report.push(job, result);
        }

        self.with_log(|l| {
            l.phase("Batch finished");
            l.info(&report.summary());
            l.flush();
        });
        tracing::info!("{}", report.summary());

        Ok(report)
    }

    /// Merge `source` into one video and replace it.
    pub fn process_job(&self, job: &MergeJob, source: &AudioTrack) -> MergeResult<JobOutcome> {
        let video = job.video_path.as_path();

        let video_duration = self
            .backend
            .probe_duration(video)
            .map_err(|e| MergeError::decode(video, e))?;
        if video_duration <= 0.0 {
            return Err(MergeError::decode(
                video,
                MediaError::parse("duration", "video reports zero length"),
            ));
        }

        let (staging, target) = output_paths(job)?;
        // Whatever sits at the staging path was not written by this job.
        if staging.exists() {
            return Err(MergeError::encode(video, MediaError::OutputExists(staging)));
        }

        let (working, repetitions) = source.fit_and_scale(video_duration, job.volume.factor());
        self.with_log(|l| {
            l.info(&format!(
                "Video {:.3}s, audio {:.3}s x{} trimmed to {:.3}s",
                video_duration,
                source.duration_secs(),
                repetitions,
                working.duration_secs()
            ))
        });

        let request = EncodeRequest {
            video_path: video,
            audio: &working,
            output_path: &staging,
            duration_secs: video_duration,
        };
        self.with_log(|l| match self.backend.encode_command_line(&request) {
            Some(line) => l.command(&line),
            None => l.info(&format!("Encoding {}", staging.display())),
        });
        let encoded = self.backend.encode_merged(&request);
        drop(working);

        if let Err(e) = encoded {
            self.report_media_error("encode", &e);
            self.remove_partial(&staging);
            return Err(MergeError::encode(video, e));
        }

        if let Err(e) = commit(video, &staging, &target) {
            self.with_log(|l| l.warn(&format!("Merged file kept at {}", staging.display())));
            return Err(MergeError::replace(video, &staging, e));
        }

        Ok(JobOutcome {
            video_path: job.video_path.clone(),
            final_path: target,
            video_duration_secs: video_duration,
            audio_duration_secs: source.duration_secs(),
            repetitions,
        })
    }

    /// Remove a staging file left by a failed encode of this job.
    fn remove_partial(&self, staging: &Path) {
        if !staging.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(staging) {
            tracing::warn!("Could not remove {}: {}", staging.display(), e);
            self.with_log(|l| {
                l.warn(&format!("Could not remove {}: {}", staging.display(), e))
            });
        }
    }

    fn report_media_error(&self, stage: &str, error: &MediaError) {
        if let Some(logger) = &self.logger {
            for line in error.output_lines() {
                logger.output_line(line);
            }
            logger.show_tail(stage);
        }
    }

    fn with_log(&self, f: impl FnOnce(&JobLogger)) {
        if let Some(logger) = &self.logger {
            f(logger);
        }
    }
}

fn output_paths(job: &MergeJob) -> MergeResult<(PathBuf, PathBuf)> {
    let video = job.video_path.as_path();
    match (staging_path(video, job.volume), final_path(video)) {
        (Some(staging), Some(target)) => Ok((staging, target)),
        _ => Err(MergeError::decode(
            video,
            MediaError::parse("video path", "no file name"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use parking_lot::Mutex;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    use crate::logging::{init_test_tracing, LogConfig};
    use crate::merge::ReplaceError;
    use crate::models::VolumeScale;

    const RATE: u32 = 10;

    /// Backend with scripted durations that writes a JSON description of
    /// every encode to the staging file.
    #[derive(Default)]
    struct ScriptedBackend {
        durations: HashMap<PathBuf, f64>,
        audio: Option<AudioTrack>,
        fail_encode: HashSet<PathBuf>,
        /// Fail before the tool writes anything.
        unavailable: HashSet<PathBuf>,
        encoded: Mutex<Vec<PathBuf>>,
    }

    #[derive(Deserialize)]
    struct Encoded {
        source: String,
        samples: Vec<f32>,
        duration: f64,
    }

    impl MediaBackend for ScriptedBackend {
        fn probe_duration(&self, path: &Path) -> Result<f64, MediaError> {
            self.durations
                .get(path)
                .copied()
                .ok_or_else(|| MediaError::SourceNotFound(path.to_path_buf()))
        }

        fn decode_audio(&self, path: &Path) -> Result<AudioTrack, MediaError> {
            self.audio
                .clone()
                .ok_or_else(|| MediaError::EmptyAudio(path.to_path_buf()))
        }

        fn encode_merged(&self, request: &EncodeRequest<'_>) -> Result<(), MediaError> {
            self.encoded.lock().push(request.video_path.to_path_buf());
            if self.unavailable.contains(request.video_path) {
                return Err(MediaError::ToolUnavailable {
                    tool: "ffmpeg".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
                });
            }
            if self.fail_encode.contains(request.video_path) {
                fs::write(request.output_path, b"partial").map_err(|e| MediaError::io("write", e))?;
                return Err(MediaError::command_failed(
                    "ffmpeg",
                    Some(1),
                    "Conversion failed!\nInvalid data found when processing input",
                ));
            }
            let source = fs::read_to_string(request.video_path)
                .map_err(|e| MediaError::io("read", e))?;
            let body = json!({
                "source": source,
                "samples": request.audio.samples(),
                "duration": request.duration_secs,
            });
            fs::write(request.output_path, body.to_string())
                .map_err(|e| MediaError::io("write", e))
        }

        fn decode_command_line(&self, path: &Path) -> Option<String> {
            Some(format!("scripted-decode {}", path.display()))
        }

        fn encode_command_line(&self, request: &EncodeRequest<'_>) -> Option<String> {
            Some(format!("scripted-encode {}", request.output_path.display()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Mono ramp, 10 frames per second.
    fn ramp(secs: usize) -> AudioTrack {
        let frames = secs * RATE as usize;
        let samples = (0..frames).map(|i| (i + 1) as f32 / frames as f32).collect();
        AudioTrack::new(samples, RATE, 1)
    }

    fn video(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn read_encoded(path: &Path) -> Encoded {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn request(videos: Vec<PathBuf>, volume: VolumeScale) -> MergeRequest {
        MergeRequest::new(videos, Some(PathBuf::from("/music/loop.mp3")), volume).unwrap()
    }

    #[test]
    fn loops_scales_and_replaces_in_place() {
        init_test_tracing();
        let dir = tempdir().unwrap();
        let clip = video(&dir, "clip.mp4", "original clip");
        let audio = ramp(10);

        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 30.0)]),
            audio: Some(audio.clone()),
            ..Default::default()
        };
        let processor = BatchProcessor::new(backend);
        let report = processor
            .process(&request(vec![clip.clone()], VolumeScale::Percent50))
            .unwrap();

        assert!(report.is_success());
        let outcome = report.succeeded()[0];
        assert_eq!(outcome.final_path, clip);
        assert_eq!(outcome.repetitions, 4);

        let encoded = read_encoded(&clip);
        assert_eq!(encoded.source, "original clip");
        assert_eq!(encoded.duration, 30.0);
        assert_eq!(encoded.samples.len(), 300);
        let expected: Vec<f32> = audio
            .samples()
            .repeat(3)
            .iter()
            .map(|s| s * 0.5)
            .collect();
        assert_eq!(encoded.samples, expected);

        assert!(!dir.path().join("clip_with_audio_50%.mp4").exists());
    }

    #[test]
    fn shorter_video_truncates_audio() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "short.mp4", "short");

        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 4.0)]),
            audio: Some(ramp(10)),
            ..Default::default()
        };
        let report = BatchProcessor::new(backend)
            .process(&request(vec![clip.clone()], VolumeScale::Percent90))
            .unwrap();

        assert_eq!(report.succeeded()[0].repetitions, 1);
        assert_eq!(read_encoded(&clip).samples.len(), 40);
    }

    #[test]
    fn every_job_starts_from_unmodified_audio() {
        let dir = tempdir().unwrap();
        let a = video(&dir, "a.mp4", "a");
        let b = video(&dir, "b.mp4", "b");
        let audio = ramp(5);

        let backend = ScriptedBackend {
            durations: HashMap::from([(a.clone(), 5.0), (b.clone(), 5.0)]),
            audio: Some(audio.clone()),
            ..Default::default()
        };
        let report = BatchProcessor::new(backend)
            .process(&request(vec![a.clone(), b.clone()], VolumeScale::Percent20))
            .unwrap();

        assert!(report.is_success());
        let expected: Vec<f32> = audio.samples().iter().map(|s| s * 0.2).collect();
        assert_eq!(read_encoded(&a).samples, expected);
        assert_eq!(read_encoded(&b).samples, expected);
    }

    #[test]
    fn rerun_replaces_the_merged_file_again() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "clip.mp4", "original clip");
        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 2.0)]),
            audio: Some(ramp(2)),
            ..Default::default()
        };
        let processor = BatchProcessor::new(backend);
        let req = request(vec![clip.clone()], VolumeScale::Percent10);

        processor.process(&req).unwrap();
        let first = fs::read_to_string(&clip).unwrap();
        processor.process(&req).unwrap();

        assert_eq!(read_encoded(&clip).source, first);
    }

    #[test]
    fn other_extensions_end_up_as_mp4() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "take.mov", "mov");
        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 1.0)]),
            audio: Some(ramp(1)),
            ..Default::default()
        };
        let report = BatchProcessor::new(backend)
            .process(&request(vec![clip.clone()], VolumeScale::Percent30))
            .unwrap();

        let target = dir.path().join("take.mp4");
        assert_eq!(report.succeeded()[0].final_path, target);
        assert!(!clip.exists());
        assert_eq!(read_encoded(&target).source, "mov");
    }

    #[test]
    fn encode_failure_keeps_original_and_continues() {
        let dir = tempdir().unwrap();
        let a = video(&dir, "a.mp4", "a");
        let b = video(&dir, "b.mp4", "b");
        let c = video(&dir, "c.mp4", "c");

        let backend = ScriptedBackend {
            durations: HashMap::from([(a.clone(), 1.0), (b.clone(), 1.0), (c.clone(), 1.0)]),
            audio: Some(ramp(1)),
            fail_encode: HashSet::from([b.clone()]),
            ..Default::default()
        };
        let logs = tempdir().unwrap();
        let logger = JobLogger::new("batch", logs.path(), LogConfig::default()).unwrap();
        let processor = BatchProcessor::new(backend).with_logger(logger);
        let report = processor
            .process(&request(vec![a.clone(), b.clone(), c.clone()], VolumeScale::Percent50))
            .unwrap();

        assert_eq!(report.summary(), "Combined 2 of 3 videos; 1 failed (see list)");
        let failures = report.failures();
        assert_eq!(failures[0].0.video_path, b);
        assert_eq!(failures[0].1.kind(), "encode");

        assert_eq!(fs::read_to_string(&b).unwrap(), "b");
        assert!(!dir.path().join("b_with_audio_50%.mp4").exists());
        assert_eq!(read_encoded(&a).source, "a");
        assert_eq!(read_encoded(&c).source, "c");

        let log_path = report.log_path().unwrap().to_path_buf();
        drop(processor);
        let log = fs::read_to_string(log_path).unwrap();
        assert!(log.contains("[encode/tail]"));
        assert!(log.contains("Invalid data found"));
        assert!(log.contains("$ scripted-decode /music/loop.mp3"));
        let staging_b = dir.path().join("b_with_audio_50%.mp4");
        assert!(log.contains(&format!("$ scripted-encode {}", staging_b.display())));
    }

    #[test]
    fn existing_staging_file_survives_encode_failure() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "clip.mp4", "original");
        let staging = video(&dir, "clip_with_audio_50%.mp4", "earlier merge");

        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 1.0)]),
            audio: Some(ramp(1)),
            unavailable: HashSet::from([clip.clone()]),
            ..Default::default()
        };
        let report = BatchProcessor::new(backend)
            .process(&request(vec![clip.clone()], VolumeScale::Percent50))
            .unwrap();

        assert_eq!(report.failures()[0].1.kind(), "encode");
        assert_eq!(fs::read_to_string(&staging).unwrap(), "earlier merge");
        assert_eq!(fs::read_to_string(&clip).unwrap(), "original");
    }

    #[test]
    fn existing_staging_file_blocks_the_encode() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "clip.mp4", "original");
        let staging = video(&dir, "clip_with_audio_70%.mp4", "someone else's file");
        let other = video(&dir, "other.mp4", "other");

        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 1.0), (other.clone(), 1.0)]),
            audio: Some(ramp(1)),
            ..Default::default()
        };
        let processor = BatchProcessor::new(backend);
        let report = processor
            .process(&request(vec![clip.clone(), other.clone()], VolumeScale::Percent70))
            .unwrap();

        let (job, err) = report.failures()[0];
        assert_eq!(job.video_path, clip);
        assert_eq!(err.kind(), "encode");
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&staging).unwrap(), "someone else's file");
        assert_eq!(fs::read_to_string(&clip).unwrap(), "original");
        assert_eq!(read_encoded(&other).source, "other");
    }

    #[test]
    fn partial_output_of_a_failed_encode_is_removed() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "clip.mp4", "original");

        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 1.0)]),
            audio: Some(ramp(1)),
            fail_encode: HashSet::from([clip.clone()]),
            ..Default::default()
        };
        BatchProcessor::new(backend)
            .process(&request(vec![clip.clone()], VolumeScale::Percent80))
            .unwrap();

        assert!(!dir.path().join("clip_with_audio_80%.mp4").exists());
        assert_eq!(fs::read_to_string(&clip).unwrap(), "original");
    }

    #[test]
    fn collision_keeps_staging_and_original() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "clip.mov", "mov");
        let existing = video(&dir, "clip.mp4", "unrelated");

        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 1.0)]),
            audio: Some(ramp(1)),
            ..Default::default()
        };
        let report = BatchProcessor::new(backend)
            .process(&request(vec![clip.clone()], VolumeScale::Percent40))
            .unwrap();

        let (_, err) = report.failures()[0];
        assert!(matches!(
            err,
            MergeError::Replace {
                source: ReplaceError::Collision(_),
                ..
            }
        ));
        let staging = dir.path().join("clip_with_audio_40%.mp4");
        assert_eq!(err.kept_output(), Some(staging.as_path()));
        assert!(staging.exists());
        assert_eq!(fs::read_to_string(&clip).unwrap(), "mov");
        assert_eq!(fs::read_to_string(&existing).unwrap(), "unrelated");
    }

    #[test]
    fn unreadable_audio_stops_the_batch() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "clip.mp4", "original");

        let backend = ScriptedBackend {
            durations: HashMap::from([(clip.clone(), 1.0)]),
            audio: None,
            ..Default::default()
        };
        let processor = BatchProcessor::new(backend);
        let err = processor
            .process(&request(vec![clip.clone()], VolumeScale::Percent50))
            .unwrap_err();

        assert_eq!(err.kind(), "decode");
        assert_eq!(err.path(), Path::new("/music/loop.mp3"));
        assert_eq!(fs::read_to_string(&clip).unwrap(), "original");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unprobeable_video_is_a_decode_failure() {
        let dir = tempdir().unwrap();
        let clip = video(&dir, "clip.mp4", "original");
        let zero = video(&dir, "zero.mp4", "empty");

        let backend = ScriptedBackend {
            durations: HashMap::from([(zero.clone(), 0.0)]),
            audio: Some(ramp(1)),
            ..Default::default()
        };
        let report = BatchProcessor::new(backend)
            .process(&request(vec![clip.clone(), zero.clone()], VolumeScale::Percent50))
            .unwrap();

        let failures = report.failures();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|(_, e)| e.kind() == "decode"));
        assert!(failures[1].1.to_string().contains("zero length"));
        assert_eq!(fs::read_to_string(&clip).unwrap(), "original");
    }
}
