//! Decoded audio held in memory.
//!
//! Every transform borrows the track and returns a new one, so a decoded
//! source can be shared by all jobs of a batch without being altered.

use std::io::{self, Write};

/// Samples converted per write when streaming PCM.
const WRITE_CHUNK_SAMPLES: usize = 16 * 1024;

/// Interleaved 32-bit float PCM with a known layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioTrack {
    /// Create a track from interleaved samples.
    ///
    /// A trailing partial frame is dropped. `sample_rate` and `channels`
    /// are clamped to at least 1.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self {
            samples,
            sample_rate: sample_rate.max(1),
            channels,
        }
    }

    /// Build a track from raw little-endian `f32` bytes (FFmpeg `f32le`).
    pub fn from_le_bytes(bytes: &[u8], sample_rate: u32, channels: u16) -> Self {
        let samples = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Self::new(samples, sample_rate, channels)
    }

    /// Stream the samples as little-endian `f32` bytes.
    ///
    /// Converts a bounded chunk at a time, so no byte copy of the whole
    /// track is held.
    pub fn write_le<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(WRITE_CHUNK_SAMPLES * 4);
        for chunk in self.samples.chunks(WRITE_CHUNK_SAMPLES) {
            bytes.clear();
            for sample in chunk {
                bytes.extend_from_slice(&sample.to_le_bytes());
            }
            writer.write_all(&bytes)?;
        }
        writer.flush()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Frames needed to cover `secs`, rounded up so the result is never short.
    pub fn frames_for(&self, secs: f64) -> usize {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        (secs * self.sample_rate as f64).ceil() as usize
    }

    /// Copies of this track needed to reach `target_secs`.
    ///
    /// `floor(target / duration) + 1` when the target is longer than the
    /// track, otherwise 1.
    pub fn repetitions_for(&self, target_secs: f64) -> usize {
        let duration = self.duration_secs();
        if self.is_empty() || target_secs <= duration {
            return 1;
        }
        let reps = (target_secs / duration).floor() as usize + 1;
        // Guard against rounding leaving the concatenation a frame short.
        let needed = self.frames_for(target_secs).div_ceil(self.frames());
        reps.max(needed)
    }

    /// Concatenate copies end to end until `target_secs` is reached.
    pub fn loop_extend(&self, target_secs: f64) -> AudioTrack {
        let reps = self.repetitions_for(target_secs);
        Self {
            samples: self.samples.repeat(reps),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Keep only `[0, secs)`.
    pub fn trim_to(&self, secs: f64) -> AudioTrack {
        let frames = self.frames_for(secs).min(self.frames());
        Self {
            samples: self.samples[..frames * self.channels as usize].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Multiply every sample by `factor`.
    pub fn scaled(&self, factor: f32) -> AudioTrack {
        Self {
            samples: self.samples.iter().map(|s| s * factor).collect(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Loop-extend and trim to exactly `target_secs`.
    ///
    /// Returns the fitted track and the number of repetitions used.
    pub fn fit_to(&self, target_secs: f64) -> (AudioTrack, usize) {
        self.fit_and_scale(target_secs, 1.0)
    }

    /// `fit_to` followed by `scaled`, built in a single allocation of the
    /// output length.
    pub fn fit_and_scale(&self, target_secs: f64, factor: f32) -> (AudioTrack, usize) {
        let reps = self.repetitions_for(target_secs);
        let frames = if reps > 1 {
            self.frames_for(target_secs)
        } else {
            self.frames_for(target_secs).min(self.frames())
        };
        let len = frames * self.channels as usize;

        let mut samples = Vec::with_capacity(len);
        samples.extend(self.samples.iter().cycle().take(len).map(|s| s * factor));

        let track = Self {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        };
        (track, reps)
    }
}
