//! WAV file frame source for file and pipe input.

use crate::audio::frame::AudioFrame;
use crate::defaults;
use crate::error::{Result, ScribeError};
use std::io::Read;

/// Audio source that replays WAV file data as capture frames.
///
/// Frames are emitted at the file's native sample rate and channel count;
/// rate conversion and downmixing are the converter's job.
pub struct WavFrameSource {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    position: usize,
    sequence: u64,
    frame_samples: usize,
}

impl WavFrameSource {
    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav_reader = hound::WavReader::new(reader).map_err(|e| ScribeError::AudioDecode {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

        let spec = wav_reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => wav_reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<_>, _>>(),
            hound::SampleFormat::Float => wav_reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>(),
        }
        .map_err(|e| ScribeError::AudioDecode {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            position: 0,
            sequence: 0,
            frame_samples: defaults::SOURCE_FRAME_SAMPLES,
        })
    }

    /// Create from stdin.
    pub fn from_stdin() -> Result<Self> {
        use std::io::Cursor;

        // Read all data from stdin into memory first (StdinLock is not Send)
        let mut buffer = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .map_err(|e| ScribeError::AudioDecode {
                message: format!("Failed to read from stdin: {}", e),
            })?;

        Self::from_reader(Box::new(Cursor::new(buffer)))
    }

    /// Source sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Source channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total duration of the file in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let per_channel = self.samples.len() as u64 / self.channels as u64;
        per_channel * 1000 / self.sample_rate as u64
    }

    /// Reads the next frame, or `None` when the file is exhausted.
    pub fn read_frame(&mut self) -> Option<AudioFrame> {
        if self.position >= self.samples.len() {
            return None;
        }

        let block = self.frame_samples * self.channels as usize;
        let end = std::cmp::min(self.position + block, self.samples.len());
        let samples = self.samples[self.position..end].to_vec();
        self.position = end;

        let frame = AudioFrame::new(self.sequence, samples, self.sample_rate, self.channels);
        self.sequence += 1;
        Some(frame)
    }
}
