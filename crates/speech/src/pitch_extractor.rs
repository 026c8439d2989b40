//! WAV pitch extraction via framewise autocorrelation

use std::io::Cursor;

use async_trait::async_trait;
use tracing::debug;
use tutor_core::traits::PitchExtractor;
use tutor_core::Result;

use crate::SpeechError;

/// Analysis parameters
#[derive(Debug, Clone)]
pub struct WavPitchExtractorConfig {
    /// Frame length in milliseconds
    pub frame_ms: usize,
    /// Hop between frames in milliseconds
    pub hop_ms: usize,
    /// Lowest pitch considered, Hz
    pub min_hz: f64,
    /// Highest pitch considered, Hz
    pub max_hz: f64,
    /// Frames quieter than this RMS are treated as unvoiced
    pub rms_gate: f64,
    /// Minimum normalized autocorrelation peak for a voiced decision
    pub voicing_threshold: f64,
}

impl Default for WavPitchExtractorConfig {
    fn default() -> Self {
        Self {
            frame_ms: 40,
            hop_ms: 20,
            min_hz: 75.0,
            max_hz: 500.0,
            rms_gate: 0.01,
            voicing_threshold: 0.3,
        }
    }
}

/// Autocorrelation pitch tracker over 16-bit PCM WAV data
#[derive(Debug, Clone, Default)]
pub struct WavPitchExtractor {
    config: WavPitchExtractorConfig,
}

impl WavPitchExtractor {
    pub fn new(config: WavPitchExtractorConfig) -> Self {
        Self { config }
    }

    fn decode_mono(&self, wav: &[u8]) -> std::result::Result<(Vec<f64>, u32), SpeechError> {
        let reader = hound::WavReader::new(Cursor::new(wav))
            .map_err(|e| SpeechError::Decode(format!("invalid wav: {}", e)))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f64> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f64 / scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| SpeechError::Decode(format!("bad sample: {}", e)))?
            }
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| v as f64))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| SpeechError::Decode(format!("bad sample: {}", e)))?,
        };

        let mono: Vec<f64> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect();
        Ok((mono, spec.sample_rate))
    }

    fn frame_pitch(&self, frame: &[f64], sample_rate: u32) -> Option<f64> {
        let rms = (frame.iter().map(|s| s * s).sum::<f64>() / frame.len() as f64).sqrt();
        if rms < self.config.rms_gate {
            return None;
        }

        let min_lag = (sample_rate as f64 / self.config.max_hz).floor() as usize;
        let max_lag = (sample_rate as f64 / self.config.min_hz).ceil() as usize;
        if max_lag >= frame.len() || min_lag < 1 {
            return None;
        }

        let energy: f64 = frame.iter().map(|s| s * s).sum();
        if energy <= 0.0 {
            return None;
        }

        let mut best_lag = 0usize;
        let mut best_corr = 0.0f64;
        for lag in min_lag..=max_lag {
            let corr: f64 = frame[..frame.len() - lag]
                .iter()
                .zip(&frame[lag..])
                .map(|(a, b)| a * b)
                .sum();
            let normalized = corr / energy;
            if normalized > best_corr {
                best_corr = normalized;
                best_lag = lag;
            }
        }

        if best_corr < self.config.voicing_threshold || best_lag == 0 {
            return None;
        }
        Some(sample_rate as f64 / best_lag as f64)
    }

    fn track(&self, samples: &[f64], sample_rate: u32) -> Vec<f64> {
        let frame_len = self.config.frame_ms * sample_rate as usize / 1000;
        let hop = self.config.hop_ms * sample_rate as usize / 1000;
        if frame_len == 0 || hop == 0 || samples.len() < frame_len {
            return Vec::new();
        }

        let mut pitches = Vec::new();
        let mut start = 0usize;
        while start + frame_len <= samples.len() {
            if let Some(hz) = self.frame_pitch(&samples[start..start + frame_len], sample_rate) {
                pitches.push(hz);
            }
            start += hop;
        }
        pitches
    }
}

#[async_trait]
impl PitchExtractor for WavPitchExtractor {
    async fn extract(&self, wav: &[u8]) -> Result<Vec<f64>> {
        let (samples, sample_rate) = self.decode_mono(wav)?;
        let pitches = self.track(&samples, sample_rate);
        debug!(
            voiced_frames = pitches.len(),
            sample_rate, "pitch track complete"
        );
        Ok(pitches)
    }

    fn name(&self) -> &str {
        "wav-autocorrelation"
    }
}
