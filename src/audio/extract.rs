use anyhow::{Context, Result};
use std::path::Path;

use super::decode::decode_mono;
use crate::envelope::{resample, Envelope};

/// Envelope resolution stored for every indexed track.
pub const DEFAULT_POINTS: usize = 1000;

pub struct TrackAnalysis {
    pub envelope: Envelope,
    pub duration_ms: f64,
}

/// Peak absolute amplitude per frame, `points` frames spanning the whole
/// signal, scaled so the loudest frame is 1.0. Silence stays at zero.
///
/// Frames use the same bucket rule as display resampling, so frame `i`
/// always starts at `i / points` of the track.
pub fn peak_envelope(samples: &[f32], points: usize) -> Vec<f32> {
    if points == 0 {
        return Vec::new();
    }
    if samples.is_empty() {
        return vec![0.0; points];
    }

    let magnitudes: Vec<f32> = samples
        .iter()
        .map(|s| if s.is_finite() { s.abs() } else { 0.0 })
        .collect();
    let mut peaks = resample(&magnitudes, points);

    let max = peaks.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for p in &mut peaks {
            *p /= max;
        }
    }
    peaks
}

pub fn analyze_file(path: &Path, points: usize) -> Result<TrackAnalysis> {
    let audio = decode_mono(path)?;
    if audio.samples.is_empty() {
        anyhow::bail!("No audio samples decoded from {}", path.display());
    }
    let envelope = Envelope::new(peak_envelope(&audio.samples, points))
        .with_context(|| format!("Failed to build envelope for {}", path.display()))?;

    Ok(TrackAnalysis {
        envelope,
        duration_ms: audio.duration_ms(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_peaks() {
        let samples = [0.1, -0.5, 0.2, 0.25, -0.05, 0.0];
        assert_eq!(peak_envelope(&samples, 3), vec![1.0, 0.5, 0.1]);
    }

    #[test]
    fn covers_whole_signal() {
        // 10 samples into 4 frames: the loud tail must land in the last frame
        let mut samples = vec![0.1f32; 10];
        samples[9] = -0.8;
        let env = peak_envelope(&samples, 4);
        assert_eq!(env.len(), 4);
        assert_eq!(env[3], 1.0);
        assert!(env[..3].iter().all(|&v| v < 1.0));
    }

    #[test]
    fn silence_and_short_input() {
        assert_eq!(peak_envelope(&[0.0; 50], 5), vec![0.0; 5]);
        assert_eq!(peak_envelope(&[], 3), vec![0.0; 3]);
        assert!(peak_envelope(&[0.3], 0).is_empty());
        // Fewer samples than points repeats frames
        assert_eq!(peak_envelope(&[0.5, 1.0], 4), vec![0.5, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn non_finite_samples_ignored() {
        let env = peak_envelope(&[f32::NAN, 0.5, f32::INFINITY, 0.25], 2);
        assert_eq!(env, vec![1.0, 0.5]);
    }
}
