use serde::{Deserialize, Serialize};

use super::cancel::Cancellation;
use crate::error::Cancelled;

/// How many window positions are scanned between cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 64;

/// Per-frame distance between two normalized slices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMetric {
    /// Mean squared difference (penalizes large deviations)
    #[default]
    Squared,
    /// Mean absolute difference
    Absolute,
}

impl ErrorMetric {
    #[inline]
    fn distance(self, a: f32, b: f32) -> f32 {
        let d = a - b;
        match self {
            ErrorMetric::Squared => d * d,
            ErrorMetric::Absolute => d.abs(),
        }
    }
}

/// Best window found in one candidate envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowScore {
    pub start: usize,
    pub score: f32,
}

/// Rescale a slice into 0.0-1.0 using its own min and max, so only the shape
/// of the contour is compared. A flat slice becomes all zeros.
pub fn normalize_slice(slice: &[f32]) -> Vec<f32> {
    let (min, max) = min_max(slice);
    let range = max - min;
    slice.iter().map(|&v| unit(v, min, range)).collect()
}

/// Map a mean error onto (0, 1]. Zero error scores exactly 1.0 and the score
/// never increases as the error grows.
#[inline]
pub fn score_from_error(mean_error: f32) -> f32 {
    1.0 / (1.0 + mean_error)
}

/// Score the candidate window starting at `candidate_start` against a raw
/// reference slice. `None` when the window would run past the candidate.
pub fn score_window(
    reference_slice: &[f32],
    candidate: &[f32],
    candidate_start: usize,
    metric: ErrorMetric,
) -> Option<f32> {
    WindowScorer::new(reference_slice, metric).score_at(candidate, candidate_start)
}

/// Slides a fixed reference slice across candidate envelopes.
///
/// The reference is normalized once at construction; each candidate window
/// is normalized on the fly without allocating.
#[derive(Clone, Debug)]
pub struct WindowScorer {
    reference: Vec<f32>,
    metric: ErrorMetric,
}

impl WindowScorer {
    pub fn new(reference_slice: &[f32], metric: ErrorMetric) -> Self {
        Self {
            reference: normalize_slice(reference_slice),
            metric,
        }
    }

    pub fn window_len(&self) -> usize {
        self.reference.len()
    }

    pub fn score_at(&self, candidate: &[f32], start: usize) -> Option<f32> {
        let len = self.reference.len();
        if len == 0 {
            return None;
        }
        let end = start.checked_add(len)?;
        let window = candidate.get(start..end)?;

        let (min, max) = min_max(window);
        let range = max - min;
        let sum: f32 = self
            .reference
            .iter()
            .zip(window)
            .map(|(&r, &c)| self.metric.distance(r, unit(c, min, range)))
            .sum();
        Some(score_from_error(sum / len as f32))
    }

    /// Every visited start index with its score, stepping by `step`.
    /// Yields nothing when `step` is zero or the candidate is shorter than the window.
    pub fn scan<'a>(
        &'a self,
        candidate: &'a [f32],
        step: usize,
    ) -> impl Iterator<Item = WindowScore> + 'a {
        let len = self.reference.len();
        let last = if step == 0 || len == 0 || candidate.len() < len {
            None
        } else {
            Some(candidate.len() - len)
        };
        last.into_iter()
            .flat_map(move |last| (0..=last).step_by(step.max(1)))
            .filter_map(move |start| {
                self.score_at(candidate, start)
                    .map(|score| WindowScore { start, score })
            })
    }

    /// Highest-scoring window; the earliest start wins on equal scores.
    pub fn best(&self, candidate: &[f32], step: usize) -> Option<WindowScore> {
        self.scan(candidate, step).fold(None, keep_best)
    }

    /// Like [`best`](Self::best) but polls `cancel` while scanning.
    pub fn best_with<C: Cancellation + ?Sized>(
        &self,
        candidate: &[f32],
        step: usize,
        cancel: &C,
    ) -> Result<Option<WindowScore>, Cancelled> {
        let mut best = None;
        for (n, window) in self.scan(candidate, step).enumerate() {
            if n % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(Cancelled);
            }
            best = keep_best(best, window);
        }
        Ok(best)
    }
}

fn keep_best(best: Option<WindowScore>, window: WindowScore) -> Option<WindowScore> {
    match best {
        Some(b) if b.score >= window.score => Some(b),
        _ => Some(window),
    }
}

#[inline]
fn unit(value: f32, min: f32, range: f32) -> f32 {
    if range > 0.0 {
        (value - min) / range
    } else {
        0.0
    }
}

fn min_max(slice: &[f32]) -> (f32, f32) {
    slice
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
