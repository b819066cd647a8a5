use serde::Serialize;

use super::cancel::{Cancellation, NeverCancel};
use super::score::{ErrorMetric, WindowScorer};
use crate::envelope::Envelope;
use crate::error::Cancelled;

/// One track that may contain a section resembling the reference window.
/// Owned by the caller and only borrowed for the duration of a search.
#[derive(Clone, Debug)]
pub struct CandidateTrack {
    pub id: String,
    pub name: String,
    pub envelope: Envelope,
    pub duration_ms: f64,
}

/// Half-open frame range `[start, end)` in the reference track's own envelope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReferenceWindow {
    pub start: usize,
    pub end: usize,
}

impl ReferenceWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Clamp both bounds to `[0, env_len - 1]`.
    pub fn clamped(self, env_len: usize) -> Self {
        let last = env_len.saturating_sub(1);
        Self {
            start: self.start.min(last),
            end: self.end.min(last),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchParams {
    /// Index increment between compared windows; 1 is exhaustive.
    pub step_size: usize,
    pub metric: ErrorMetric,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            step_size: 5,
            metric: ErrorMetric::default(),
        }
    }
}

/// Best-matching section of one candidate, in that candidate's own timeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub track_id: String,
    pub score: f32,
    pub match_start_idx: usize,
    pub match_end_idx: usize,
    pub match_start_ms: f64,
    pub match_end_ms: f64,
}

/// Find the section of every candidate that best resembles
/// `reference[ref_start..ref_end]`, ranked by descending score.
///
/// Degenerate input (zero-width window, zero step, no candidates) yields an
/// empty vector. Candidates are not filtered by id: leaving the reference
/// track out of `candidates` is up to the caller.
pub fn find_similar_sections(
    reference: &Envelope,
    ref_start: usize,
    ref_end: usize,
    candidates: &[CandidateTrack],
    step_size: usize,
) -> Vec<MatchResult> {
    let params = SearchParams {
        step_size,
        ..SearchParams::default()
    };
    match find_similar_sections_with(
        reference,
        ReferenceWindow::new(ref_start, ref_end),
        candidates,
        &params,
        &NeverCancel,
    ) {
        Ok(results) => results,
        Err(Cancelled) => Vec::new(),
    }
}

/// Cancellable form of [`find_similar_sections`]. The token is polled before
/// each candidate and periodically while scanning.
pub fn find_similar_sections_with<C: Cancellation + ?Sized>(
    reference: &Envelope,
    window: ReferenceWindow,
    candidates: &[CandidateTrack],
    params: &SearchParams,
    cancel: &C,
) -> Result<Vec<MatchResult>, Cancelled> {
    let window = window.clamped(reference.len());
    if window.is_empty() || params.step_size == 0 || candidates.is_empty() {
        return Ok(Vec::new());
    }

    let slice = &reference.frames()[window.start..window.end];
    let scorer = WindowScorer::new(slice, params.metric);
    let slice_len = scorer.window_len();

    let mut results = Vec::with_capacity(candidates.len());
    let mut skipped = 0usize;

    for candidate in candidates {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        let frames = candidate.envelope.frames();
        if frames.len() < slice_len {
            skipped += 1;
            continue;
        }

        let Some(best) = scorer.best_with(frames, params.step_size, cancel)? else {
            skipped += 1;
            continue;
        };

        let match_end_idx = best.start + slice_len;
        results.push(MatchResult {
            track_id: candidate.id.clone(),
            score: best.score,
            match_start_idx: best.start,
            match_end_idx,
            match_start_ms: candidate.envelope.frame_ms(best.start, candidate.duration_ms),
            match_end_ms: candidate.envelope.frame_ms(match_end_idx, candidate.duration_ms),
        });
    }

    // Stable: equal scores keep candidate order
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    log::debug!(
        "Similarity search: window {}..{} ({} frames), step {}, {} matches, {} skipped",
        window.start,
        window.end,
        slice_len,
        params.step_size,
        results.len(),
        skipped
    );

    Ok(results)
}
