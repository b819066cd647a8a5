use contour::audio::extract::peak_envelope;
use contour::catalog::Catalog;
use contour::similarity::{find_similar_sections_with, Generation, NeverCancel, WindowScorer};
use contour::timeline::window_from_ms;
use contour::{
    find_similar_sections, resample, CandidateTrack, Cancelled, Envelope, ErrorMetric,
    ReferenceWindow, SearchParams,
};
use serde_json::json;

fn candidate(id: &str, frames: Vec<f32>, duration_ms: f64) -> CandidateTrack {
    CandidateTrack {
        id: id.to_string(),
        name: id.to_string(),
        envelope: Envelope::new(frames).unwrap(),
        duration_ms,
    }
}

/// A synthetic "beat" pattern: a loud hit every `period` frames.
fn pulse(len: usize, period: usize, offset: usize, gain: f32) -> Vec<f32> {
    (0..len)
        .map(|i| if (i + period - offset % period) % period == 0 { gain } else { 0.1 * gain })
        .collect()
}

#[test]
fn alternating_example_matches_exactly() {
    let reference = Envelope::new(vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]).unwrap();
    let candidates = vec![candidate("a", reference.frames().to_vec(), 8000.0)];

    let results = find_similar_sections(&reference, 2, 5, &candidates, 1);
    assert_eq!(results.len(), 1);
    let m = &results[0];
    assert_eq!(m.score, 1.0);
    let frames = candidates[0].envelope.frames();
    assert_eq!(&frames[m.match_start_idx..m.match_end_idx], &[0.0, 1.0, 0.0]);
    assert_eq!(m.match_start_ms, m.match_start_idx as f64 / 8.0 * 8000.0);
    assert_eq!(m.match_end_ms, m.match_end_idx as f64 / 8.0 * 8000.0);
}

#[test]
fn finds_shifted_pattern_at_different_resolution() {
    // Reference at 200 frames, candidates at 400 frames over the same duration:
    // the caller brings candidates into the reference's frame rate first.
    let reference = Envelope::new(pulse(200, 10, 0, 0.8)).unwrap();
    let hit = pulse(400, 20, 6, 0.3);
    let flat = vec![0.4; 400];

    let candidates = vec![
        candidate("flat", resample(&flat, 200), 60_000.0),
        candidate("quiet-pulse", resample(&hit, 200), 60_000.0),
    ];
    let results = find_similar_sections(&reference, 20, 60, &candidates, 1);

    assert_eq!(results[0].track_id, "quiet-pulse");
    assert_eq!(results[0].score, 1.0);
    assert!(results[0].score > results[1].score);
}

#[test]
fn ranking_is_sorted_and_skips_short_tracks() {
    let reference = Envelope::new(pulse(100, 8, 0, 1.0)).unwrap();
    let candidates = vec![
        candidate("noise", (0..100).map(|i| ((i * 7919) % 13) as f32 / 13.0).collect(), 30_000.0),
        candidate("tiny", vec![1.0, 0.0, 1.0], 1_000.0),
        candidate("pulse", pulse(120, 8, 3, 0.5), 36_000.0),
        candidate("drift", pulse(100, 9, 0, 1.0), 30_000.0),
    ];

    let results = find_similar_sections(&reference, 10, 40, &candidates, 1);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|m| m.track_id != "tiny"));
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(results[0].track_id, "pulse");
    for m in &results {
        assert!(m.score > 0.0 && m.score <= 1.0);
        assert_eq!(m.match_end_idx - m.match_start_idx, 30);
    }
}

#[test]
fn coarser_steps_never_beat_exhaustive_search() {
    let reference = Envelope::new(pulse(300, 12, 0, 1.0)).unwrap();
    let candidates = vec![
        candidate("a", pulse(500, 12, 7, 0.6), 90_000.0),
        candidate("b", pulse(500, 11, 2, 0.9), 90_000.0),
    ];
    let exhaustive = find_similar_sections(&reference, 30, 90, &candidates, 1);
    for step in [2, 5, 13] {
        let coarse = find_similar_sections(&reference, 30, 90, &candidates, step);
        for m in &coarse {
            let best = exhaustive.iter().find(|e| e.track_id == m.track_id).unwrap();
            assert!(m.score <= best.score);
            assert_eq!(m.match_start_idx % step, 0);
        }
    }
}

#[test]
fn catalog_to_ranked_matches() {
    let catalog: Catalog = serde_json::from_value(json!({
        "tracks": [
            { "id": "ref", "title": "Reference", "duration": 16, "waveform": pulse(16, 4, 0, 1.0) },
            { "id": "same", "title": "Same", "duration": "0:16", "waveform": pulse(16, 4, 1, 0.5) },
            { "id": "string", "title": "Stringly", "duration": 32000,
              "waveform": serde_json::to_string(&pulse(32, 4, 2, 1.0)).unwrap() },
            { "id": "empty", "title": "No data" }
        ]
    }))
    .unwrap();

    let reference = catalog.track("ref", 180_000.0).unwrap();
    let candidates = catalog.candidates_for("ref", 180_000.0);
    assert_eq!(candidates.len(), 2);

    let window = window_from_ms(0.0, 8_000.0, reference.duration_ms, reference.envelope.len());
    assert_eq!(window, ReferenceWindow::new(0, 8));

    let params = SearchParams { step_size: 1, metric: ErrorMetric::Squared };
    let results =
        find_similar_sections_with(&reference.envelope, window, &candidates, &params, &NeverCancel)
            .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|m| m.score == 1.0));
    // Equal scores keep catalog order
    assert_eq!(results[0].track_id, "same");
    assert_eq!(results[0].match_start_idx, 1);
    assert_eq!(results[0].match_start_ms, 1_000.0);
    assert_eq!(results[1].track_id, "string");
    assert_eq!(results[1].match_start_idx, 2);
    assert_eq!(results[1].match_start_ms, 2_000.0);
    assert_eq!(results[1].match_end_ms, 10_000.0);
}

#[test]
fn extracted_envelopes_are_searchable() {
    // Two "recordings" of the same rhythm at different levels and sample counts
    let render = |samples: usize, gain: f32| -> Vec<f32> {
        (0..samples)
            .map(|i| {
                let beat = (i * 16 / samples) % 4 == 0;
                let s = if i % 2 == 0 { 1.0 } else { -1.0 };
                s * gain * if beat { 1.0 } else { 0.2 }
            })
            .collect()
    };
    let reference = Envelope::new(peak_envelope(&render(16_000, 0.9), 64)).unwrap();
    let other = peak_envelope(&render(48_000, 0.3), 64);
    let candidates = vec![candidate("other", other, 3_000.0)];

    let results = find_similar_sections(&reference, 0, 32, &candidates, 1);
    assert_eq!(results[0].score, 1.0);
    assert_eq!(results[0].match_start_idx % 16, 0);
}

#[test]
fn superseded_generation_abandons_search() {
    let reference = Envelope::new(pulse(100, 5, 0, 1.0)).unwrap();
    let candidates = vec![candidate("a", pulse(1000, 5, 1, 1.0), 300_000.0)];
    let params = SearchParams::default();
    let generation = Generation::new();

    let first = generation.issue();
    let second = generation.issue();

    let stale = find_similar_sections_with(
        &reference,
        ReferenceWindow::new(0, 50),
        &candidates,
        &params,
        &first,
    );
    assert_eq!(stale, Err(Cancelled));

    let fresh = find_similar_sections_with(
        &reference,
        ReferenceWindow::new(0, 50),
        &candidates,
        &params,
        &second,
    )
    .unwrap();
    assert_eq!(fresh.len(), 1);
}

#[test]
fn concurrent_calls_are_independent() {
    let reference = Envelope::new(pulse(200, 10, 0, 1.0)).unwrap();
    let candidates: Vec<CandidateTrack> = (0..8)
        .map(|n| candidate(&format!("t{}", n), pulse(300, 10, n, 0.5), 90_000.0))
        .collect();
    let expected = find_similar_sections(&reference, 0, 40, &candidates, 1);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| find_similar_sections(&reference, 0, 40, &candidates, 1)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn exhaustive_step_over_large_catalog() {
    let reference = Envelope::new(pulse(1000, 25, 0, 1.0)).unwrap();
    let candidates: Vec<CandidateTrack> = (0..500)
        .map(|n| {
            let gain = 0.5 + (n % 5) as f32 * 0.1;
            candidate(&format!("t{}", n), pulse(1000, 20 + n % 11, n % 7, gain), 240_000.0)
        })
        .collect();

    // Work grows with candidate length / step: 951 windows per track at step 1
    let scorer = WindowScorer::new(&reference.frames()[100..150], ErrorMetric::Squared);
    let windows = |step: usize| -> usize {
        candidates
            .iter()
            .map(|c| scorer.scan(c.envelope.frames(), step).count())
            .sum()
    };
    assert_eq!(windows(1), 500 * 951);
    assert_eq!(windows(5), 500 * 191);
    assert_eq!(windows(25), 500 * 39);

    let exhaustive = find_similar_sections(&reference, 100, 150, &candidates, 1);
    let coarse = find_similar_sections(&reference, 100, 150, &candidates, 25);
    assert_eq!(exhaustive.len(), 500);
    assert_eq!(coarse.len(), 500);
    for m in &coarse {
        let best = exhaustive.iter().find(|e| e.track_id == m.track_id).unwrap();
        assert!(m.score <= best.score);
    }
    // Period 25 lines up exactly somewhere in the track with the same rhythm
    assert_eq!(exhaustive[0].score, 1.0);
}
