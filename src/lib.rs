//! Acoustic similarity search over track amplitude envelopes.
//!
//! Given a window inside one track's peak envelope, [`find_similar_sections`]
//! slides that window across every candidate track, keeps the best-matching
//! section per track and ranks the tracks by score. Envelopes are compared by
//! shape only: each window is rescaled to its own range before scoring, so a
//! quiet and a loud rendition of the same pattern match perfectly.
//!
//! ```
//! use contour::{find_similar_sections, CandidateTrack, Envelope};
//!
//! let reference = Envelope::new(vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]).unwrap();
//! let candidates = vec![CandidateTrack {
//!     id: "a".into(),
//!     name: "Track A".into(),
//!     envelope: reference.clone(),
//!     duration_ms: 8000.0,
//! }];
//!
//! let matches = find_similar_sections(&reference, 2, 5, &candidates, 1);
//! assert_eq!(matches[0].score, 1.0);
//! assert_eq!(matches[0].match_start_ms, 0.0);
//! ```
//!
//! The engine performs no I/O. Catalog loading, duration parsing and envelope
//! extraction from audio files live in [`catalog`] and [`audio`].

pub mod audio;
pub mod catalog;
pub mod config;
pub mod envelope;
pub mod error;
pub mod similarity;
pub mod timeline;

pub use envelope::{resample, Envelope};
pub use error::{Cancelled, CatalogError, EnvelopeError};
pub use similarity::{
    find_similar_sections, find_similar_sections_with, CandidateTrack, ErrorMetric, Generation,
    MatchResult, ReferenceWindow, SearchParams,
};
