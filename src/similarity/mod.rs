pub mod cancel;
pub mod score;
pub mod search;

pub use cancel::{Cancellation, Generation, NeverCancel, Ticket};
pub use score::{score_window, ErrorMetric, WindowScore, WindowScorer};
pub use search::{
    find_similar_sections, find_similar_sections_with, CandidateTrack, MatchResult,
    ReferenceWindow, SearchParams,
};
