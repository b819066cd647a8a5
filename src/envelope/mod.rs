pub mod model;
pub mod resample;

pub use model::Envelope;
pub use resample::resample;
