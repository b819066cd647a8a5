use serde::{Serialize, Serializer};
use serde_json::Value;

use super::resample::resample;
use crate::error::EnvelopeError;
use crate::timeline::index_to_ms;

/// Floor applied to the peak when normalizing for display, so near-silent
/// tracks are not blown up to full height.
const DISPLAY_PEAK_FLOOR: f32 = 0.1;

/// A track's amplitude contour: one non-negative peak per evenly spaced frame
/// spanning the whole track.
///
/// Frame `i` of an envelope with `len` frames starts at `i / len * duration_ms`.
/// Two envelopes need not share a length, so frame duration is a property of
/// the pair (envelope, duration), never a global constant.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    frames: Vec<f32>,
}

impl Envelope {
    pub fn new(frames: Vec<f32>) -> Result<Self, EnvelopeError> {
        if frames.is_empty() {
            return Err(EnvelopeError::Empty);
        }
        for (index, &value) in frames.iter().enumerate() {
            if !value.is_finite() {
                return Err(EnvelopeError::NotFinite { index });
            }
            if value < 0.0 {
                return Err(EnvelopeError::Negative { index, value });
            }
        }
        Ok(Self { frames })
    }

    /// Parse peak data as stored alongside track metadata: either a JSON array
    /// of numbers or a string holding such an array.
    pub fn from_json(value: &Value) -> Result<Self, EnvelopeError> {
        match value {
            Value::Array(items) => {
                let frames = items
                    .iter()
                    .enumerate()
                    .map(|(index, v)| {
                        v.as_f64()
                            .map(|f| f as f32)
                            .ok_or(EnvelopeError::NotNumeric { index })
                    })
                    .collect::<Result<Vec<f32>, _>>()?;
                Self::new(frames)
            }
            Value::String(s) => {
                let inner: Value = serde_json::from_str(s)
                    .map_err(|e| EnvelopeError::BadString(e.to_string()))?;
                match inner {
                    Value::Array(_) => Self::from_json(&inner),
                    _ => Err(EnvelopeError::BadString("expected an array".into())),
                }
            }
            Value::Null => Err(EnvelopeError::Empty),
            Value::Bool(_) => Err(EnvelopeError::Unsupported("boolean")),
            Value::Number(_) => Err(EnvelopeError::Unsupported("number")),
            Value::Object(_) => Err(EnvelopeError::Unsupported("object")),
        }
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a constructed envelope; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn peak(&self) -> f32 {
        self.frames.iter().copied().fold(0.0f32, f32::max)
    }

    /// Duration covered by a single frame when the envelope spans `duration_ms`.
    pub fn frame_duration_ms(&self, duration_ms: f64) -> f64 {
        duration_ms / self.frames.len() as f64
    }

    /// Start time of frame `idx` (may equal `len` to get the track end).
    pub fn frame_ms(&self, idx: usize, duration_ms: f64) -> f64 {
        index_to_ms(idx, self.frames.len(), duration_ms)
    }

    pub fn resample(&self, target_len: usize) -> Option<Envelope> {
        let frames = resample(&self.frames, target_len);
        if frames.is_empty() {
            None
        } else {
            Some(Self { frames })
        }
    }

    /// Scale so the loudest frame is 1.0, treating any peak below 0.1 as 0.1.
    pub fn normalized_to_peak(&self) -> Envelope {
        let peak = self.peak().max(DISPLAY_PEAK_FLOOR);
        Self {
            frames: self.frames.iter().map(|v| v / peak).collect(),
        }
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.frames.serialize(serializer)
    }
}
