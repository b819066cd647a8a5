use serde_json::Value;

/// Used when a track carries no usable duration (3 minutes).
pub const FALLBACK_DURATION_MS: f64 = 180_000.0;

/// Values at or below this are taken to be seconds rather than milliseconds.
const SECONDS_CEILING: f64 = 10_000.0;

/// Interpret a loosely typed duration as milliseconds.
///
/// Accepts plain numbers (seconds when `<= 10000`, milliseconds otherwise),
/// numeric strings under the same rule, and `"m:ss"` strings. Anything else,
/// or a result that is not strictly positive, gives `fallback_ms`.
pub fn parse_duration_ms(value: Option<&Value>, fallback_ms: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().map(from_number),
        Some(Value::String(s)) => parse_duration_str(s.trim()),
        _ => None,
    };
    match parsed {
        Some(ms) if ms.is_finite() && ms > 0.0 => ms,
        _ => fallback_ms,
    }
}

/// True when a duration field holds something worth parsing, so a secondary
/// field should not be consulted.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(_)) => false,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Encode a duration so [`parse_duration_ms`] reads it back unchanged:
/// whole-millisecond seconds while they fit under the seconds ceiling,
/// plain milliseconds for anything longer.
pub fn duration_value(duration_ms: f64) -> Value {
    let ms = duration_ms.round();
    let secs = ms / 1000.0;
    if secs <= SECONDS_CEILING {
        Value::from(secs)
    } else {
        Value::from(ms)
    }
}

fn from_number(n: f64) -> f64 {
    if n > SECONDS_CEILING {
        n
    } else {
        n * 1000.0
    }
}

fn parse_duration_str(s: &str) -> Option<f64> {
    if let Some((minutes, seconds)) = s.split_once(':') {
        let minutes: u64 = minutes.trim().parse().ok()?;
        let seconds: u64 = seconds.trim().parse().ok()?;
        return Some(((minutes * 60 + seconds) * 1000) as f64);
    }
    s.parse::<f64>().ok().map(from_number)
}
