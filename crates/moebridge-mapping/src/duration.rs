use serde_json::Value;

/// Encodes whole seconds as an ISO-8601 time duration, e.g. `PT1H02M05.00S`.
///
/// Zero hours and zero minutes are left out; seconds are always written.
pub fn encode_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes:02}M"));
    }
    out.push_str(&format!("{seconds:02}.00S"));
    out
}

/// Reads a seconds count from an extension value.
///
/// Integers, floats (truncated) and numeric strings are accepted; anything
/// else, including negative numbers, counts as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn seconds_from_value(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f > 0.0)
                        .map(|f| f as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}
