use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("expected {expected} ':'-separated components in {input:?}")]
    ComponentCount { input: String, expected: &'static str },
    #[error("non-numeric component {part:?} in {input:?}")]
    NotNumeric { input: String, part: String },
    #[error("{input:?} is too large to count in seconds")]
    Overflow { input: String },
}

/// Parses a `"M:SS"` pace into seconds per mile.
///
/// Only the first two components are read; anything after them is ignored.
pub fn pace_seconds_from_str(pace: &str) -> Result<u32, TimeParseError> {
    let parts: Vec<&str> = pace.trim().split(':').take(2).collect();
    if parts.len() < 2 {
        return Err(TimeParseError::ComponentCount {
            input: pace.to_string(),
            expected: "at least 2",
        });
    }
    let parts = parse_components(pace, &parts)?;
    to_seconds(pace, &[(parts[0], 60), (parts[1], 1)])
}

/// Formats seconds per mile as `"M:SS"`.
///
/// Seconds are rounded but not carried into minutes, so `539.6` renders as `"8:60"`.
pub fn pace_string_from_seconds(seconds: f64) -> String {
    let min = (seconds / 60.0).floor();
    let sec = (seconds % 60.0).round();
    format!("{}:{:02}", min as i64, sec as i64)
}

/// Parses `"H:MM:SS"` or `"MM:SS"` into total seconds.
pub fn duration_seconds_from_str(time: &str) -> Result<u32, TimeParseError> {
    let parts: Vec<&str> = time.trim().split(':').collect();
    let parts = parse_components(time, &parts)?;
    match parts.as_slice() {
        [h, m, s] => to_seconds(time, &[(*h, 3600), (*m, 60), (*s, 1)]),
        [m, s] => to_seconds(time, &[(*m, 60), (*s, 1)]),
        _ => Err(TimeParseError::ComponentCount {
            input: time.to_string(),
            expected: "2 or 3",
        }),
    }
}

/// Formats seconds as `"H:MM:SS"`, dropping the hour when it is zero.
pub fn duration_string_from_seconds(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Short `"{h}h {m}m"` label for training totals.
pub fn duration_label_from_seconds(seconds: u64) -> String {
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

fn parse_components(input: &str, parts: &[&str]) -> Result<Vec<u32>, TimeParseError> {
    parts
        .iter()
        .map(|part| {
            part.trim().parse::<u32>().map_err(|_| TimeParseError::NotNumeric {
                input: input.to_string(),
                part: part.to_string(),
            })
        })
        .collect()
}

/// Sums `value * unit` pairs, failing instead of wrapping past `u32::MAX`.
fn to_seconds(input: &str, terms: &[(u32, u32)]) -> Result<u32, TimeParseError> {
    terms
        .iter()
        .try_fold(0u32, |total, (value, unit)| {
            value.checked_mul(*unit).and_then(|term| total.checked_add(term))
        })
        .ok_or_else(|| TimeParseError::Overflow {
            input: input.to_string(),
        })
}
