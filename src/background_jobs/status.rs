use crate::clock::UnixTimestamp;
use serde::Serialize;

/// Read-only view of one tier for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierStatus {
    pub key: &'static str,
    pub name: &'static str,
    /// Last successful completion; 0 when the tier never completed.
    pub last_run_at: UnixTimestamp,
    pub contents: Vec<&'static str>,
    pub seconds_since_last_run: i64,
    pub human_readable_age: String,
}

impl TierStatus {
    pub fn new(
        key: &'static str,
        name: &'static str,
        contents: Vec<&'static str>,
        last_run_at: UnixTimestamp,
        now: UnixTimestamp,
    ) -> Self {
        let seconds_since_last_run = now - last_run_at;
        let human_readable_age = if last_run_at == 0 {
            "never".to_string()
        } else {
            time_difference_text(seconds_since_last_run)
        };
        Self {
            key,
            name,
            last_run_at,
            contents,
            seconds_since_last_run,
            human_readable_age,
        }
    }
}

/// "N seconds", "N minutes", "N hours" or "N days", using the largest unit
/// that fits. Negative differences (clock skew) read as 0 seconds.
pub fn time_difference_text(seconds: i64) -> String {
    const UNITS: [(i64, &str); 4] = [(86_400, "day"), (3_600, "hour"), (60, "minute"), (1, "second")];

    let seconds = seconds.max(0);
    let (size, unit) = UNITS
        .iter()
        .copied()
        .find(|(size, _)| seconds >= *size)
        .unwrap_or((1, "second"));
    let count = seconds / size;
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
