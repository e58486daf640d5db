use chrono::{DateTime, Utc};

/// Format timestamp for display relative to `now`.
///
/// Under a minute reads "just now", under an hour "N minutes ago", under a
/// day "N hours ago"; anything older is shown as a calendar date. Timestamps
/// in the future (clock skew) read "just now".
pub fn format_relative(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = (*now - *timestamp).num_seconds();

    if seconds < 60 {
        return "just now".to_string();
    }
    if seconds < 3600 {
        return plural(seconds / 60, "minute");
    }
    if seconds < 86400 {
        return plural(seconds / 3600, "hour");
    }
    timestamp.format("%B %-d, %Y").to_string()
}

/// `format_relative` against the current time
pub fn format_since(timestamp: &DateTime<Utc>) -> String {
    format_relative(timestamp, &Utc::now())
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
