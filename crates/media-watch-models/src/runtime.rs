use std::fmt;

/// Running time parsed out of a provider's free-form duration string.
///
/// Providers hand out strings like "142 min", "45m" or "N/A"; only the leading
/// integer (in minutes) is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Seconds(u32),
    /// The duration string had no leading number
    NotAvailable,
}

impl Runtime {
    pub fn as_seconds(&self) -> Option<f64> {
        match self {
            Runtime::Seconds(secs) => Some(f64::from(*secs)),
            Runtime::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Runtime::Seconds(_))
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Runtime::Seconds(secs) => write!(f, "{}", secs),
            Runtime::NotAvailable => f.write_str("N/A"),
        }
    }
}

/// Leading integer of `s`, after optional whitespace and sign.
fn leading_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Convert a "N min" duration into seconds.
pub fn convert_duration_to_seconds(duration: &str) -> Runtime {
    match leading_integer(duration) {
        Some(minutes) if minutes >= 0 => u32::try_from(minutes)
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Runtime::Seconds)
            .unwrap_or(Runtime::NotAvailable),
        _ => Runtime::NotAvailable,
    }
}

/// Format a "N min" duration for display: "2h 22m", "45 mins", or "N/A".
pub fn convert_minutes_to_hours(duration: &str) -> String {
    let minutes = match leading_integer(duration) {
        Some(minutes) if minutes >= 0 => minutes,
        _ => return "N/A".to_string(),
    };
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        format!("{} mins", mins)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Player clock text: `H:MM:SS` once past the hour, `MM:SS` before.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
