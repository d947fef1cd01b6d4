//! Human-readable formatting of sizes and timestamps

use chrono::DateTime;

const SUFFIXES: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count using decimal (1000-based) units, e.g. `123.4 KB`.
///
/// Values that need no division are printed as a bare integer, e.g. `999 bytes`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut magnitude = 0;

    while magnitude < SUFFIXES.len() - 1 && value > 1000.0 {
        value /= 1000.0;
        magnitude += 1;
    }

    if magnitude == 0 {
        format!("{bytes} bytes")
    } else {
        format!("{value:.1} {}", SUFFIXES[magnitude])
    }
}

/// Format an epoch timestamp as UTC `YYYY-MM-DD HH:MM:SS`, with microseconds when non-zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_timestamp(seconds: f64) -> String {
    let micros = (seconds * 1_000_000.0).round() as i64;
    let secs = micros.div_euclid(1_000_000);
    let fraction = micros.rem_euclid(1_000_000);

    let Some(datetime) = DateTime::from_timestamp(secs, fraction as u32 * 1000) else {
        return format!("{seconds}");
    };

    let base = datetime.format("%Y-%m-%d %H:%M:%S");
    if fraction == 0 {
        base.to_string()
    } else {
        format!("{base}.{fraction:06}")
    }
}
