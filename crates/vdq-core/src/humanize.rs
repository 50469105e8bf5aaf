//! Human-readable renderings for the status view.

/// Decimal magnitude steps; anything past zettabyte scale gets `Yi`.
const SIZE_UNITS: [&str; 8] = ["B", "K", "M", "G", "T", "P", "E", "Z"];

/// Renders an elapsed duration (seconds) as "just now", "5 seconds ago", ...
///
/// Negative input (clock skew between processes) counts as zero.
pub fn relative_time(elapsed_secs: i64) -> String {
    match elapsed_secs {
        e if e < 3 => "just now".to_string(),
        e if e < 60 => format!("{e} seconds ago"),
        e if e < 120 => "1 minute ago".to_string(),
        e => format!("{} minutes ago", e / 60),
    }
}

/// Renders a byte count with one decimal and a 1000-based suffix, e.g. `12.3M`.
pub fn format_size(bytes: u64) -> String {
    format_magnitude(bytes as f64)
}

fn format_magnitude(mut num: f64) -> String {
    for unit in SIZE_UNITS {
        if num.abs() < 1000.0 {
            return format!("{num:.1}{unit}");
        }
        num /= 1000.0;
    }
    format!("{num:.1}Yi")
}
