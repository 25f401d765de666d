//! Helpers for presenting data volumes.

const GB_PER_TB: f64 = 1024.0;

/// Format a volume expressed in gigabytes, promoting to TB from 1024 GB.
pub fn format_gigabytes(gigabytes: f64) -> String {
    let value = if gigabytes.is_finite() {
        gigabytes.max(0.0)
    } else {
        0.0
    };

    if value >= GB_PER_TB {
        format!("{:.1} TB", value / GB_PER_TB)
    } else {
        format!("{value:.2} GB")
    }
}

/// Two-decimal figure used in tables where the unit sits in the column header.
pub fn format_fixed2(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "0.00".to_string()
    }
}
