//! Human-readable byte counts.

const UNIT: u64 = 1024;
const PREFIXES: &[u8] = b"KMGTPE";

/// Formats a byte count with 1024-based units.
///
/// Counts below 1024 are printed as plain bytes (`"512 B"`); larger counts
/// use one decimal place and an IEC suffix (`"1.5 KiB"`, `"66.8 MiB"`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!(
        "{:.1} {}iB",
        bytes as f64 / div as f64,
        PREFIXES[exp] as char
    )
}
