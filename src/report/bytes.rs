//! Byte count humanization.

const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// Formats a byte count with binary units and two decimals.
///
/// Stops at `PiB` no matter how large the value is.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn humanize_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = UNITS[0];

    for (index, &label) in UNITS.iter().enumerate() {
        unit = label;
        if size < 1024.0 || index == UNITS.len() - 1 {
            break;
        }
        size /= 1024.0;
    }

    format!("{size:.2} {unit}")
}
