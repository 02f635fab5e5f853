//! Progress reporting for archive operations.
//!
//! Bulk operations (`add_directory`, `extract_all`, `verify`) invoke an
//! optional caller-supplied callback between entries, never mid-entry and
//! never re-entrantly. The callback is owned by the
//! [`Archive`](crate::Archive) as a boxed function value.

/// Progress callback invoked between entries.
///
/// Arguments are `(current, total, bytes_done, bytes_total, current_path)`,
/// where `current` counts processed entries starting at 1.
pub type ProgressFn = Box<dyn FnMut(u64, u64, u64, u64, &str) + Send>;

/// IEC step used by [`format_size`].
const UNIT: f64 = 1024.0;

/// Formats a byte count as a human-readable string with two decimals,
/// e.g. `1.50 MB`.
pub fn format_size(bytes: u64) -> String {
    static UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= UNIT && unit < UNITS.len() - 1 {
        size /= UNIT;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}
