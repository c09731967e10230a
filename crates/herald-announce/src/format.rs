//! Human-readable renderings of the numbers and ids in a [`crate::DeploymentOutcome`].
//!
//! Every helper falls back to `N/A` when the value is unknown.

const NOT_AVAILABLE: &str = "N/A";

/// The first eight characters of the transaction id followed by `...`.
#[must_use]
pub fn transaction_display(transaction_id: Option<&str>) -> String {
    match transaction_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let prefix: String = id.chars().take(8).collect();
            format!("{prefix}...")
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

#[must_use]
pub fn duration_display(duration_ms: u64) -> String {
    if duration_ms == 0 {
        NOT_AVAILABLE.to_string()
    } else {
        format!("{duration_ms}ms")
    }
}

/// Size in kibibytes with one decimal place.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn size_display(file_size_bytes: u64) -> String {
    if file_size_bytes == 0 {
        NOT_AVAILABLE.to_string()
    } else {
        format!("{:.1} KB", file_size_bytes as f64 / 1024.0)
    }
}
