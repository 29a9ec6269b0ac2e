//! Label matching.

/// Whether `labels` contains `target`.
///
/// Matching is exact: case-sensitive, no trimming, no prefix matches.
#[must_use]
pub fn has_label<S: AsRef<str>>(labels: &[S], target: &str) -> bool {
    labels.iter().any(|label| label.as_ref() == target)
}
