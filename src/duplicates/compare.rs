//! Byte-exact content comparison.

/// Check whether two buffers hold identical content.
///
/// Lengths are compared first; buffers of different length are never
/// equal. Within a size bucket the lengths always match, so the check is
/// an invariant guard rather than a filter.
///
/// # Example
///
/// ```
/// use dupesweep::duplicates::bytes_equal;
///
/// assert!(bytes_equal(&[1, 2, 3], &[1, 2, 3]));
/// assert!(!bytes_equal(&[1, 2, 3], &[1, 2, 4]));
/// assert!(!bytes_equal(&[1, 2], &[1, 2, 3]));
/// ```
#[must_use]
pub fn bytes_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).all(|(x, y)| x == y)
}
