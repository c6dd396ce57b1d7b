//! String sequence helpers.

/// Returns true if `value` is an element of `list`.
pub fn string_in_slice<S: AsRef<str>>(value: &str, list: &[S]) -> bool {
    list.iter().any(|s| s.as_ref() == value)
}

/// Compares two string sequences ignoring order.
///
/// The sequences are equal when they have the same length and every element
/// of each one is found in the other. Duplicates only count through membership.
pub fn same_members<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> bool {
    a.len() == b.len()
        && a.iter().all(|s| string_in_slice(s.as_ref(), b))
        && b.iter().all(|s| string_in_slice(s.as_ref(), a))
}
