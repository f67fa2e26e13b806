/// Implemented for every type generated by [`#[turbo_cow::value]`][macro@crate::value].
pub trait CowValue: Clone {
    /// Returns `true` if `self` and `other` currently reference the same storage.
    ///
    /// This is independent of field equality: two values built separately from equal fields are
    /// not identical, and a copy stops being identical to its source at its first write.
    fn is_identical(&self, other: &Self) -> bool;
}

/// Free-function form of [`CowValue::is_identical`].
pub fn is_identical<T: CowValue>(a: &T, b: &T) -> bool {
    a.is_identical(b)
}
