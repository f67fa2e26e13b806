use std::{
    any::type_name,
    fmt::{self, Debug},
    ops::Deref,
    rc::Rc,
};

/// A reference-counted handle to the storage of a copy-on-write value.
///
/// Cloning a [`CowStorage`] never clones the storage, it only adds another handle to the same
/// allocation. The storage is cloned by [`CowStorage::make_unique`], and only if another handle
/// still references it.
///
/// Like [`Rc`], the helpers are associated functions (`CowStorage::ptr_eq(&a, &b)`) so that they
/// don't shadow methods of the storage reached through [`Deref`].
pub struct CowStorage<S> {
    inner: Rc<S>,
}

impl<S> CowStorage<S> {
    pub fn new(storage: S) -> Self {
        CowStorage {
            inner: Rc::new(storage),
        }
    }

    /// Returns `true` if this is the only handle to the storage.
    #[inline]
    pub fn is_unique(this: &Self) -> bool {
        Rc::strong_count(&this.inner) == 1 && Rc::weak_count(&this.inner) == 0
    }

    /// The number of handles currently sharing the storage.
    #[inline]
    pub fn ref_count(this: &Self) -> usize {
        Rc::strong_count(&this.inner)
    }

    /// Returns `true` if both handles point to the same storage allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.inner, &other.inner)
    }
}

impl<S: Clone> CowStorage<S> {
    /// The write barrier: returns a mutable reference to storage that no other handle can observe.
    ///
    /// If the storage is shared, it is cloned first and this handle is moved to the clone. The
    /// other handles keep the old storage. Once a handle is unique, further calls don't clone.
    ///
    /// Taking `&mut Self` makes the uniqueness check and the clone-and-replace a single critical
    /// section for this handle.
    pub fn make_unique(this: &mut Self) -> &mut S {
        if !Self::is_unique(this) {
            tracing::trace!(
                storage = type_name::<S>(),
                shared_with = Rc::strong_count(&this.inner) - 1,
                "cloning shared storage before write"
            );
            this.inner = Rc::new(S::clone(&this.inner));
        }
        match Rc::get_mut(&mut this.inner) {
            Some(storage) => storage,
            None => unreachable!("storage handle is unique after the write barrier"),
        }
    }
}

// Manual implementation because the derive would add an unnecessary `S: Clone` bound.
impl<S> Clone for CowStorage<S> {
    fn clone(&self) -> Self {
        CowStorage {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> Deref for CowStorage<S> {
    type Target = S;

    #[inline]
    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S: Debug> Debug for CowStorage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    thread_local! {
        static CLONES: Cell<usize> = const { Cell::new(0) };
    }

    #[derive(Debug, PartialEq)]
    struct Counted(u32);

    impl Clone for Counted {
        fn clone(&self) -> Self {
            CLONES.with(|c| c.set(c.get() + 1));
            Counted(self.0)
        }
    }

    fn clones() -> usize {
        CLONES.with(|c| c.get())
    }

    #[test]
    fn test_new_is_unique() {
        let storage = CowStorage::new(Counted(1));
        assert!(CowStorage::is_unique(&storage));
        assert_eq!(CowStorage::ref_count(&storage), 1);
    }

    #[test]
    fn test_clone_shares_allocation() {
        let before = clones();
        let a = CowStorage::new(Counted(1));
        let b = a.clone();
        assert!(CowStorage::ptr_eq(&a, &b));
        assert!(!CowStorage::is_unique(&a));
        assert_eq!(CowStorage::ref_count(&b), 2);
        assert_eq!(clones(), before);
    }

    #[test]
    fn test_make_unique_on_unique_storage_does_not_clone() {
        let before = clones();
        let mut a = CowStorage::new(Counted(1));
        CowStorage::make_unique(&mut a).0 = 2;
        assert_eq!(a.0, 2);
        assert_eq!(clones(), before);
    }

    #[test]
    fn test_make_unique_diverges_once() {
        let before = clones();
        let a = CowStorage::new(Counted(1));
        let mut b = a.clone();

        for i in 0..5 {
            CowStorage::make_unique(&mut b).0 = 10 + i;
        }

        assert_eq!(clones() - before, 1);
        assert!(!CowStorage::ptr_eq(&a, &b));
        assert!(CowStorage::is_unique(&a));
        assert!(CowStorage::is_unique(&b));
        assert_eq!(a.0, 1);
        assert_eq!(b.0, 14);
    }

    #[test]
    fn test_make_unique_leaves_other_handles_shared() {
        let a = CowStorage::new(Counted(1));
        let b = a.clone();
        let mut c = a.clone();

        CowStorage::make_unique(&mut c).0 = 3;

        assert!(CowStorage::ptr_eq(&a, &b));
        assert_eq!(CowStorage::ref_count(&a), 2);
        assert_eq!(c.0, 3);
    }

    #[test]
    fn test_debug_delegates_to_storage() {
        let storage = CowStorage::new(Counted(7));
        assert_eq!(format!("{storage:?}"), "Counted(7)");
    }
}
