//! Copy-on-write value types.
//!
//! [`#[turbo_cow::value]`][macro@value] turns a struct with named fields into a value type whose
//! fields live in a shared, reference-counted storage. Cloning the value only bumps a reference
//! count. The storage itself is cloned lazily, the first time a copy that still shares it is
//! written to.
//!
//! Every field must carry one of two tags:
//! - **`#[exclusive]`:** The field can change after construction. It gets a getter, a
//!   `set_<field>` setter and a `<field>_mut` accessor, both of which go through the write barrier
//!   ([`CowStorage::make_unique`]).
//! - **`#[shared]`:** The field is fixed at construction and only gets a getter. A shared field can
//!   declare a default with `#[shared(default = <expr>)]`, which removes it from the constructor.
//!
//! Fields without a tag are not part of the generated type.
//!
//! ```ignore
//! #[turbo_cow::value]
//! #[derive(Debug, PartialEq, Eq, Hash)]
//! pub struct Person {
//!     #[shared]
//!     id: String,
//!     #[exclusive]
//!     name: String,
//! }
//!
//! let p1 = Person::new("a".into(), "b".into());
//! let mut p2 = p1.clone();
//! assert!(p1.is_identical(&p2));
//!
//! p2.set_name("c".into());
//! assert!(!p1.is_identical(&p2));
//! assert_eq!(p1.name(), "b");
//! assert_eq!(p2.name(), "c");
//! ```
//!
//! The capabilities listed in `#[derive(...)]` are synthesized against the storage instead of being
//! derived: `Debug`, `PartialEq`, `Eq`, `Hash`, `Serialize` and `Deserialize`. `#[value(serde)]`
//! requests both serialization capabilities at once. `Clone` is always implemented.
//!
//! To provide some of these by hand, use [`declare!`] and put the manual `impl` blocks next to the
//! struct. The macro skips every capability that a manual impl already covers.
//!
//! The generated `Hash` feeds every field into the hasher. If a manual `PartialEq` considers values
//! equal that differ field-wise, the generated hash is inconsistent with it.
//!
//! Storage is reference counted with [`std::rc::Rc`], so generated types are neither `Send` nor
//! `Sync`.

mod coding_key;
#[doc(hidden)]
pub mod macro_helpers;
mod storage;
mod value;

pub use turbo_cow_macros::{declare, value};

pub use crate::{
    coding_key::CodingKey,
    storage::CowStorage,
    value::{CowValue, is_identical},
};
