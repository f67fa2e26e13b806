//! Runtime support for code generated by `turbo-cow-macros`. Not a public API.

use std::fmt::{self, Debug};

pub use serde;

pub use crate::coding_key::FieldKey;

/// Writes the description of a copy-on-write value: `Name(field: value, other: value)`, with each
/// value rendered through [`Debug`].
pub fn write_description(
    f: &mut fmt::Formatter<'_>,
    type_name: &str,
    fields: &[(&str, &dyn Debug)],
) -> fmt::Result {
    f.write_str(type_name)?;
    f.write_str("(")?;
    for (index, (name, value)) in fields.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}: {value:?}")?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Described<'a>(&'a str, &'a [(&'a str, &'a dyn Debug)]);

    impl Debug for Described<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_description(f, self.0, self.1)
        }
    }

    fn describe(type_name: &str, fields: &[(&str, &dyn Debug)]) -> String {
        format!("{:?}", Described(type_name, fields))
    }

    #[test]
    fn test_no_fields() {
        assert_eq!(describe("Empty", &[]), "Empty()");
    }

    #[test]
    fn test_one_field() {
        assert_eq!(describe("Counter", &[("count", &3u32)]), "Counter(count: 3)");
    }

    #[test]
    fn test_fields_in_order_with_debug_rendering() {
        let id = "a";
        let name = String::from("b");
        assert_eq!(
            describe("Person", &[("id", &id), ("name", &name)]),
            r#"Person(id: "a", name: "b")"#
        );
    }

    #[test]
    fn test_nested_values() {
        let items = vec![1, 2];
        assert_eq!(describe("Bag", &[("items", &items)]), "Bag(items: [1, 2])");
    }
}
