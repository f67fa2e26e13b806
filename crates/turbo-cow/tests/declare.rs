use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
};

turbo_cow::declare! {
    #[value]
    #[derive(Debug, PartialEq, Eq, Hash)]
    pub struct Tag {
        #[shared]
        name: String,
        #[exclusive]
        uses: u32,
    }

    // Tags compare by name only, ignoring case.
    impl PartialEq for Tag {
        fn eq(&self, rhs: &Tag) -> bool {
            self.name().eq_ignore_ascii_case(rhs.name())
        }
    }

    impl Eq for Tag {}

    impl Tag {
        pub fn record_use(&mut self) {
            *self.uses_mut() += 1;
        }
    }
}

#[test]
fn test_manual_equality_replaces_synthesized_one() {
    let a = Tag::new("Rust".to_string(), 1);
    let b = Tag::new("rust".to_string(), 5);
    assert_eq!(a, b);
}

#[test]
fn test_other_capabilities_are_still_synthesized() {
    let mut tag = Tag::new("rust".to_string(), 0);
    tag.record_use();
    assert_eq!(format!("{tag:?}"), r#"Tag(name: "rust", uses: 1)"#);

    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    let _ = hasher.finish();
}

turbo_cow::declare! {
    #[value]
    #[derive(Debug, PartialEq)]
    struct Secret {
        #[shared]
        token: String,
    }

    impl fmt::Debug for Secret {
        fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("Secret(..)")
        }
    }
}

#[test]
fn test_manual_description() {
    let secret = Secret::new("hunter2".to_string());
    assert_eq!(format!("{secret:?}"), "Secret(..)");
    assert_eq!(secret, Secret::new("hunter2".to_string()));
}

turbo_cow::declare! {
    #[value(serde)]
    #[derive(Debug, PartialEq)]
    struct Renamed {
        #[shared]
        first_name: String,
    }

    #[derive(Clone, Copy)]
    enum RenamedCodingKey {
        FirstName,
    }

    impl turbo_cow::CodingKey for RenamedCodingKey {
        const KEYS: &'static [&'static str] = &["firstName"];

        fn as_str(self) -> &'static str {
            match self {
                RenamedCodingKey::FirstName => "firstName",
            }
        }

        fn from_key(key: &str) -> Option<Self> {
            match key {
                "firstName" => Some(RenamedCodingKey::FirstName),
                _ => None,
            }
        }
    }
}

#[test]
fn test_manual_coding_key() {
    let renamed = Renamed::new("Ada".to_string());
    let json = serde_json::to_string(&renamed).unwrap();
    assert_eq!(json, r#"{"firstName":"Ada"}"#);

    let decoded: Renamed = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, renamed);
    assert!(serde_json::from_str::<Renamed>(r#"{"first_name":"Ada"}"#).is_err());
}

turbo_cow::declare! {
    #[value]
    #[derive(PartialEq)]
    struct Labelled {
        #[shared]
        label: String,
    }

    // Inherent members never stand in for a capability.
    impl Labelled {
        #[allow(dead_code)]
        fn eq(&self, _other: &Self) -> bool {
            false
        }
    }
}

#[test]
fn test_inherent_member_does_not_suppress() {
    let a = Labelled::new("x".to_string());
    let b = Labelled::new("x".to_string());
    assert!(PartialEq::eq(&a, &b));
}

turbo_cow::declare! {
    #[value]
    #[derive(Debug, PartialEq, Eq, Hash, serde::Serialize)]
    struct Boxed<T> {
        #[shared]
        inner: T,
        #[exclusive]
        revision: u32,
    }

    // Only the wrapped value is hashed and encoded.
    impl<T: Hash> Hash for Boxed<T> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.inner().hash(state);
        }
    }

    impl<T: serde::Serialize> serde::Serialize for Boxed<T> {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serde::Serialize::serialize(self.inner(), serializer)
        }
    }
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_manual_generic_impls_replace_synthesized_ones() {
    let first = Boxed::new("x", 1);
    let mut second = first.clone();
    second.set_revision(2);

    assert_ne!(first, second);
    assert_eq!(hash_of(&first), hash_of(&second));
    assert_eq!(serde_json::to_string(&second).unwrap(), r#""x""#);
    assert_eq!(format!("{second:?}"), r#"Boxed(inner: "x", revision: 2)"#);
}
