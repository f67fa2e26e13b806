use std::{fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer,
    de::{self, Visitor},
};

/// The key enumeration of a serializable copy-on-write value: one variant per field, in
/// declaration order.
///
/// The macro generates an implementation named `<Type>CodingKey`. When a
/// [`declare!`][crate::declare] block already contains an enum with that name, the macro uses it
/// instead, so it has to implement this trait and name its variants after the fields in
/// PascalCase.
pub trait CodingKey: Copy + 'static {
    /// The key of every field, in declaration order.
    const KEYS: &'static [&'static str];

    fn as_str(self) -> &'static str;

    fn from_key(key: &str) -> Option<Self>;
}

/// A field identifier read from a keyed container. Used only for macro codegen.
#[doc(hidden)]
pub enum FieldKey<K> {
    Known(K),
    Unknown,
}

impl<K: CodingKey> FieldKey<K> {
    fn from_str(key: &str) -> Self {
        match K::from_key(key) {
            Some(key) => FieldKey::Known(key),
            None => FieldKey::Unknown,
        }
    }
}

impl<'de, K: CodingKey> Deserialize<'de> for FieldKey<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_identifier(FieldKeyVisitor(PhantomData))
    }
}

struct FieldKeyVisitor<K>(PhantomData<K>);

impl<K: CodingKey> Visitor<'_> for FieldKeyVisitor<K> {
    type Value = FieldKey<K>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a field identifier")
    }

    fn visit_u64<E: de::Error>(self, index: u64) -> Result<Self::Value, E> {
        let key = usize::try_from(index).ok().and_then(|index| K::KEYS.get(index));
        Ok(match key {
            Some(key) => FieldKey::from_str(key),
            None => FieldKey::Unknown,
        })
    }

    fn visit_str<E: de::Error>(self, key: &str) -> Result<Self::Value, E> {
        Ok(FieldKey::from_str(key))
    }

    fn visit_bytes<E: de::Error>(self, key: &[u8]) -> Result<Self::Value, E> {
        Ok(match std::str::from_utf8(key) {
            Ok(key) => FieldKey::from_str(key),
            Err(_) => FieldKey::Unknown,
        })
    }
}
