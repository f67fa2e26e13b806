use rstest::rstest;
use turbo_cow::CodingKey;

#[turbo_cow::value(serde)]
#[derive(Debug, PartialEq)]
pub struct Person {
    #[shared]
    id: String,
    #[exclusive]
    first_name: String,
}

fn person(id: &str, first_name: &str) -> Person {
    Person::new(id.to_string(), first_name.to_string())
}

#[test]
fn test_coding_keys() {
    assert_eq!(PersonCodingKey::KEYS, ["id", "first_name"]);
    assert_eq!(PersonCodingKey::FirstName.as_str(), "first_name");
    assert_eq!(PersonCodingKey::from_key("id"), Some(PersonCodingKey::Id));
    assert_eq!(PersonCodingKey::from_key("firstName"), None);
}

#[test]
fn test_encode_in_declaration_order() {
    let json = serde_json::to_string(&person("a", "b")).unwrap();
    assert_eq!(json, r#"{"id":"a","first_name":"b"}"#);
}

#[rstest]
#[case::ordered(r#"{"id":"a","first_name":"b"}"#)]
#[case::reordered(r#"{"first_name":"b","id":"a"}"#)]
#[case::unknown_key_ignored(r#"{"id":"a","age":3,"first_name":"b"}"#)]
#[case::sequence(r#"["a","b"]"#)]
fn test_decode(#[case] json: &str) {
    let decoded: Person = serde_json::from_str(json).unwrap();
    assert_eq!(decoded, person("a", "b"));
}

#[rstest]
#[case::missing_field(r#"{"id":"a"}"#, "missing field `first_name`")]
#[case::duplicate_field(r#"{"id":"a","id":"b","first_name":"c"}"#, "duplicate field `id`")]
#[case::short_sequence(r#"["a"]"#, "invalid length 1, expected struct Person")]
#[case::wrong_type(r#"{"id":1,"first_name":"b"}"#, "invalid type: integer `1`")]
fn test_decode_errors(#[case] json: &str, #[case] expected: &str) {
    let err = serde_json::from_str::<Person>(json).unwrap_err();
    assert!(err.to_string().contains(expected), "{err}");
}

#[test]
fn test_round_trip_after_write() {
    let original = person("a", "b");
    let mut copy = original.clone();
    copy.set_first_name("c".to_string());

    let decoded: Person = serde_json::from_str(&serde_json::to_string(&copy).unwrap()).unwrap();
    assert_eq!(decoded, copy);
    assert!(!decoded.is_identical(&copy));
}

#[turbo_cow::value]
#[derive(serde::Serialize)]
struct Token {
    #[shared]
    r#type: String,
    #[shared]
    value: u32,
}

#[test]
fn test_encode_only_with_raw_identifier() {
    let token = Token::new("number".to_string(), 4);
    assert_eq!(token.r#type(), "number");
    assert_eq!(
        serde_json::to_string(&token).unwrap(),
        r#"{"type":"number","value":4}"#
    );
}

#[turbo_cow::value]
#[derive(Debug, PartialEq, serde::Deserialize)]
struct Unit {}

#[test]
fn test_decode_without_fields() {
    let decoded: Unit = serde_json::from_str(r#"{"ignored":true}"#).unwrap();
    assert_eq!(decoded, Unit::new());
}

#[turbo_cow::value(serde)]
#[derive(Debug, PartialEq)]
struct Receiver {
    #[shared]
    self_: u8,
}

#[test]
fn test_keyword_like_field_name() {
    assert_eq!(ReceiverCodingKey::FieldSelf.as_str(), "self_");
    let json = serde_json::to_string(&Receiver::new(1)).unwrap();
    assert_eq!(json, r#"{"self_":1}"#);
    assert_eq!(serde_json::from_str::<Receiver>(&json).unwrap(), Receiver::new(1));
}
