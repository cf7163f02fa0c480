/*!
 * Tests for response schema validation
 */

use qamus::enrichment::WordEnrichment;
use qamus::errors::SchemaError;
use qamus::validation::validate;
use serde_json::json;

fn full_entry() -> serde_json::Value {
    json!({
        "word": "كِتَابٌ",
        "language": "Arabic",
        "pos": "noun",
        "lemma": "كِتَاب",
        "english_meaning": "book",
        "base_meaning": "book, writing",
        "transliteration": "kitābun",
        "attributes": {"gender": "masculine", "root": "ك ت ب"}
    })
}

#[test]
fn test_validate_withFullEntry_shouldDecodeAttributes() {
    let entry: WordEnrichment = validate(&full_entry().to_string()).unwrap();

    assert_eq!(entry.english_meaning, "book");
    assert_eq!(entry.attributes.get("root").map(String::as_str), Some("ك ت ب"));
}

#[test]
fn test_validate_withoutAttributes_shouldDefaultToEmptyMap() {
    let mut value = full_entry();
    value.as_object_mut().unwrap().remove("attributes");

    let entry: WordEnrichment = validate(&value.to_string()).unwrap();
    assert!(entry.attributes.is_empty());
}

#[test]
fn test_validate_withEachRequiredFieldMissing_shouldNameTheField() {
    for field in ["word", "language", "pos", "lemma", "english_meaning", "base_meaning", "transliteration"] {
        let mut value = full_entry();
        value.as_object_mut().unwrap().remove(field);

        let error = validate::<WordEnrichment>(&value.to_string()).unwrap_err();
        assert_eq!(error, SchemaError::MissingField(field.to_string()), "field {}", field);
    }
}

#[test]
fn test_validate_withEmptyWord_shouldFail() {
    let mut value = full_entry();
    value["word"] = json!("");

    assert_eq!(
        validate::<WordEnrichment>(&value.to_string()).unwrap_err(),
        SchemaError::MissingField("word".to_string())
    );
}

#[test]
fn test_validate_withErrorAlongsideFields_shouldPreferError() {
    let mut value = full_entry();
    value["error"] = json!("not a word");

    assert_eq!(
        validate::<WordEnrichment>(&value.to_string()).unwrap_err(),
        SchemaError::ServiceReported("not a word".to_string())
    );
}

#[test]
fn test_validate_withTruncatedJson_shouldBeInvalidJson() {
    let raw = r#"{"word": "كتاب", "language": "Ara"#;
    assert!(matches!(
        validate::<WordEnrichment>(raw),
        Err(SchemaError::InvalidJson(_))
    ));
}
