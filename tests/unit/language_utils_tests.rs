/*!
 * Tests for ISO language code utilities
 */

use qamus::language_utils::{get_language_name, parse_language};

#[test]
fn test_getLanguageName_withArabicCodes_shouldReturnArabic() {
    assert_eq!(get_language_name("ar").unwrap(), "Arabic");
    assert_eq!(get_language_name("ara").unwrap(), "Arabic");
}

#[test]
fn test_getLanguageName_withBibliographicCode_shouldResolve() {
    assert_eq!(get_language_name("ger").unwrap(), "German");
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_parseLanguage_withWhitespaceAndCase_shouldNormalize() {
    assert!(parse_language("  Ar ").is_ok());
}
