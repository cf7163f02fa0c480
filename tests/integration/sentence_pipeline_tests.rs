/*!
 * Integration tests for the concurrent sentence pipeline.
 *
 * Every test drives `EnrichmentService::lookup_sentence` end to end against
 * the scriptable mock provider and asserts on the result and on the calls the
 * provider received.
 */

use std::sync::Arc;
use std::time::Duration;

use qamus::app_config::CompletionProvider;
use qamus::errors::{ErrorKind, LookupError, ProviderError, SchemaError};
use qamus::providers::mock::{MockProvider, MockReply};

use crate::common::{is_word_call, service_with, service_with_config, test_config, word_of};

/// Mock that translates normally and answers each word through `word_reply`
fn with_word_replies(word_reply: impl Fn(&str) -> MockReply + Send + Sync + 'static) -> MockProvider {
    MockProvider::scripted(move |request| {
        if is_word_call(request) {
            word_reply(&word_of(request))
        } else {
            MockReply::text(MockProvider::default_reply(request))
        }
    })
}

#[tokio::test]
async fn test_lookupSentence_withSingleWord_shouldMakeOneCallPerStage() {
    let provider = MockProvider::working();
    let service = service_with(&provider);

    let result = service.lookup_sentence("كتاب").await.unwrap();

    assert_eq!(result.words.len(), 1);
    assert_eq!(result.words[0].as_ref().unwrap().word, "كتاب");
    assert_eq!(result.translation, "[EN] كتاب");
    assert_eq!(provider.request_count(), 2);
    assert_eq!(provider.word_requests().len(), 1);
}

#[tokio::test]
async fn test_lookupSentence_onSpawnedTask_shouldComplete() {
    let provider = MockProvider::working();
    let service = Arc::new(service_with(&provider));

    let result = tokio::spawn(async move { service.lookup_sentence("ذهب الولد").await })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.enriched_count(), 2);
}

#[tokio::test]
async fn test_lookupSentence_withVariousSpacing_shouldReturnOneSlotPerToken() {
    let provider = MockProvider::working();
    let service = service_with(&provider);

    for (input, expected) in [
        ("ذهب الولد", 2),
        ("  ذهب   الولد\tإلى\nالمدرسة  ", 4),
        ("عَشَّشَتْ قُبَّرَةٌ عَلَى طَرِيقٍ .", 5),
    ] {
        let result = service.lookup_sentence(input).await.unwrap();
        assert_eq!(result.words.len(), expected, "input {:?}", input);
    }
}

#[tokio::test]
async fn test_lookupSentence_withSlowEarlyToken_shouldKeepInputOrder() {
    let provider = with_word_replies(|word| {
        let reply = MockReply::text(MockProvider::word_json(word));
        if word == "ذهب" {
            MockReply::delayed(150, reply)
        } else {
            reply
        }
    });
    let service = service_with(&provider);

    let result = service.lookup_sentence("ذهب الولد إلى المدرسة").await.unwrap();

    let words: Vec<&str> = result
        .words
        .iter()
        .map(|w| w.as_ref().map(|w| w.word.as_str()).unwrap_or("-"))
        .collect();
    assert_eq!(words, vec!["ذهب", "الولد", "إلى", "المدرسة"]);
}

#[tokio::test]
async fn test_lookupSentence_withFailureAtIndexOne_shouldLeaveOnlyThatSlotEmpty() {
    let provider = with_word_replies(|word| {
        if word == "الولد" {
            MockReply::Error(ProviderError::ConnectionError("reset by peer".to_string()))
        } else {
            MockReply::text(MockProvider::word_json(word))
        }
    });
    let service = service_with(&provider);

    let result = service.lookup_sentence("ذهب الولد مسرعا").await.unwrap();

    assert!(result.words[0].is_some());
    assert!(result.words[1].is_none());
    assert!(result.words[2].is_some());
    assert_eq!(result.placeholder_count(), 1);
    assert_eq!(provider.word_requests().len(), 3);
}

#[tokio::test]
async fn test_lookupSentence_withEveryWordErrorKind_shouldNeverFailRequest() {
    let provider = with_word_replies(|word| match word {
        "واحد" => MockReply::Error(ProviderError::RateLimitExceeded("quota".to_string())),
        "اثنان" => MockReply::text("not json"),
        "ثلاثة" => MockReply::text(r#"{"error": "not a word"}"#),
        "أربعة" => MockReply::Error(ProviderError::TokenLimitExceeded { max_tokens: Some(50) }),
        _ => MockReply::text(MockProvider::word_json(word)),
    });
    let service = service_with(&provider);

    let result = service.lookup_sentence("واحد اثنان ثلاثة أربعة خمسة").await.unwrap();

    assert_eq!(result.words.len(), 5);
    assert_eq!(result.placeholder_count(), 4);
    assert_eq!(result.words[4].as_ref().unwrap().word, "خمسة");
}

#[tokio::test]
async fn test_lookupSentence_withWrongScript_shouldMakeNoCalls() {
    let provider = MockProvider::working();
    let service = service_with(&provider);

    let error = service.lookup_sentence("hello").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidInput);
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_lookupSentence_withBlankInput_shouldMakeNoCalls() {
    let provider = MockProvider::working();
    let service = service_with(&provider);

    assert!(matches!(
        service.lookup_sentence("   ").await,
        Err(LookupError::InvalidInput(_))
    ));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_lookupSentence_withProseTranslation_shouldFailBeforeWordStage() {
    let provider = MockProvider::scripted(|request| {
        if is_word_call(request) {
            MockReply::text(MockProvider::word_json(&word_of(request)))
        } else {
            MockReply::text("The boy went to school.")
        }
    });
    let service = service_with(&provider);

    let error = service.lookup_sentence("ذهب الولد").await.unwrap_err();

    assert!(matches!(error, LookupError::Schema(SchemaError::InvalidJson(_))));
    assert_eq!(provider.request_count(), 1);
    assert!(provider.word_requests().is_empty());
}

#[tokio::test]
async fn test_lookupSentence_withMissingTranslationField_shouldBeSchemaError() {
    let provider = MockProvider::scripted(|_| MockReply::text(r#"{"vocalized_sentence": "ذَهَبَ"}"#));
    let service = service_with(&provider);

    let error = service.lookup_sentence("ذهب").await.unwrap_err();

    assert_eq!(error, LookupError::Schema(SchemaError::MissingField("translation".to_string())));
    assert_eq!(error.status_code(), 500);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_lookupSentence_withQuotaErrorOnTranslation_shouldBeRateLimited() {
    let provider = MockProvider::rate_limited();
    let service = service_with(&provider);

    let error = service.lookup_sentence("ذهب الولد").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::RateLimited);
    assert_eq!(error.status_code(), 429);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_lookupSentence_withClassifiedTranslationFailures_shouldStayDistinct() {
    let cases = [
        (ProviderError::ConnectionError("refused".to_string()), ErrorKind::ServiceUnavailable),
        (ProviderError::RateLimitExceeded("quota".to_string()), ErrorKind::RateLimited),
        (
            ProviderError::ApiError {
                status_code: 502,
                message: "bad gateway".to_string(),
            },
            ErrorKind::UnexpectedServiceError,
        ),
        (ProviderError::TokenLimitExceeded { max_tokens: Some(10) }, ErrorKind::UnexpectedServiceError),
    ];

    for (failure, expected) in cases {
        let provider = MockProvider::scripted(move |_| MockReply::Error(failure.clone()));
        let service = service_with(&provider);

        let error = service.lookup_sentence("ذهب الولد").await.unwrap_err();
        assert_eq!(error.kind(), expected);
    }
}

#[tokio::test]
async fn test_lookupSentence_shouldPassVocalizedContextToEveryWord() {
    let provider = MockProvider::scripted(|request| {
        if is_word_call(request) {
            MockReply::text(MockProvider::word_json(&word_of(request)))
        } else {
            MockReply::text(MockProvider::translation_json("The boy went", "ذَهَبَ الوَلَدُ"))
        }
    });
    let service = service_with(&provider);

    service.lookup_sentence("ذهب الولد").await.unwrap();

    let contexts: Vec<String> = provider
        .word_requests()
        .iter()
        .filter_map(|r| qamus::providers::mock::payload_field(&r.user_payload, "context"))
        .collect();
    assert_eq!(contexts, vec!["ذَهَبَ الوَلَدُ".to_string(); 2]);
}

#[tokio::test]
async fn test_lookupSentence_withConcurrencyLimit_shouldBoundInFlightCalls() {
    let provider = with_word_replies(|word| MockReply::delayed(20, MockReply::text(MockProvider::word_json(word))));
    let mut config = test_config();
    config.provider_config_mut(CompletionProvider::OpenAI).concurrent_requests = Some(2);
    let service = service_with_config(&config, &provider);

    let result = service.lookup_sentence("واحد اثنان ثلاثة أربعة خمسة ستة").await.unwrap();

    assert_eq!(result.enriched_count(), 6);
    assert_eq!(provider.peak_in_flight(), 2);
}

#[tokio::test]
async fn test_lookupSentence_withUnboundedFanOut_shouldRunAllWordsTogether() {
    let provider = with_word_replies(|word| MockReply::delayed(40, MockReply::text(MockProvider::word_json(word))));
    let mut config = test_config();
    config.provider_config_mut(CompletionProvider::OpenAI).concurrent_requests = Some(0);
    let service = service_with_config(&config, &provider);

    service.lookup_sentence("واحد اثنان ثلاثة أربعة خمسة").await.unwrap();

    assert_eq!(provider.peak_in_flight(), 5);
}

#[tokio::test]
async fn test_lookupSentence_withDeadlineExceeded_shouldBeServiceUnavailable() {
    let provider = with_word_replies(|word| MockReply::delayed(5_000, MockReply::text(MockProvider::word_json(word))));
    let mut config = test_config();
    config.lookup.request_timeout_secs = 1;
    let service = service_with_config(&config, &provider);

    let error = service.lookup_sentence("ذهب الولد").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
    assert_eq!(provider.word_requests().len(), 2);
    assert_eq!(provider.in_flight(), 0);
}

#[tokio::test]
async fn test_lookupSentence_whenCallerDropsRequest_shouldReleaseAllWordCalls() {
    let provider = with_word_replies(|word| MockReply::delayed(5_000, MockReply::text(MockProvider::word_json(word))));
    let mut config = test_config();
    config.provider_config_mut(CompletionProvider::OpenAI).concurrent_requests = Some(2);
    let service = service_with_config(&config, &provider);

    let abandoned =
        tokio::time::timeout(Duration::from_millis(200), service.lookup_sentence("واحد اثنان ثلاثة أربعة")).await;

    assert!(abandoned.is_err());
    assert_eq!(provider.peak_in_flight(), 2);
    assert_eq!(provider.in_flight(), 0);

    // Nothing keeps running after the drop: no queued word call is started later
    let started = provider.request_count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(provider.request_count(), started);
    assert_eq!(started, 3);
}

#[tokio::test]
async fn test_lookupSentence_shouldApplyConfiguredTokenCeilings() {
    let provider = MockProvider::working();
    let mut config = test_config();
    config.lookup.translation_max_tokens = Some(500);
    config.lookup.enrichment_max_tokens = Some(250);
    let service = service_with_config(&config, &provider);

    service.lookup_sentence("ذهب الولد").await.unwrap();

    for request in provider.requests() {
        let expected = if is_word_call(&request) { Some(250) } else { Some(500) };
        assert_eq!(request.max_tokens, expected);
    }
}
