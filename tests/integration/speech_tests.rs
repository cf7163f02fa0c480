/*!
 * Integration tests for speech file output
 */

use std::sync::Arc;

use qamus::providers::mock::MockProvider;
use qamus::speech::SpeechService;
use tempfile::TempDir;

#[tokio::test]
async fn test_synthesize_twice_shouldWriteTwoDistinctFiles() {
    let dir = TempDir::new().unwrap();
    let service = SpeechService::new(Arc::new(MockProvider::working()), dir.path());

    let first = service.synthesize("مرحبا").await.unwrap();
    let second = service.synthesize("مرحبا").await.unwrap();

    assert_ne!(first.filename, second.filename);
    assert!(first.filename.ends_with(".mp3"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_synthesize_withMissingOutputDir_shouldCreateIt() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("audio").join("today");
    let service = SpeechService::new(Arc::new(MockProvider::working()), &output);

    let file = service.synthesize("مرحبا").await.unwrap();

    assert!(file.path.starts_with(&output));
    assert!(file.path.exists());
}

#[tokio::test]
async fn test_synthesize_withQuotaError_shouldBeRateLimited() {
    let dir = TempDir::new().unwrap();
    let service = SpeechService::new(Arc::new(MockProvider::rate_limited()), dir.path());

    let error = service.synthesize("مرحبا").await.unwrap_err();

    assert_eq!(error.status_code(), 429);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_synthesize_withServiceFailure_shouldBeUnexpectedAndWriteNothing() {
    let dir = TempDir::new().unwrap();
    let service = SpeechService::new(Arc::new(MockProvider::failing()), dir.path());

    let error = service.synthesize("مرحبا").await.unwrap_err();

    assert_eq!(error.status_code(), 500);
    assert_eq!(error.kind_str(), "unexpected_service_error");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_fromConfig_withOllama_shouldBeUnavailable() {
    let config = qamus::Config {
        provider: qamus::app_config::CompletionProvider::Ollama,
        ..qamus::Config::default()
    };
    assert!(SpeechService::from_config(&config).is_none());
}
