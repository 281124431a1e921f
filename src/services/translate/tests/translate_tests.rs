use super::*;
use crate::test_utils::{spawn_http_stub, StubResponse};

fn chain(providers: Vec<TranslationProvider>) -> ProviderChain {
    ProviderChain::new(providers, Duration::from_secs(5), 16).unwrap()
}

fn deepl(base: &str) -> TranslationProvider {
    TranslationProvider::DeepL {
        api_key: "test-key".into(),
        url: format!("{base}/v2/translate"),
    }
}

fn libre(base: &str) -> TranslationProvider {
    TranslationProvider::LibreTranslate {
        base_url: format!("{base}/"),
    }
}

#[tokio::test]
async fn test_unconfigured_chain_is_unavailable() {
    let chain = chain(Vec::new());
    assert!(!chain.is_configured());
    assert_eq!(chain.translate("Magicien Sombre", "en").await, None);
    assert_eq!(
        chain.try_translate("Magicien Sombre", "en").await,
        Err(NoSignal::Unconfigured)
    );
}

#[tokio::test]
async fn test_deepl_answer_is_used_and_cached() {
    let base = spawn_http_stub(StubResponse::json(
        200,
        r#"{"translations":[{"detected_source_language":"FR","text":"Dark Magician"}]}"#,
    ))
    .await;
    let chain = chain(vec![deepl(&base)]);

    let out = chain.translate("  Magicien Sombre ", "en").await;
    assert_eq!(out.as_deref(), Some("Dark Magician"));
    let key = ("Magicien Sombre".to_string(), "en".to_string());
    assert_eq!(chain.cached(&key).as_deref(), Some("Dark Magician"));
}

#[tokio::test]
async fn test_falls_back_to_libretranslate() {
    let failing = spawn_http_stub(StubResponse::json(456, r#"{"message":"quota"}"#)).await;
    let libre_base =
        spawn_http_stub(StubResponse::json(200, r#"{"translatedText":"Pot of Greed"}"#)).await;
    let chain = chain(vec![deepl(&failing), libre(&libre_base)]);

    let out = chain.translate("Pot de Cupidité", "en").await;
    assert_eq!(out.as_deref(), Some("Pot of Greed"));
}

#[tokio::test]
async fn test_empty_answer_is_no_signal() {
    let base = spawn_http_stub(StubResponse::json(200, r#"{"translatedText":"  "}"#)).await;
    let chain = chain(vec![libre(&base)]);
    assert!(matches!(
        chain.try_translate("Bonjour", "en").await,
        Err(NoSignal::Decode(_))
    ));
    assert_eq!(chain.translate("Bonjour", "en").await, None);
}

#[tokio::test]
async fn test_malformed_body_is_no_signal() {
    let base = spawn_http_stub(StubResponse::json(200, "<html>oops</html>")).await;
    let chain = chain(vec![deepl(&base)]);
    assert_eq!(chain.translate("Bonjour", "en").await, None);
}

#[tokio::test]
async fn test_timeout_is_no_signal() {
    let base = spawn_http_stub(
        StubResponse::json(200, r#"{"translatedText":"late"}"#).delayed(Duration::from_secs(5)),
    )
    .await;
    let chain = ProviderChain::new(vec![libre(&base)], Duration::from_millis(200), 4).unwrap();
    assert_eq!(
        chain.try_translate("Bonjour", "en").await,
        Err(NoSignal::Timeout)
    );
}

#[test]
fn test_from_config_orders_providers() {
    let config = TranslateConfig {
        deepl_api_key: Some("key".into()),
        libretranslate_url: Some("http://localhost:5000".into()),
        ..TranslateConfig::default()
    };
    let chain = ProviderChain::from_config(&config).unwrap();
    let names: Vec<&str> = chain.providers.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["DeepL", "LibreTranslate"]);

    let empty = ProviderChain::from_config(&TranslateConfig {
        deepl_api_key: Some(String::new()),
        ..TranslateConfig::default()
    })
    .unwrap();
    assert!(!empty.is_configured());
}

#[tokio::test]
async fn test_no_translation_is_always_none() {
    assert_eq!(NoTranslation.translate("anything", "en").await, None);
}
