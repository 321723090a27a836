//! Translation gateway backed by an OpenAI-compatible chat endpoint.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use super::client::{TranslationClient, TranslationRequest};
use super::gateway::{LanguagePair, Translate, TranslationGateway, UnsupportedPair};
use crate::cache::CacheManager;

/// Resolves translators for the configured language pairs.
pub struct LlmGateway {
    client: TranslationClient,
    model: String,
    pairs: Vec<LanguagePair>,
    cache: Option<Arc<CacheManager>>,
}

impl LlmGateway {
    pub fn new(client: TranslationClient, model: String, pairs: Vec<LanguagePair>) -> Self {
        Self {
            client,
            model,
            pairs,
            cache: None,
        }
    }

    /// Serves repeated messages from `cache` instead of the endpoint.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    pub fn supports(&self, source: &str, target: &str) -> bool {
        source != target && self.pairs.iter().any(|pair| pair.matches(source, target))
    }
}

impl TranslationGateway for LlmGateway {
    type Translator = LlmTranslator;

    fn resolve(&self, source: &str, target: &str) -> Result<LlmTranslator, UnsupportedPair> {
        if !self.supports(source, target) {
            return Err(UnsupportedPair::new(source, target));
        }

        Ok(LlmTranslator {
            client: self.client.clone(),
            model: self.model.clone(),
            pair: LanguagePair::new(source, target),
            cache: self.cache.clone(),
        })
    }
}

/// Translates one direction through the endpoint.
pub struct LlmTranslator {
    client: TranslationClient,
    model: String,
    pair: LanguagePair,
    cache: Option<Arc<CacheManager>>,
}

impl LlmTranslator {
    fn request(&self, text: &str) -> TranslationRequest {
        TranslationRequest {
            source_text: text.to_string(),
            source_language: self.pair.source.clone(),
            target_language: self.pair.target.clone(),
            model: self.model.clone(),
            endpoint: self.client.endpoint().to_string(),
        }
    }
}

impl Translate for LlmTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let request = self.request(text);

        if let Some(cache) = &self.cache {
            match cache.get(&request) {
                Ok(Some(cached)) => {
                    debug!(pair = %self.pair, "translation served from cache");
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "translation cache lookup failed"),
            }
        }

        let translated = self.client.translate(&request).await?;

        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(&request, &translated)
        {
            warn!(error = %e, "failed to store translation in cache");
        }

        Ok(translated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::translation::default_pairs;
    use tempfile::TempDir;

    // Nothing listens on the discard port, so any request would fail
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn gateway() -> LlmGateway {
        LlmGateway::new(
            TranslationClient::new(UNREACHABLE.to_string(), None),
            "gemma3:12b".to_string(),
            default_pairs(),
        )
    }

    #[test]
    fn test_resolves_configured_pairs_only() {
        let gateway = gateway();
        assert!(gateway.resolve("en", "ka").is_ok());
        assert!(gateway.resolve("ru", "en").is_ok());

        let err = gateway.resolve("ka", "ru").err().unwrap();
        assert_eq!(err, UnsupportedPair::new("ka", "ru"));
    }

    #[test]
    fn test_same_language_is_never_supported() {
        let gateway = LlmGateway::new(
            TranslationClient::new(UNREACHABLE.to_string(), None),
            "model".to_string(),
            vec![LanguagePair::new("en", "en")],
        );
        assert!(!gateway.supports("en", "en"));
    }

    #[tokio::test]
    async fn test_cached_translation_skips_endpoint() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::open(temp_dir.path().join("translations.db")).unwrap();
        let gateway = gateway().with_cache(cache);

        let translator = gateway.resolve("en", "ka").unwrap();
        let cache = translator.cache.as_ref().unwrap();
        cache
            .put(&translator.request("hello"), "გამარჯობა")
            .unwrap();

        assert_eq!(translator.translate("hello").await.unwrap(), "გამარჯობა");
    }

    #[tokio::test]
    async fn test_endpoint_failure_is_reported() {
        let translator = gateway().resolve("en", "ru").unwrap();
        let err = translator.translate("hello").await.unwrap_err();
        assert!(err.to_string().contains("Failed to connect"));
    }
}
