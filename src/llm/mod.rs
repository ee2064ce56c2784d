//! Anomaly explanations via a text-completion capability.
//!
//! The [`Explainer`] formats a one-off hypothesis request for a flagged
//! week, routes it to the configured backend, and memoizes both the
//! constructed backend handle and the returned explanations for the
//! session. Every failure path degrades to a canned templated sentence;
//! nothing here ever propagates an error to the interaction flow.

pub mod backend;
pub mod error;

use std::sync::Arc;

use chrono::NaiveDate;

pub use backend::{CompletionRequest, OllamaBackend, OpenAiBackend, TextCompletion};
pub use error::LlmError;

use crate::cache::SessionCache;
use crate::config::{region_display_name, LlmConfig, LlmProvider};
use crate::models::ChangeDirection;

const BACKEND_TIMEOUT_SECS: u64 = 60;

/// Build the hypothesis request prompt for one flagged week.
pub fn build_explanation_prompt(
    keyword: &str,
    date: NaiveDate,
    direction_word: &str,
    region_display: &str,
) -> String {
    format!(
        "Explain why search interest in '{keyword}' might have {direction_word} on \
         {date} in {region_display}. Give a concise 2-3 sentence hypothesis."
    )
}

/// Where an explanation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationSource {
    /// Generated by a text-completion backend.
    Model,
    /// Canned templated sentence; backend absent or failed.
    Fallback,
}

/// One explanation, with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

/// Model-configuration tuple keying the constructed backend handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BackendKey {
    provider: LlmProvider,
    model: String,
    base_url: String,
    api_token: Option<String>,
}

type ExplanationKey = (String, NaiveDate, ChangeDirection);

/// Explanation capability over an interchangeable text-completion backend.
pub struct Explainer {
    config: LlmConfig,
    region: String,
    api_token: Option<String>,
    backends: SessionCache<BackendKey, Option<Arc<dyn TextCompletion>>>,
    explanations: Arc<SessionCache<ExplanationKey, Explanation>>,
}

impl Explainer {
    /// `api_token` is the already-resolved secret; `None` silently selects
    /// the canned-explanation path.
    pub fn new(config: LlmConfig, region: String, api_token: Option<String>) -> Self {
        Self::with_cache(config, region, api_token, Arc::new(SessionCache::new()))
    }

    /// Explainer over a shared explanation memo.
    pub fn with_cache(
        config: LlmConfig,
        region: String,
        api_token: Option<String>,
        explanations: Arc<SessionCache<ExplanationKey, Explanation>>,
    ) -> Self {
        Self {
            config,
            region,
            api_token,
            backends: SessionCache::new(),
            explanations,
        }
    }

    /// Explain one flagged week. Memoized per (keyword, date, direction)
    /// for the session; never fails.
    pub async fn explain(
        &self,
        keyword: &str,
        date: NaiveDate,
        direction: ChangeDirection,
    ) -> Explanation {
        let key = (keyword.to_string(), date, direction);
        if let Some(hit) = self.explanations.get(&key) {
            tracing::debug!(keyword = %keyword, date = %date, "explanation cache hit");
            return hit;
        }

        let explanation = self.generate(keyword, date, direction).await;
        self.explanations.insert(key, explanation.clone());
        explanation
    }

    async fn generate(
        &self,
        keyword: &str,
        date: NaiveDate,
        direction: ChangeDirection,
    ) -> Explanation {
        let direction_word = match direction {
            ChangeDirection::None => "changed",
            d => d.as_str(),
        };

        let Some(backend) = self.backend().await else {
            return fallback_explanation(keyword, date, direction_word);
        };

        let request = CompletionRequest {
            prompt: build_explanation_prompt(
                keyword,
                date,
                direction_word,
                region_display_name(&self.region),
            ),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::info!(
            backend = %backend.describe(),
            keyword = %keyword,
            date = %date,
            "requesting explanation"
        );

        match backend.complete(&request).await {
            Ok(text) => Explanation {
                text,
                source: ExplanationSource::Model,
            },
            Err(e) => {
                tracing::warn!(error = %e, "explanation generation failed");
                fallback_explanation(keyword, date, direction_word)
            }
        }
    }

    /// Construct (or replay) the configured backend handle. `None` when no
    /// backend is configured or construction failed.
    async fn backend(&self) -> Option<Arc<dyn TextCompletion>> {
        let key = self.backend_key()?;
        if let Some(handle) = self.backends.get(&key) {
            return handle;
        }

        let handle = self.construct_backend().await;
        self.backends.insert(key, handle.clone());
        handle
    }

    fn backend_key(&self) -> Option<BackendKey> {
        match self.config.provider {
            LlmProvider::None => None,
            LlmProvider::OpenAi => Some(BackendKey {
                provider: LlmProvider::OpenAi,
                model: self.config.openai_model.clone(),
                base_url: self.config.openai_base_url.clone(),
                api_token: self.api_token.clone(),
            }),
            LlmProvider::Ollama => Some(BackendKey {
                provider: LlmProvider::Ollama,
                model: self.config.ollama_model.clone(),
                base_url: self.config.ollama_base_url.clone(),
                api_token: None,
            }),
        }
    }

    async fn construct_backend(&self) -> Option<Arc<dyn TextCompletion>> {
        match self.config.provider {
            LlmProvider::None => None,
            LlmProvider::OpenAi => {
                let token = self.api_token.as_deref()?;
                match OpenAiBackend::new(
                    &self.config.openai_base_url,
                    &self.config.openai_model,
                    token,
                    BACKEND_TIMEOUT_SECS,
                ) {
                    Ok(backend) => Some(Arc::new(backend)),
                    Err(e) => {
                        tracing::warn!(error = %e, "hosted backend construction failed");
                        None
                    }
                }
            }
            LlmProvider::Ollama => {
                let backend = match OllamaBackend::new(
                    &self.config.ollama_base_url,
                    &self.config.ollama_model,
                    BACKEND_TIMEOUT_SECS,
                ) {
                    Ok(backend) => backend,
                    Err(e) => {
                        tracing::warn!(error = %e, "local backend construction failed");
                        return None;
                    }
                };
                if !backend.is_available().await {
                    tracing::warn!(
                        endpoint = %self.config.ollama_base_url,
                        "local model server not reachable"
                    );
                    return None;
                }
                Some(Arc::new(backend))
            }
        }
    }
}

/// Canned templated sentence embedding keyword, ISO date and direction.
fn fallback_explanation(keyword: &str, date: NaiveDate, direction_word: &str) -> Explanation {
    Explanation {
        text: format!(
            "(Demo) Possible reason searches for '{keyword}' {direction_word} around \
             {date}: seasonal events, news cycles, or viral content."
        ),
        source: ExplanationSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let prompt = build_explanation_prompt(
            "electric cars",
            date("2023-06-11"),
            "spiked",
            "the United States",
        );
        assert_eq!(
            prompt,
            "Explain why search interest in 'electric cars' might have spiked on \
             2023-06-11 in the United States. Give a concise 2-3 sentence hypothesis."
        );
    }

    #[tokio::test]
    async fn test_no_token_falls_back_without_network() {
        let explainer = Explainer::new(LlmConfig::default(), "US".to_string(), None);
        let explanation = explainer
            .explain("electric cars", date("2023-06-11"), ChangeDirection::Spiked)
            .await;

        assert_eq!(explanation.source, ExplanationSource::Fallback);
        assert!(explanation.text.contains("electric cars"));
        assert!(explanation.text.contains("2023-06-11"));
        assert!(explanation.text.contains("spiked"));
    }

    #[tokio::test]
    async fn test_provider_none_falls_back() {
        let config = LlmConfig {
            provider: LlmProvider::None,
            ..LlmConfig::default()
        };
        let explainer = Explainer::new(config, "US".to_string(), Some("sk-live".to_string()));
        let explanation = explainer
            .explain("rust", date("2023-03-05"), ChangeDirection::Dropped)
            .await;
        assert_eq!(explanation.source, ExplanationSource::Fallback);
        assert!(explanation.text.contains("dropped"));
    }

    #[tokio::test]
    async fn test_undirected_change_reads_changed() {
        let explainer = Explainer::new(LlmConfig::default(), "US".to_string(), None);
        let explanation = explainer
            .explain("rust", date("2023-03-05"), ChangeDirection::None)
            .await;
        assert!(explanation.text.contains("changed"));
    }

    #[tokio::test]
    async fn test_explanations_are_memoized() {
        let explainer = Explainer::new(LlmConfig::default(), "US".to_string(), None);
        let first = explainer
            .explain("rust", date("2023-03-05"), ChangeDirection::Spiked)
            .await;
        let second = explainer
            .explain("rust", date("2023-03-05"), ChangeDirection::Spiked)
            .await;
        assert_eq!(first, second);
    }
}
