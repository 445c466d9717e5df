use crate::api::GenerationService;
use crate::models::{Document, GenerationRequest};
use crate::sanitize::sanitize;
use chrono::Utc;
use std::sync::Arc;

// Shown when the service can't be reached or answers with garbage
pub const FAILURE_FALLBACK: &str = "Terjadi kesalahan saat membuat konten.";
// Shown when the service answers but has nothing to say
pub const EMPTY_RESULT_FALLBACK: &str = "Tidak ada hasil.";

#[derive(Clone, Debug, PartialEq)]
pub enum GenerationOutcome {
    Generated(Document),
    Fallback(String),
}

impl GenerationOutcome {
    // Text the result viewer should show either way
    pub fn display_text(&self) -> &str {
        match self {
            GenerationOutcome::Generated(doc) => &doc.content,
            GenerationOutcome::Fallback(text) => text,
        }
    }
}

/// Runs one request against the generation service and never fails: errors
/// degrade to a fixed fallback text.
#[derive(Clone)]
pub struct GenerationClient {
    service: Arc<dyn GenerationService>,
}

impl GenerationClient {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self { service }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let response = match self.service.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Generation failed for topic '{}': {:?}", request.topic, e);
                return GenerationOutcome::Fallback(FAILURE_FALLBACK.to_string());
            }
        };

        let content = response
            .result
            .as_deref()
            .map(sanitize)
            .unwrap_or_default();

        if content.is_empty() {
            log::warn!("Generation service returned no usable result for '{}'", request.topic);
            return GenerationOutcome::Fallback(EMPTY_RESULT_FALLBACK.to_string());
        }

        GenerationOutcome::Generated(Document {
            id: None,
            topic: request.topic.clone(),
            content,
            category: request.category.clone(),
            content_type: request.content_type.clone(),
            created_at: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::build;
    use crate::models::{FormInput, GenerationResponse};
    use anyhow::Result;
    use async_trait::async_trait;

    struct CannedService(Option<Result<GenerationResponse, String>>);

    #[async_trait]
    impl GenerationService for CannedService {
        async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResponse> {
            match &self.0 {
                Some(Ok(response)) => Ok(GenerationResponse {
                    result: response.result.clone(),
                }),
                Some(Err(msg)) => Err(anyhow::anyhow!(msg.clone())),
                None => Ok(GenerationResponse::default()),
            }
        }
    }

    fn request() -> GenerationRequest {
        build(&FormInput {
            topic: "Fotosintesis".into(),
            ..Default::default()
        })
        .unwrap()
    }

    fn client(canned: Option<Result<GenerationResponse, String>>) -> GenerationClient {
        GenerationClient::new(Arc::new(CannedService(canned)))
    }

    #[tokio::test]
    async fn success_is_sanitized() {
        let canned = Some(Ok(GenerationResponse {
            result: Some("## **Fotosintesis** adalah proses<|eot|>".into()),
        }));
        match client(canned).generate(&request()).await {
            GenerationOutcome::Generated(doc) => {
                assert!(!doc.content.contains("**"));
                assert!(!doc.content.contains("<|"));
                assert!(doc.content.starts_with("Fotosintesis adalah proses"));
                assert_eq!(doc.topic, "Fotosintesis");
                assert!(doc.id.is_none());
                assert!(doc.created_at.is_some());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_error_degrades_to_fallback() {
        let outcome = client(Some(Err("connection refused".into()))).generate(&request()).await;
        assert_eq!(outcome, GenerationOutcome::Fallback(FAILURE_FALLBACK.into()));
        assert_eq!(outcome.display_text(), FAILURE_FALLBACK);
    }

    #[tokio::test]
    async fn missing_result_degrades_to_empty_fallback() {
        let outcome = client(None).generate(&request()).await;
        assert_eq!(outcome, GenerationOutcome::Fallback(EMPTY_RESULT_FALLBACK.into()));
    }

    #[tokio::test]
    async fn markup_only_result_counts_as_empty() {
        let canned = Some(Ok(GenerationResponse {
            result: Some("** ## **".into()),
        }));
        let outcome = client(canned).generate(&request()).await;
        assert_eq!(outcome, GenerationOutcome::Fallback(EMPTY_RESULT_FALLBACK.into()));
    }
}
