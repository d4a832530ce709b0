//! HTTP client for the local OPUS-MT inference daemon.
//!
//! The daemon hosts Helsinki-NLP OPUS-MT models behind three endpoints:
//! `POST /models/load`, `POST /translate` and `POST /models/unload`. It runs
//! on the same host as this service (default `http://127.0.0.1:8090`), so
//! message text never leaves the machine.
//!
//! Load and unload are judged by HTTP status alone; only `/translate` has a
//! response body worth parsing. Timeouts are enforced by the callers (the
//! cache bounds loads, the executor bounds whole requests), not here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{ModelBackend, ModelHandle};
use crate::error::TranslateError;
use crate::lang::Language;

/// Request body for `/models/load` and `/models/unload`.
#[derive(Debug, Serialize)]
struct ModelRequest<'a> {
    model: &'a str,
}

/// Request body for `/translate`.
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    model: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct InferenceReply {
    translation: String,
}

/// Backend that loads models by asking the OPUS-MT daemon to pin them in
/// memory.
pub struct OpusBackend {
    client: reqwest::Client,
    base_url: String,
}

impl OpusBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        OpusBackend {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ModelBackend for OpusBackend {
    async fn load(&self, language: Language) -> Result<Box<dyn ModelHandle>, TranslateError> {
        let model = language.model();
        info!("Loading model {} for '{}'...", model, language.code());

        let response = self
            .client
            .post(self.url("/models/load"))
            .json(&ModelRequest { model })
            .send()
            .await
            .map_err(|e| TranslateError::LoadFailed(format!("model daemon unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslateError::LoadFailed(format!(
                "model daemon returned {status}: {body}"
            )));
        }

        info!("✓ Model loaded for '{}'", language.code());
        Ok(Box::new(OpusHandle {
            client: self.client.clone(),
            model,
            translate_url: self.url("/translate"),
            unload_url: self.url("/models/unload"),
        }))
    }
}

/// A model pinned in the daemon's memory.
struct OpusHandle {
    client: reqwest::Client,
    model: &'static str,
    translate_url: String,
    unload_url: String,
}

#[async_trait]
impl ModelHandle for OpusHandle {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(&self.translate_url)
            .json(&InferenceRequest {
                model: self.model,
                text,
            })
            .send()
            .await
            .map_err(|e| {
                TranslateError::InferenceFailed(format!("model daemon unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslateError::InferenceFailed(format!(
                "model daemon returned {status}: {body}"
            )));
        }

        let reply: InferenceReply = response.json().await.map_err(|e| {
            TranslateError::InferenceFailed(format!("malformed daemon response: {e}"))
        })?;

        Ok(reply.translation)
    }

    async fn close(&self) -> anyhow::Result<()> {
        debug!("Unloading model {}", self.model);

        let response = self
            .client
            .post(&self.unload_url)
            .json(&ModelRequest { model: self.model })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("model daemon returned {status} for unload: {body}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loaded_body() -> serde_json::Value {
        serde_json::json!({ "status": "loaded" })
    }

    // ==================== Load Tests ====================

    #[tokio::test]
    async fn test_load_success_returns_working_handle() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/load"))
            .and(body_json(
                serde_json::json!({ "model": "Helsinki-NLP/opus-mt-en-de" }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(loaded_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "translation": "Datenbankverbindung fehlgeschlagen"
            })))
            .mount(&mock_server)
            .await;

        let backend = OpusBackend::new(mock_server.uri());
        let handle = backend
            .load(Language::from_code("de").unwrap())
            .await
            .expect("load should succeed");

        let translated = handle
            .translate("Database connection failed")
            .await
            .expect("translate should succeed");
        assert_eq!(translated, "Datenbankverbindung fehlgeschlagen");
    }

    #[tokio::test]
    async fn test_load_http_error_maps_to_load_failed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/load"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not found on disk"))
            .mount(&mock_server)
            .await;

        let backend = OpusBackend::new(mock_server.uri());
        let err = backend
            .load(Language::from_code("uk").unwrap())
            .await
            .err()
            .expect("load should fail");

        match err {
            TranslateError::LoadFailed(msg) => {
                assert!(msg.contains("500"), "message should carry status: {msg}");
                assert!(msg.contains("model not found on disk"));
            }
            other => panic!("expected LoadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_unreachable_daemon_maps_to_load_failed() {
        // .invalid never resolves, so this fails fast at the DNS layer
        let backend = OpusBackend::new("http://opus-daemon.invalid");
        let err = backend
            .load(Language::from_code("de").unwrap())
            .await
            .err()
            .expect("load should fail");

        assert!(matches!(err, TranslateError::LoadFailed(_)));
    }

    #[tokio::test]
    async fn test_load_sends_tc_big_model_for_portuguese() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/load"))
            .and(body_json(
                serde_json::json!({ "model": "Helsinki-NLP/opus-mt-tc-big-en-pt" }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(loaded_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = OpusBackend::new(mock_server.uri());
        backend
            .load(Language::from_code("pt").unwrap())
            .await
            .expect("load should succeed");
    }

    // ==================== Translate Tests ====================

    #[tokio::test]
    async fn test_translate_http_error_maps_to_inference_failed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(loaded_body()))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model swapped out"))
            .mount(&mock_server)
            .await;

        let backend = OpusBackend::new(mock_server.uri());
        let handle = backend.load(Language::from_code("es").unwrap()).await.unwrap();

        let err = handle.translate("hello").await.unwrap_err();
        match err {
            TranslateError::InferenceFailed(msg) => assert!(msg.contains("503")),
            other => panic!("expected InferenceFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_translate_malformed_body_maps_to_inference_failed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(loaded_body()))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&mock_server)
            .await;

        let backend = OpusBackend::new(mock_server.uri());
        let handle = backend.load(Language::from_code("fr").unwrap()).await.unwrap();

        let err = handle.translate("hello").await.unwrap_err();
        match err {
            TranslateError::InferenceFailed(msg) => assert!(msg.contains("malformed")),
            other => panic!("expected InferenceFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_translate_sends_model_and_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(loaded_body()))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(serde_json::json!({
                "model": "Helsinki-NLP/opus-mt-en-it",
                "text": "Backup completed"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "translation": "Backup completato"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = OpusBackend::new(mock_server.uri());
        let handle = backend.load(Language::from_code("it").unwrap()).await.unwrap();
        let translated = handle.translate("Backup completed").await.unwrap();
        assert_eq!(translated, "Backup completato");
    }

    // ==================== Unload Tests ====================

    #[tokio::test]
    async fn test_close_unloads_model() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(loaded_body()))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/models/unload"))
            .and(body_json(
                serde_json::json!({ "model": "Helsinki-NLP/opus-mt-en-da" }),
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = OpusBackend::new(mock_server.uri());
        let handle = backend.load(Language::from_code("da").unwrap()).await.unwrap();
        handle.close().await.expect("unload should succeed");
    }

    #[tokio::test]
    async fn test_close_reports_daemon_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(loaded_body()))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/models/unload"))
            .respond_with(ResponseTemplate::new(500).set_body_string("busy"))
            .mount(&mock_server)
            .await;

        let backend = OpusBackend::new(mock_server.uri());
        let handle = backend.load(Language::from_code("el").unwrap()).await.unwrap();

        let err = handle.close().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    // ==================== URL Handling Tests ====================

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = OpusBackend::new("http://127.0.0.1:8090/");
        assert_eq!(backend.url("/translate"), "http://127.0.0.1:8090/translate");
    }
}
