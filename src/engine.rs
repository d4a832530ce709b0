//! Engine seam: the boundary between the cache/executor and whatever
//! actually runs the models.
//!
//! [`ModelBackend`] turns a [`Language`] into a live [`ModelHandle`];
//! [`Engine`] bundles a handle with its language so the rest of the service
//! can hold `Arc<Engine>` values without caring how inference happens. The
//! production backend is the OPUS-MT daemon client in [`crate::opus`]; tests
//! substitute in-memory fakes.

use async_trait::async_trait;

use crate::error::TranslateError;
use crate::lang::Language;

/// Loads translation models on demand.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Load the model for `language` and return a ready-to-use handle.
    ///
    /// # Errors
    /// `LoadFailed` when the backend cannot fetch or initialize the model.
    /// Timeout enforcement is the caller's job, not the backend's.
    async fn load(&self, language: Language) -> Result<Box<dyn ModelHandle>, TranslateError>;
}

/// A loaded model for one target language.
#[async_trait]
pub trait ModelHandle: Send + Sync {
    /// Translate English `text` into this handle's language.
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;

    /// Release any backend resources held by this model.
    ///
    /// Called when the engine is evicted or the service shuts down. The
    /// default implementation is a no-op for backends with nothing to free.
    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A loaded, ready-to-use translation engine for one target language.
pub struct Engine {
    language: Language,
    handle: Box<dyn ModelHandle>,
}

impl Engine {
    pub fn new(language: Language, handle: Box<dyn ModelHandle>) -> Self {
        Engine { language, handle }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn code(&self) -> &'static str {
        self.language.code()
    }

    /// Translate English `text` into this engine's language.
    pub async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        self.handle.translate(text).await
    }

    /// Close the underlying model. Best-effort: failures are logged and
    /// swallowed so eviction and shutdown never stall on a broken backend.
    pub async fn close(&self) {
        if let Err(e) = self.handle.close().await {
            tracing::warn!("Failed to close model for {}: {:#}", self.code(), e);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("language", &self.language.code())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct EchoHandle {
        prefix: &'static str,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ModelHandle for EchoHandle {
        async fn translate(&self, text: &str) -> Result<String, TranslateError> {
            Ok(format!("{}{}", self.prefix, text))
        }

        async fn close(&self) -> anyhow::Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BrokenHandle;

    #[async_trait]
    impl ModelHandle for BrokenHandle {
        async fn translate(&self, _text: &str) -> Result<String, TranslateError> {
            Err(TranslateError::InferenceFailed("gpu on fire".to_string()))
        }

        async fn close(&self) -> anyhow::Result<()> {
            anyhow::bail!("already gone")
        }
    }

    #[tokio::test]
    async fn test_engine_delegates_translate() {
        let language = Language::from_code("de").unwrap();
        let engine = Engine::new(
            language,
            Box::new(EchoHandle {
                prefix: "[de] ",
                closed: Arc::new(AtomicUsize::new(0)),
            }),
        );

        assert_eq!(engine.code(), "de");
        assert_eq!(engine.language(), language);
        assert_eq!(engine.translate("hello").await.unwrap(), "[de] hello");
    }

    #[tokio::test]
    async fn test_engine_close_reaches_handle() {
        let closed = Arc::new(AtomicUsize::new(0));
        let engine = Engine::new(
            Language::from_code("es").unwrap(),
            Box::new(EchoHandle {
                prefix: "",
                closed: closed.clone(),
            }),
        );

        engine.close().await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_close_swallows_backend_errors() {
        let engine = Engine::new(Language::from_code("fr").unwrap(), Box::new(BrokenHandle));
        // Must not panic or propagate
        engine.close().await;
    }

    #[tokio::test]
    async fn test_engine_propagates_inference_errors() {
        let engine = Engine::new(Language::from_code("fr").unwrap(), Box::new(BrokenHandle));
        let err = engine.translate("hello").await.unwrap_err();
        assert_eq!(
            err,
            TranslateError::InferenceFailed("gpu on fire".to_string())
        );
    }

    #[test]
    fn test_engine_debug_shows_language() {
        let engine = Engine::new(
            Language::from_code("it").unwrap(),
            Box::new(EchoHandle {
                prefix: "",
                closed: Arc::new(AtomicUsize::new(0)),
            }),
        );
        assert!(format!("{engine:?}").contains("it"));
    }
}
