//! Classify English monitoring messages and fan them out into multiple
//! languages through locally served OPUS-MT models.
//!
//! The pipeline: validate, classify ([`classifier`]), then translate into
//! each requested language ([`executor`]) against a bounded cache of loaded
//! models ([`cache`]) backed by an HTTP model daemon ([`opus`]). The
//! [`service`] module ties the pipeline together and [`worker`] runs it one
//! request at a time behind a bounded queue, keeping introspection
//! responsive while a translation is in flight.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod lang;
pub mod metrics;
pub mod opus;
pub mod schema;
pub mod service;
pub mod worker;

pub use cache::ModelCache;
pub use classifier::{classify, Category};
pub use config::Config;
pub use error::{ServiceError, TranslateError};
pub use schema::{TranslateRequest, TranslateResponse};
pub use service::TranslationService;
pub use worker::{start_worker, ServiceHandle};
