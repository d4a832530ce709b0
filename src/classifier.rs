//! Keyword-based category detection for monitoring messages.
//!
//! Classification is rule-based: the message is lowercased once and scanned
//! against per-category keyword lists in severity order. The first category
//! with any matching keyword wins; a message matching nothing is `general`.
//! Matching is substring containment, so "successfully" hits the `success`
//! keyword and multi-word phrases like "connection refused" match as a unit.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category assigned to a monitoring message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Error,
    Warning,
    Security,
    Info,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Error => "error",
            Category::Warning => "warning",
            Category::Security => "security",
            Category::Info => "info",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword lists checked in severity order. A message mentioning both a
/// failure and a resource threshold is an error, not a warning.
static CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Error,
        &[
            "error",
            "failed",
            "failure",
            "exception",
            "crash",
            "critical",
            "timeout",
            "connection refused",
            "unavailable",
            "unreachable",
            "fatal",
            "abort",
            "panic",
            "segfault",
            "core dump",
            "stack trace",
        ],
    ),
    (
        Category::Warning,
        &[
            "warning",
            "warn",
            "high",
            "low",
            "threshold",
            "exceeded",
            "approaching",
            "usage",
            "memory",
            "cpu",
            "disk",
            "performance",
            "degraded",
            "slow",
            "latency",
            "queue",
            "buffer",
            "limit",
        ],
    ),
    (
        Category::Security,
        &[
            "security",
            "unauthorized",
            "authentication",
            "permission",
            "denied",
            "blocked",
            "suspicious",
            "breach",
            "attack",
            "intrusion",
            "malware",
            "virus",
            "exploit",
            "vulnerability",
            "firewall",
            "access denied",
            "forbidden",
            "ssl",
            "certificate",
        ],
    ),
    (
        Category::Info,
        &[
            "started",
            "completed",
            "finished",
            "success",
            "healthy",
            "backup",
            "update",
            "restart",
            "loaded",
            "initialized",
            "ready",
            "online",
            "connected",
            "synced",
            "deployed",
            "created",
            "deleted",
            "modified",
        ],
    ),
];

/// Classify a monitoring message into a [`Category`].
///
/// Case-insensitive. Returns [`Category::General`] when no keyword from any
/// list appears in the text.
///
/// # Example
///
/// ```
/// use alert_babel::classifier::{classify, Category};
///
/// assert_eq!(classify("Database connection failed"), Category::Error);
/// assert_eq!(classify("CPU usage exceeded 80%"), Category::Warning);
/// ```
pub fn classify(text: &str) -> Category {
    let text_lower = text.to_lowercase();

    for (category, keywords) in CATEGORY_KEYWORDS {
        if let Some(keyword) = keywords.iter().find(|k| text_lower.contains(**k)) {
            tracing::debug!("Text classified as '{}' (keyword: '{}')", category, keyword);
            return *category;
        }
    }

    tracing::debug!("Text classified as 'general' (no keyword matches)");
    Category::General
}
