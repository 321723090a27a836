//! The translation capability consumed by a peer session.
//!
//! A [`TranslationGateway`] resolves a `(source, target)` language pair into
//! a [`Translate`] implementation bound to that direction, or reports the
//! pair as unsupported. Sessions receive the gateway by injection, so tests
//! can substitute a stub for the real endpoint.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use anyhow::{Result, bail};
use thiserror::Error;

/// Returned by [`TranslationGateway::resolve`] for pairs it cannot translate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language pair: {source_language} -> {target_language}")]
pub struct UnsupportedPair {
    pub source_language: String,
    pub target_language: String,
}

impl UnsupportedPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_language: source.into(),
            target_language: target.into(),
        }
    }
}

/// A translate function bound to one language direction.
pub trait Translate: Send + Sync + 'static {
    /// Translates `text`. May take a long time; may fail.
    fn translate(&self, text: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Synchronous closures work as translators, mainly for stubs.
impl<F> Translate for F
where
    F: Fn(&str) -> Result<String> + Send + Sync + 'static,
{
    fn translate(&self, text: &str) -> impl Future<Output = Result<String>> + Send {
        std::future::ready(self(text))
    }
}

/// Resolves translate functions for language pairs.
pub trait TranslationGateway: Send + Sync + 'static {
    type Translator: Translate;

    fn resolve(&self, source: &str, target: &str) -> Result<Self::Translator, UnsupportedPair>;
}

/// A directed language pair such as `en-ka`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn matches(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

impl FromStr for LanguagePair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((source, target)) = s.split_once('-') else {
            bail!("Invalid language pair: '{s}' (expected '<from>-<to>', e.g. en-ka)");
        };
        if source.is_empty() || target.is_empty() {
            bail!("Invalid language pair: '{s}' (expected '<from>-<to>', e.g. en-ka)");
        }
        if source == target {
            bail!("Invalid language pair: '{s}' (source and target must differ)");
        }
        Ok(Self::new(source, target))
    }
}
