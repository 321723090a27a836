mod client;
mod gateway;
mod language;
mod llm;
mod prompt;

pub use client::{TextStream, TranslationClient, TranslationRequest};
pub use gateway::{LanguagePair, Translate, TranslationGateway, UnsupportedPair};
pub use language::{
    DEFAULT_PAIRS, SUPPORTED_LANGUAGES, default_pairs, language_name, print_languages,
    validate_language,
};
pub use llm::{LlmGateway, LlmTranslator};
