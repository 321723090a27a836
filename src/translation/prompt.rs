use super::language::language_name;

pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are a translator in a live chat. \
     Translate the following message from {source_language} to {target_language}. \
     Output only the translated message without any explanations, quotes or notes.";

#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_system_prompt(source_language: &str, target_language: &str) -> String {
    // {source_language} and {target_language} are replacement placeholders, not format arguments
    SYSTEM_PROMPT_TEMPLATE
        .replace("{source_language}", language_name(source_language))
        .replace("{target_language}", language_name(target_language))
}
