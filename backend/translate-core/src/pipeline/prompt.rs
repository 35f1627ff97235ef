//! Fixed instruction prompt.

/// Build the prompt for one translation. Every model in the chain gets the same text.
pub fn build_prompt(target_language: &str, source_text: &str) -> String {
    format!(
        "Translate ONLY to {target_language}. Respond with JUST the translation:\n\
         \n\
         {source_text}\n\
         \n\
         RULES:\n\
         - Single paragraph only\n\
         - No explanations, no options, no formatting\n\
         - Plain text only"
    )
}
