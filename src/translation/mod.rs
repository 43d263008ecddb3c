mod cached;
mod client;
mod gateway;
mod language;
mod openai;
mod prompt;

pub use cached::CachedGateway;
pub use client::{ChatBackend, ChatClient, ChatRequest, TEMPERATURE};
pub use gateway::{
    Gateway, GatewayParams, GatewayRequest, GatewayStats, MISSING_OUTCOME, OutcomeSet,
    TranslationOutcome,
};
pub use language::{SUPPORTED_LANGUAGES, language_name, print_languages, validate_language};
pub use openai::{
    DEFAULT_BATCH_SIZE, GatewayMode, MAX_RETRIES, OpenAiGateway, Pacing, Rejection,
    parse_batch_response, validate_translation,
};
pub use prompt::{build_batch_prompt, build_unit_prompt, prompt_hash};
