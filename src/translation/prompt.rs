use sha2::{Digest, Sha256};

use super::gateway::{GatewayParams, GatewayRequest};
use super::language::language_name;
use crate::xliff::BOUNDARY_TOKEN;

pub const UNIT_SYSTEM_PROMPT: &str = "You are a professional translator specializing in UI and e-learning content. \
     You follow instructions precisely and preserve all formatting markers.";

pub const BATCH_SYSTEM_PROMPT: &str = "You are a professional translator specializing in UI and e-learning content. \
     You follow instructions precisely and return valid JSON.";

/// Context given to every prompt before any user-supplied context.
pub const DEFAULT_CONTEXT: &[&str] = &[
    "This is user interface and e-learning course content.",
    "Ensure consistency in terminology and translations across all segments.",
    "Adapt idioms naturally to the target language rather than translating literally.",
    "Keep the tone and formality level of the source text.",
];

const WHITESPACE_RULES: &[&str] = &[
    "   - If source text ends with a space, translation MUST end with a space",
    "   - If source text starts with a space, translation MUST start with a space",
    "   - Preserve line breaks (\\n) and other whitespace characters exactly",
    "   - Text segments are rendered without automatic spacing, so missing spaces run words together",
];

/// Hash over every template that shapes a prompt. Part of the cache key so
/// that prompt changes invalidate cached translations.
pub fn prompt_hash() -> String {
    let mut hasher = Sha256::new();
    hasher.update(UNIT_SYSTEM_PROMPT.as_bytes());
    hasher.update(BATCH_SYSTEM_PROMPT.as_bytes());
    for line in DEFAULT_CONTEXT.iter().chain(WHITESPACE_RULES) {
        hasher.update(line.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn describe_language(code: &str) -> String {
    language_name(code).map_or_else(|| code.to_string(), |name| format!("{name} ({code})"))
}

fn direction(params: &GatewayParams) -> String {
    let target = describe_language(&params.target_language);
    params.source_language.as_deref().map_or_else(
        || format!("to {target}"),
        |source| format!("from {} to {target}", describe_language(source)),
    )
}

fn push_context(lines: &mut Vec<String>, params: &GatewayParams) {
    lines.push("CONTEXT:".to_string());
    lines.extend(DEFAULT_CONTEXT.iter().map(ToString::to_string));
    if let Some(extra) = params.extra_context.as_deref().filter(|c| !c.trim().is_empty()) {
        lines.push(String::new());
        lines.push(extra.trim().to_string());
    }
    lines.push(String::new());
}

fn quoted_terms(terms: &[String]) -> String {
    terms
        .iter()
        .map(|term| format!("\"{term}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt for translating a single unit.
pub fn build_unit_prompt(request: &GatewayRequest, params: &GatewayParams) -> String {
    let mut lines = vec![
        format!("Translate the following text {}.", direction(params)),
        String::new(),
    ];
    push_context(&mut lines, params);

    lines.push("CRITICAL RULES:".to_string());
    let mut rule = 1;

    if request.has_boundary_tokens {
        lines.extend([
            format!("{rule}. The text contains {BOUNDARY_TOKEN} markers. These are STRUCTURAL MARKERS."),
            format!("   - You MUST preserve EVERY {BOUNDARY_TOKEN} marker EXACTLY as-is"),
            format!("   - Do NOT translate, modify, move, or remove {BOUNDARY_TOKEN} markers"),
            format!("   - Keep {BOUNDARY_TOKEN} in the same relative positions in the translation"),
            String::new(),
        ]);
        rule += 1;
    }

    if !params.preserve_terms.is_empty() {
        lines.extend([
            format!(
                "{rule}. Do NOT translate these brand/product names: {}",
                quoted_terms(&params.preserve_terms)
            ),
            "   - Keep them exactly as written in the source text".to_string(),
            String::new(),
        ]);
        rule += 1;
    }

    lines.push(format!("{rule}. PRESERVE ALL WHITESPACE:"));
    lines.extend(WHITESPACE_RULES.iter().map(ToString::to_string));
    lines.push(String::new());
    rule += 1;

    lines.extend([
        format!("{rule}. OUTPUT FORMAT:"),
        "   - Provide ONLY the translated text".to_string(),
        "   - No explanations, no notes, no markdown formatting".to_string(),
        String::new(),
        "TEXT TO TRANSLATE:".to_string(),
        request.text.clone(),
    ]);

    lines.join("\n")
}

/// Prompt for translating several units in one JSON round trip.
pub fn build_batch_prompt(batch: &[GatewayRequest], params: &GatewayParams) -> String {
    let mut lines = vec![
        format!(
            "Translate the following {} text units {}.",
            batch.len(),
            direction(params)
        ),
        String::new(),
    ];
    push_context(&mut lines, params);

    lines.extend([
        "CRITICAL RULES:".to_string(),
        "1. Return valid JSON only - no other text".to_string(),
        r#"2. Format: {"translations": [{"id": "unit_id", "text": "translated text"}, ...]}"#
            .to_string(),
        format!(
            "3. Preserve {BOUNDARY_TOKEN} markers EXACTLY if present (do not translate, move, or remove)"
        ),
        "4. PRESERVE ALL WHITESPACE:".to_string(),
    ]);
    lines.extend(WHITESPACE_RULES.iter().map(ToString::to_string));

    if !params.preserve_terms.is_empty() {
        lines.push(format!(
            "5. Do NOT translate these terms: {}",
            quoted_terms(&params.preserve_terms)
        ));
    }

    lines.extend([String::new(), "UNITS TO TRANSLATE:".to_string(), String::new()]);

    for request in batch {
        let marker = if request.text.contains(BOUNDARY_TOKEN) {
            format!(" [CONTAINS {BOUNDARY_TOKEN} - PRESERVE EXACTLY]")
        } else {
            String::new()
        };
        lines.push(format!("ID: {}{marker}", request.id));
        lines.push(format!("TEXT: {}", request.text));
        lines.push(String::new());
    }

    lines.push("Return JSON with all translations:".to_string());
    lines.join("\n")
}
