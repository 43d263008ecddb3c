//! Language code validation and supported languages.

use anyhow::Result;

use crate::ui::Style;

/// Supported language codes (ISO 639-1) and their names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("am", "Amharic"),
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("bn", "Bengali"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("eu", "Basque"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fil", "Filipino"),
    ("fr", "French"),
    ("ga", "Irish"),
    ("gl", "Galician"),
    ("gu", "Gujarati"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("hy", "Armenian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ka", "Georgian"),
    ("kk", "Kazakh"),
    ("km", "Khmer"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("la", "Latin"),
    ("lo", "Lao"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mk", "Macedonian"),
    ("ml", "Malayalam"),
    ("mn", "Mongolian"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("mt", "Maltese"),
    ("my", "Myanmar (Burmese)"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pa", "Punjabi"),
    ("pl", "Polish"),
    ("ps", "Pashto"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("si", "Sinhala"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sq", "Albanian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tl", "Tagalog"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("uz", "Uzbek"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
];

/// Prints all supported language codes to stdout.
pub fn print_languages() {
    println!("{}", Style::header("Supported language codes (ISO 639-1)"));
    for (code, name) in SUPPORTED_LANGUAGES {
        println!("  {:5} {}", Style::code(code), Style::secondary(name));
    }
    println!();
    println!(
        "{}",
        Style::hint("Regional variants such as de-DE or pt-BR are accepted as well.")
    );
}

/// English name of a language code, used in prompts.
///
/// Regional variants resolve through their primary subtag, so `de-AT`
/// becomes "German (AT)".
pub fn language_name(code: &str) -> Option<String> {
    if let Some((_, name)) = SUPPORTED_LANGUAGES.iter().find(|(c, _)| *c == code) {
        return Some((*name).to_string());
    }

    let (primary, region) = code.split_once('-')?;
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == primary)
        .map(|(_, name)| format!("{name} ({region})"))
}

/// Validates that the given language code is supported.
///
/// Known codes are accepted as is; `xx-YY` variants are accepted when `xx`
/// is known and the region is 2-3 ASCII letters or digits.
///
/// # Errors
///
/// Returns an error if the language code is not in the supported list.
pub fn validate_language(lang: &str) -> Result<()> {
    if is_supported(lang) {
        Ok(())
    } else {
        anyhow::bail!(
            "Invalid language code: '{lang}'\n\n\
             Valid language codes (ISO 639-1): es, fr, de, ja, pt-BR, de-DE, ...\n\
             Run 'xlft languages' to see all supported codes."
        )
    }
}

fn is_supported(lang: &str) -> bool {
    if SUPPORTED_LANGUAGES.iter().any(|(code, _)| *code == lang) {
        return true;
    }

    let Some((primary, region)) = lang.split_once('-') else {
        return false;
    };
    (2..=3).contains(&region.len())
        && region.chars().all(|c| c.is_ascii_alphanumeric())
        && SUPPORTED_LANGUAGES.iter().any(|(code, _)| *code == primary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language_valid() {
        assert!(validate_language("ja").is_ok());
        assert!(validate_language("es").is_ok());
        assert!(validate_language("zh-TW").is_ok());
    }

    #[test]
    fn test_validate_language_regional_variants() {
        assert!(validate_language("de-DE").is_ok());
        assert!(validate_language("pt-BR").is_ok());
        assert!(validate_language("es-419").is_ok());
        assert!(validate_language("xx-DE").is_err());
        assert!(validate_language("de-").is_err());
        assert!(validate_language("de-GERMANY").is_err());
    }

    #[test]
    fn test_validate_language_invalid() {
        assert!(validate_language("invalid").is_err());
        assert!(validate_language("").is_err());
        assert!(validate_language("JP").is_err()); // Case sensitive
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("fr").as_deref(), Some("French"));
        assert_eq!(language_name("zh-TW").as_deref(), Some("Chinese (Traditional)"));
        assert_eq!(language_name("pt-BR").as_deref(), Some("Portuguese (BR)"));
        assert_eq!(language_name("qq"), None);
    }
}
