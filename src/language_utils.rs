use anyhow::{Result, anyhow};
use isolang::Language;

/// Locale code utilities
///
/// This module provides functions for working with the locale codes used
/// as keys in localized-text values (`ko_KR`, `en_US`, `th_TH`, ...) and
/// for mapping them to the bare ISO 639-1 language codes the translation
/// API expects (`ko`, `en`, `th`, ...).
/// Split a locale code into its language and optional region parts.
///
/// Accepts both `ko_KR` and `ko-KR` spellings; the language part is
/// lowercased and the region part uppercased.
pub fn split_locale(locale: &str) -> Result<(String, Option<String>)> {
    let trimmed = locale.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty locale code"));
    }

    let mut parts = trimmed.splitn(2, ['_', '-']);
    let language = parts
        .next()
        .ok_or_else(|| anyhow!("Invalid locale code: {}", locale))?
        .to_lowercase();
    let region = parts.next().map(|r| r.to_uppercase());

    if language.is_empty() {
        return Err(anyhow!("Invalid locale code: {}", locale));
    }

    Ok((language, region))
}

/// Extract the API language code from a locale code.
///
/// `ko_KR` becomes `ko`, `en-US` becomes `en`. The language part must be
/// a valid ISO 639-1 code since that is what the translation API accepts.
pub fn api_language_code(locale: &str) -> Result<String> {
    let (language, _) = split_locale(locale)?;

    if language.len() == 2 && Language::from_639_1(&language).is_some() {
        return Ok(language);
    }

    // Some exports carry 3-letter codes; map them down to 639-1 when one exists
    if language.len() == 3 {
        if let Some(lang) = Language::from_639_3(&language) {
            if let Some(part1) = lang.to_639_1() {
                return Ok(part1.to_string());
            }
        }
    }

    Err(anyhow!("Locale {} has no ISO 639-1 language code", locale))
}

/// Validate that a locale code has a recognizable language part
pub fn validate_locale(locale: &str) -> Result<()> {
    api_language_code(locale).map(|_| ())
}

/// Check if two locale codes refer to the same language, ignoring region
pub fn locale_languages_match(locale1: &str, locale2: &str) -> bool {
    match (api_language_code(locale1), api_language_code(locale2)) {
        (Ok(l1), Ok(l2)) => l1 == l2,
        _ => false,
    }
}

/// Get the English language name for a locale code
pub fn language_name(locale: &str) -> Result<String> {
    let code = api_language_code(locale)?;
    let lang = Language::from_639_1(&code)
        .ok_or_else(|| anyhow!("Failed to resolve language for code: {}", code))?;

    Ok(lang.to_name().to_string())
}
