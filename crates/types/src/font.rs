//! Font name hygiene shared by the model and the font registry.

const STYLE_SUFFIXES: [&str; 5] = ["Bold", "Italic", "Regular", "Light", "Medium"];

/// Canonical spelling of a declared font name: `"Times New Roman Bold"`
/// becomes `"TimesNewRoman-Bold"`. Already hyphenated styles are kept.
pub fn normalize_font_name(name: &str) -> String {
    let mut normalized: String = name.chars().filter(|c| *c != ' ').collect();
    for style in STYLE_SUFFIXES {
        let hyphenated = format!("-{style}");
        if normalized.contains(style) && !normalized.contains(&hyphenated) {
            normalized = normalized.replace(style, &hyphenated);
        }
    }
    if normalized == "TimesNewRoman" {
        normalized = "Times-Roman".to_string();
    }
    normalized
}

/// Rejects values that are clearly not font names (URLs, mail addresses,
/// control characters, overly long strings).
pub fn is_valid_font_name(name: &str) -> bool {
    let n = name.trim();
    if n.is_empty() || n.chars().count() > 80 {
        return false;
    }
    let lower = n.to_lowercase();
    if lower.contains("http://") || lower.contains("https://") || lower.contains("mailto:") {
        return false;
    }
    !n.chars().any(|c| matches!(c, ':' | '@' | '\n' | '\r' | '\t'))
}
