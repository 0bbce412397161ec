/// Substituted when generation returns no text.
pub const NO_TEXT_GENERATED: &str = "Error: No text generated.";

/// Substituted when refinement returns no text.
pub const NO_TEXT_REFINED: &str = "Error: No text generated during refinement.";

/// Strips a leading ```` ```markdown ```` (any case) or ```` ``` ```` fence and
/// a trailing ```` ``` ```` fence, then trims. Empty output becomes `placeholder`.
pub fn clean_generated_text(raw: &str, placeholder: &str) -> String {
    let text = raw.trim();
    let text = match text.get(..11) {
        Some(prefix) if prefix.eq_ignore_ascii_case("```markdown") => &text[11..],
        _ => text.strip_prefix("```").unwrap_or(text),
    };
    let text = text.trim_start();
    let text = text.strip_suffix("```").unwrap_or(text).trim();

    if text.is_empty() {
        placeholder.to_string()
    } else {
        text.to_string()
    }
}
