use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BOLD_MARKERS: Regex = Regex::new(r"\*\*").unwrap();
    static ref MARKUP_CHARS: Regex = Regex::new(r"[#*_`~>|]").unwrap();
    static ref MODEL_TAGS: Regex = Regex::new(r"<\|.*?\|>").unwrap();
    static ref LINE_BREAKS: Regex = Regex::new(r"\r?\n").unwrap();
}

/// Strips markdown residue and model control tags from generated text.
///
/// Passes run in a fixed order: bold markers, single markup characters,
/// `<|...|>` tags, then surrounding whitespace. Never fails.
pub fn sanitize(raw: &str) -> String {
    let text = BOLD_MARKERS.replace_all(raw, "");
    let text = MARKUP_CHARS.replace_all(&text, "");
    let text = MODEL_TAGS.replace_all(&text, "");
    text.trim().to_string()
}

/// Like [`sanitize`], but also turns every line break into a space so the
/// text fits on one preview line. Blank lines leave one space each.
pub fn sanitize_preview(raw: &str) -> String {
    let text = BOLD_MARKERS.replace_all(raw, "");
    let text = MARKUP_CHARS.replace_all(&text, "");
    let text = MODEL_TAGS.replace_all(&text, "");
    let text = LINE_BREAKS.replace_all(&text, " ");
    text.trim().to_string()
}
