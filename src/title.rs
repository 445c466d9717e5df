// Connectives kept lowercase inside a title
const SMALL_WORDS: &[&str] = &[
    "dan", "di", "ke", "dari", "yang", "untuk", "pada", "dengan", "atau", "karena", "dalam",
];

/// Title-cases `text` for display. Small connectives stay lowercase unless
/// they open the title. Whitespace runs collapse to single spaces.
pub fn format_title(text: &str) -> String {
    let lowered = text.to_lowercase();
    lowered
        .split_whitespace()
        .enumerate()
        .map(|(index, word)| {
            if index > 0 && SMALL_WORDS.contains(&word) {
                word.to_string()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
