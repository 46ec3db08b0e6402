//! Key-concern extraction from the parent's free-text description.

use intake_core::models::summary::MAX_KEY_CONCERNS;

const MAX_PHRASE_WORDS: usize = 12;
const MIN_PHRASE_CHARS: usize = 4;

/// Split the text into sentences and keep up to three distinct, shortened
/// phrases in their original order.
pub fn extract_key_concerns(text: &str) -> Vec<String> {
    let mut concerns: Vec<String> = Vec::new();

    for fragment in text.split(['.', '!', '?', ';', '\n']) {
        let phrase = shorten(fragment);
        if phrase.chars().count() < MIN_PHRASE_CHARS {
            continue;
        }
        if concerns.iter().any(|c| c.eq_ignore_ascii_case(&phrase)) {
            continue;
        }
        concerns.push(phrase);
        if concerns.len() == MAX_KEY_CONCERNS {
            break;
        }
    }

    concerns
}

fn shorten(fragment: &str) -> String {
    let words: Vec<&str> = fragment.split_whitespace().collect();
    let mut phrase = words
        .iter()
        .take(MAX_PHRASE_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    phrase = phrase
        .trim_matches(|c: char| c == ',' || c == ':' || c == '-')
        .trim()
        .to_string();
    if words.len() > MAX_PHRASE_WORDS {
        phrase.push_str("...");
    }
    capitalize(&phrase)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
