//! Crisis-language detection.
//!
//! Runs on every user-authored text before anything else happens to it.
//! There is no suppression path: a match always raises the crisis flag.

/// Phrases that flag possible self-harm risk. Matched case-insensitively on
/// word boundaries.
pub const DEFAULT_CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "kill himself",
    "kill herself",
    "kill themselves",
    "want to die",
    "wants to die",
    "self-harm",
    "self harm",
    "hurt myself",
    "hurting himself",
    "hurting herself",
    "hurting themselves",
    "cutting",
    "end my life",
    "end his life",
    "end her life",
    "overdose",
    "no reason to live",
    "better off dead",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrisisMatch {
    pub phrase: String,
}

pub trait CrisisClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<CrisisMatch>;
}

/// List-based classifier. Phrases are normalised to lowercase with
/// single spaces.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    phrases: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalised: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = normalise(phrase.as_ref());
            if !phrase.is_empty() && !normalised.contains(&phrase) {
                normalised.push(phrase);
            }
        }
        Self { phrases: normalised }
    }

    /// The default list plus configured extras.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut all: Vec<String> = DEFAULT_CRISIS_PHRASES.iter().map(|p| p.to_string()).collect();
        all.extend(extra.into_iter().map(|p| p.as_ref().to_string()));
        Self::new(all)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CRISIS_PHRASES)
    }
}

impl CrisisClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Option<CrisisMatch> {
        let haystack = normalise(text);
        self.phrases
            .iter()
            .find(|phrase| contains_phrase(&haystack, phrase))
            .map(|phrase| CrisisMatch {
                phrase: phrase.clone(),
            })
    }
}

fn normalise(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, matched)| {
        let end = start + matched.len();
        let clear_before = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let clear_after = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        clear_before && clear_after
    })
}
