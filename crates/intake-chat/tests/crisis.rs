use intake_chat::{CrisisClassifier, KeywordClassifier};

#[test]
fn matches_default_phrases_case_insensitively() {
    let classifier = KeywordClassifier::default();
    let hit = classifier.classify("He said he WANTS TO DIE last night").unwrap();
    assert_eq!(hit.phrase, "wants to die");
    assert!(classifier.classify("she's been talking about   suicide").is_some());
}

#[test]
fn matches_on_word_boundaries_only() {
    let classifier = KeywordClassifier::default();
    assert!(classifier.classify("She has been cutting her arms").is_some());
    assert!(classifier.classify("self-harm").is_some());
    assert!(classifier.classify("I worry about overdoses in the news").is_none());
    assert!(classifier.classify("He loves the suicideboys band").is_none());
}

#[test]
fn ordinary_worries_do_not_match() {
    let classifier = KeywordClassifier::default();
    assert!(classifier.classify("He is anxious about tests and can't sleep").is_none());
    assert!(classifier.classify("").is_none());
}

#[test]
fn extra_phrases_extend_the_defaults() {
    let classifier = KeywordClassifier::with_extra(["Give Up On Everything", "  "]);
    assert!(classifier.classify("she wants to give up on everything").is_some());
    assert!(classifier.classify("talks about suicide").is_some());
    assert!(classifier.phrases().iter().all(|p| !p.is_empty()));
}
