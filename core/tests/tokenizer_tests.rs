use quarry_core::tokenizer::tokenize;

#[test]
fn it_normalizes_and_stems() {
    let toks = tokenize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(toks.contains(&"run".to_string()));
    // Unicode normalization: café -> cafe (stemmed form keeps the word intact)
    assert!(toks.iter().any(|w| w.starts_with("caf")));
}

#[test]
fn it_filters_stopwords() {
    let toks = tokenize("The quick brown fox and the lazy dog");
    assert!(!toks.contains(&"the".to_string()));
    assert!(!toks.contains(&"and".to_string()));
}

#[test]
fn empty_text_yields_no_tokens() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("  ,.;  ").is_empty());
}
