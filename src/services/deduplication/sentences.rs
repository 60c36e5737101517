//! Sentence splitting.

/// Characters that end a sentence. They are split points and are not kept.
pub const SENTENCE_TERMINATORS: [char; 3] = ['.', '?', '!'];

/// Separator placed between kept sentences.
pub const SENTENCE_SEPARATOR: &str = ". ";

/// Splits text on every sentence terminator, trims each piece and skips the
/// empty ones.
///
/// Trimming removes Unicode whitespace and the byte order mark.
///
/// ```rust
/// use duplitext::services::deduplication::split_sentences;
///
/// let sentences: Vec<_> = split_sentences("Hi!  How are you?..Fine").collect();
/// assert_eq!(sentences, ["Hi", "How are you", "Fine"]);
/// ```
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(SENTENCE_TERMINATORS)
        .map(|sentence| sentence.trim_matches(is_trimmable))
        .filter(|sentence| !sentence.is_empty())
}

fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Comparison key for a sentence.
pub fn normalized_key(sentence: &str) -> String {
    sentence.to_lowercase()
}
