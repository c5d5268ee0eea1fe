use super::event::RecognitionResult;

/// Concatenates the best alternative of every result in an ambient run.
pub fn run_transcript(results: &[RecognitionResult]) -> String {
    results.iter().filter_map(RecognitionResult::best).collect()
}

/// Pure wake-phrase test over the trailing `window` characters of `transcript`.
///
/// Comparison is lower-case. The window counts characters, not bytes, so
/// accented phrases ("olá") are never split.
pub fn detect<S: AsRef<str>>(transcript: &str, phrases: &[S], window: usize) -> bool {
    let lowered = transcript.to_lowercase();
    let skip = lowered.chars().count().saturating_sub(window);
    let tail: String = lowered.chars().skip(skip).collect();

    phrases
        .iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .any(|p| tail.contains(&p))
}
