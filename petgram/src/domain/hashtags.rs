//! Hashtag extraction from captions.

use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

/// ASCII word characters only; `#café` yields `#caf`.
const HASHTAG_PATTERN: &str = "#[A-Za-z0-9_]+";

static HASHTAG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(HASHTAG_PATTERN)
        .inspect_err(|err| error!(error = %err, "hashtag pattern failed to compile"))
        .ok()
});

/// Return every `#`-prefixed word token in `caption`, in order of
/// appearance, keeping duplicates and case.
///
/// # Examples
/// ```
/// use petgram::domain::extract_hashtags;
///
/// assert_eq!(extract_hashtags("Hi #dog #DOG"), ["#dog", "#DOG"]);
/// assert!(extract_hashtags("no tags here").is_empty());
/// ```
pub fn extract_hashtags(caption: &str) -> Vec<String> {
    let Some(pattern) = HASHTAG_RE.as_ref() else {
        return Vec::new();
    };
    pattern
        .find_iter(caption)
        .map(|found| found.as_str().to_owned())
        .collect()
}
