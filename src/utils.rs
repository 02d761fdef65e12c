//! Utility functions for text processing.
//!
//! Regexes are declared with `lazy-regex` so patterns are validated at
//! compile time and built on first use.

// lazy_regex! uses once_cell internally
#![allow(clippy::non_std_lazy_statics)]

use lazy_regex::lazy_regex;

/// Match markup tags such as `<br>` or `</i>`
static RE_MARKUP_TAG: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"</?[A-Za-z][^<>]*>");

/// Removes every `<...>` tag from the text, keeping the text between tags.
///
/// # Examples
///
/// ```
/// use anime_lookup_bot::utils::strip_markup;
/// assert_eq!(strip_markup("Line one<br>Line <i>two</i>"), "Line oneLine two");
/// ```
#[must_use]
pub fn strip_markup(text: &str) -> String {
    RE_MARKUP_TAG.replace_all(text, "").into_owned()
}

/// Truncates a string to at most `max_chars` characters (not bytes).
///
/// # Examples
///
/// ```
/// use anime_lookup_bot::utils::truncate_str;
/// let s = "Привет, мир!";
/// assert_eq!(truncate_str(s, 6), "Привет");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Splits a configuration list on commas, semicolons or newlines, dropping
/// empty entries.
///
/// # Examples
///
/// ```
/// use anime_lookup_bot::utils::split_list;
/// assert_eq!(split_list("Hentai, Erotica;;Ecchi"), vec!["Hentai", "Erotica", "Ecchi"]);
/// ```
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c == ';' || c == '\n')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}
