/// Turn raw model output into a publishable single line.
///
/// Strips wrapping quotes, collapses all whitespace (newlines included) to
/// single spaces and truncates to `char_cap` characters.
///
/// # Examples
///
/// ```
/// use touchline_generation::normalize;
///
/// assert_eq!(normalize("  \"Line one\nline two\"  ", 240), "Line one line two");
/// assert_eq!(normalize("abcdef", 3), "abc");
/// ```
pub fn normalize(raw: &str, char_cap: usize) -> String {
    const QUOTES: &[char] = &['"', '\'', '“', '”', '«', '»', '`'];

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let unquoted = collapsed.trim_matches(QUOTES).trim();
    unquoted.chars().take(char_cap).collect::<String>().trim_end().to_string()
}
