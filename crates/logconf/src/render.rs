/// Wrap `s` in double quotes, replacing characters through `escape`.
///
/// `escape` sees each character and the one after it; returning `None` copies
/// the character through unchanged.
pub fn quote_with<F>(s: &str, escape: F) -> String
where
    F: Fn(char, Option<char>) -> Option<&'static str>,
{
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');

    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match escape(c, chars.peek().copied()) {
            Some(escaped) => result.push_str(escaped),
            None => result.push(c),
        }
    }

    result.push('"');
    result
}

/// Whether `s` can be written without quotes in the brace grammar.
pub fn is_bare_word(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Whether a directive value must be quoted to survive a line-oriented parser.
pub fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.starts_with('"')
        || s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
        || s.contains(['\n', '\r', '#'])
}

pub fn write_indent<W: std::fmt::Write>(w: &mut W, indent: usize, width: usize) -> std::fmt::Result {
    for _ in 0..indent * width {
        w.write_char(' ')?;
    }
    Ok(())
}
