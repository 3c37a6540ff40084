use std::borrow::Cow;

/// Replaces every `\n` with a single space. Runs of spaces are kept as-is and
/// `\r` is left alone, so a CRLF row becomes `"\r "`.
pub fn flatten_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\n') {
        Cow::Owned(text.replace('\n', " "))
    } else {
        Cow::Borrowed(text)
    }
}

pub fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
