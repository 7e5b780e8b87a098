//! Text wrapping for transcript messages.

/// Wrap `text` to `width` terminal cells.
///
/// Embedded newlines are kept as line breaks and blank lines survive, so a
/// message always renders as at least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(
            textwrap::wrap(paragraph, width)
                .into_iter()
                .map(std::borrow::Cow::into_owned),
        );
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
