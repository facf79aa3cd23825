/// Collapses runs of whitespace (non-breaking spaces included) into a single
/// space and trims both ends.
pub fn normalize_whitespace(input: &str) -> String {
    input
        .split(|c: char| c.is_whitespace() || matches!(c, '\u{00A0}' | '\u{2007}' | '\u{202F}'))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
