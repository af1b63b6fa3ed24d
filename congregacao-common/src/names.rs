//! Splitting of multi-person free text ("Vilson, Loni e Isolde")

/// Split a family/crew string into individual candidate names
///
/// Separators are commas, ampersands, semicolons and the whole word `e`.
/// Names are trimmed, empty pieces dropped, order preserved.
///
/// ```
/// use congregacao_common::split_family_names;
///
/// assert_eq!(split_family_names("Vilson, Loni e Isolde"), vec!["Vilson", "Loni", "Isolde"]);
/// ```
pub fn split_family_names(text: &str) -> Vec<String> {
    text.split([',', '&', ';'])
        .flat_map(split_on_conjunction)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Split on the standalone word "e" (case-insensitive), keeping names such
/// as "Ester" or "Noé" intact
fn split_on_conjunction(segment: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in segment.split_whitespace() {
        if word.eq_ignore_ascii_case("e") {
            parts.push(current.join(" "));
            current.clear();
        } else {
            current.push(word);
        }
    }
    parts.push(current.join(" "));
    parts
}
