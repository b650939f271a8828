//! Client-side free-text search used by every list board.

/// Lowercase `s` and strip the Spanish diacritics so that `"Garcia"`
/// matches `"García"`.
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// True when any of `fields` contains `query`. A blank query matches.
pub fn matches_query(fields: &[&str], query: &str) -> bool {
    let needle = fold(query.trim());
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|f| fold(f).contains(&needle))
}
