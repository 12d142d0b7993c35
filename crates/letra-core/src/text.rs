//! Small string utilities shared by the counter, validators and fixers.

/// Vowels recognised by the syllable counter, accented forms included.
pub fn is_vowel(c: char) -> bool {
    matches!(
        c.to_lowercase().next().unwrap_or(c),
        'a' | 'e'
            | 'i'
            | 'o'
            | 'u'
            | 'y'
            | 'á'
            | 'à'
            | 'â'
            | 'ã'
            | 'é'
            | 'ê'
            | 'í'
            | 'ó'
            | 'ô'
            | 'õ'
            | 'ú'
            | 'ü'
    )
}

/// Strip leading and trailing non-letter characters from a token.
///
/// Inner punctuation (`d'amor`, `bem-vindo`) is kept.
pub fn word_core(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphabetic())
}

/// Lower-cased [`word_core`].
pub fn normalized_word(token: &str) -> String {
    word_core(token).to_lowercase()
}

/// Whether the token contains at least one letter.
pub fn has_letters(token: &str) -> bool {
    token.chars().any(char::is_alphabetic)
}

/// Whitespace tokens that contain at least one letter.
pub fn word_tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().filter(|t| has_letters(t)).collect()
}

/// Fold Portuguese accents for lexicon lookups (`Refrão` -> `refrao`).
pub fn fold_accents(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Upper-case the first letter of `word`, leaving the rest untouched.
pub fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether the first letter of the token is upper-case.
pub fn starts_uppercase(token: &str) -> bool {
    token
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_uppercase)
}

/// Apply the capitalization of `template` to `replacement`.
pub fn match_case(template: &str, replacement: &str) -> String {
    if starts_uppercase(template) {
        capitalize_first(replacement)
    } else {
        replacement.to_string()
    }
}

/// Split a token into `(leading punctuation, core, trailing punctuation)`.
pub fn split_affixes(token: &str) -> (&str, &str, &str) {
    let start = token
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(start);
    (&token[..start], &token[start..end], &token[end..])
}
