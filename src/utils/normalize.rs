//! Text normalization for names, search keys and URL slugs.
//!
//! Spanish content is full of accented letters (á, é, ñ, ü). The helpers here
//! fold them to plain ASCII so that "Línea de Investigación" and
//! "linea de investigacion" compare equal and produce the same slug.

use unicode_normalization::UnicodeNormalization;

/// Strip diacritics, lowercase and collapse whitespace.
///
/// Used for `teachers.normalized_name` and for case/accent-insensitive
/// category comparisons.
///
/// # Examples
///
/// ```
/// use finesi::utils::normalize_text;
///
/// assert_eq!(normalize_text("José  Peña"), "jose pena");
/// assert_eq!(normalize_text("  Investigación "), "investigacion");
/// ```
pub fn normalize_text(input: &str) -> String {
    strip_accents(input)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Remove combining marks after NFD decomposition ("ñ" becomes "n").
pub fn strip_accents(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'ß' => 's',
            'Ø' => 'O',
            'ø' => 'o',
            'Æ' => 'A',
            'æ' => 'a',
            _ => c,
        })
        .collect::<String>()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Build a URL slug: ASCII lowercase words joined by single hyphens.
///
/// # Examples
///
/// ```
/// use finesi::utils::slugify;
///
/// assert_eq!(slugify("Línea de Investigación: IA & Datos"), "linea-de-investigacion-ia-datos");
/// assert_eq!(slugify("--Energías  Renovables--"), "energias-renovables");
/// ```
pub fn slugify(input: &str) -> String {
    let folded = normalize_text(input);
    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;

    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Case and accent insensitive equality.
pub fn loosely_equal(a: &str, b: &str) -> bool {
    normalize_text(a) == normalize_text(b)
}

fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |
        '\u{1AB0}'..='\u{1AFF}' |
        '\u{1DC0}'..='\u{1DFF}' |
        '\u{20D0}'..='\u{20FF}' |
        '\u{FE20}'..='\u{FE2F}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_spanish_names() {
        assert_eq!(normalize_text("María José Núñez"), "maria jose nunez");
        assert_eq!(normalize_text("ÁNGEL"), "angel");
        assert_eq!(normalize_text("Güemes"), "guemes");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_text("  Ana \t\n Lucía  "), "ana lucia");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sistemas Embebidos"), "sistemas-embebidos");
        assert_eq!(slugify("Ingeniería de Software 2.0"), "ingenieria-de-software-2-0");
        assert_eq!(slugify("¿Qué es?"), "que-es");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_loosely_equal() {
        assert!(loosely_equal("Investigación", "investigacion"));
        assert!(loosely_equal("Eventos ", "EVENTOS"));
        assert!(!loosely_equal("Eventos", "Noticias"));
    }
}
