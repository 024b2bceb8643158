use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lower-case, strip diacritics and surrounding whitespace: `" Bogotá "` → `"bogota"`.
///
/// Lower-casing runs before decomposition because some lower-case mappings
/// (e.g. `İ`) introduce combining marks of their own.
pub fn normalize_str(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Missing in, missing out.
pub fn normalize_text(text: Option<&str>) -> Option<String> {
    text.map(normalize_str)
}

/// Title-case the way a display label expects: the first letter after any
/// non-letter is upper-cased, every other letter lower-cased.
/// `"valle del cauca"` → `"Valle Del Cauca"`, `"d.c."` → `"D.C."`.
/// Letters whose upper case is more than one char (`ß`) are kept as they are.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                let mut upper = c.to_uppercase();
                match (upper.next(), upper.next()) {
                    (Some(u), None) => out.push(u),
                    _ => out.push(c),
                }
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Coerce a raw cell into a finite f64. Anything else is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    clean_str(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Coerce a raw cell into an integral year; `"2020"` and `"2020.0"` both give 2020.
pub fn parse_year(raw: &str) -> Option<i32> {
    let v = parse_number(raw)?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return None;
    }
    Some(v as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents_case_and_whitespace() {
        assert_eq!(normalize_str("  Bogotá, D.C. "), "bogota, d.c.");
        assert_eq!(normalize_str("NARIÑO"), "narino");
        assert_eq!(normalize_str("San Andrés"), "san andres");
        assert_eq!(normalize_text(None), None);
    }

    #[test]
    fn normalize_is_idempotent() {
        for t in ["Bogotá D.C.", " \u{301}x", "İstanbul", "QUINDÍO ", "", "  "] {
            let once = normalize_str(t);
            assert_eq!(normalize_str(&once), once, "input {:?}", t);
        }
    }

    #[test]
    fn title_case_matches_display_convention() {
        assert_eq!(title_case("bogota"), "Bogota");
        assert_eq!(title_case("valle del cauca"), "Valle Del Cauca");
        assert_eq!(title_case("bogota, d.c."), "Bogota, D.C.");
        assert_eq!(title_case("NORTE de santander"), "Norte De Santander");
        assert_eq!(title_case("ßanta"), "ßanta");
        assert_eq!(title_case(&normalize_str(&title_case("ßanta"))), "ßanta");
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(parse_number(" 95.2 "), Some(95.2));
        assert_eq!(parse_number("\"-5\""), Some(-5.0));
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year("2020.0"), Some(2020));
        assert_eq!(parse_year("2020.5"), None);
        assert_eq!(parse_year("año"), None);
    }
}
