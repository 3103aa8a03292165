// src/scoring/normalize.rs

/// Canonicalizes free text for comparison.
///
/// Lowercases, strips Arabic tashkeel, folds the common letter variants
/// (alef forms, taa marbuta, alef maksura) and collapses whitespace runs.
/// Pure function; empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for ch in lowered.chars() {
        if is_tashkeel(ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(match ch {
            'إ' | 'أ' | 'آ' => 'ا',
            'ة' => 'ه',
            'ى' => 'ي',
            c => c,
        });
    }

    out
}

/// Arabic combining diacritical marks (tashkeel and Quranic annotation signs).
fn is_tashkeel(c: char) -> bool {
    matches!(c,
        '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{0670}'
            | '\u{06D6}'..='\u{06DC}'
            | '\u{06DF}'..='\u{06E4}'
            | '\u{06E7}'
            | '\u{06E8}'
            | '\u{06EA}'..='\u{06ED}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
    }

    #[test]
    fn trims_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  Be   Star\tEvent  "), "be star event");
    }

    #[test]
    fn folds_alef_variants() {
        assert_eq!(normalize("أحمد"), "احمد");
        assert_eq!(normalize("إسلام"), "اسلام");
        assert_eq!(normalize("آمال"), "امال");
    }

    #[test]
    fn folds_taa_marbuta_and_alef_maksura() {
        assert_eq!(normalize("مدرسة"), "مدرسه");
        assert_eq!(normalize("مصطفى"), "مصطفي");
    }

    #[test]
    fn strips_tashkeel() {
        // "muhammad" with full diacritics vs bare letters
        assert_eq!(normalize("مُحَمَّد"), "محمد");
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["  Be   Star ", "مُدَرِّسَة", "إلَى المدرسةِ", "", "A) Cairo!"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }
}
