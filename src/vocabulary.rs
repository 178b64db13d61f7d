//! Keyword tables used by the extraction heuristics.
//!
//! All matching is done against lower-cased text. The words are Turkish
//! because the crawled site is; each table says what it is used for.

/// Listing slugs ending with one of these are category or collection pages.
pub const CATEGORY_SUFFIXES: &[&str] = &[
    "tarifleri",
    "tarifler",
    "yemekleri",
    "recipes",
    "kategori",
    "category",
    "liste",
    "list",
    "gelenler",
];

/// Slugs of known category pages.
pub const CATEGORY_SLUGS: &[&str] = &[
    "corba",
    "kahvaltiliklar",
    "tatli",
    "pogaca",
    "kek",
    "kurabiye",
    "borek",
    "pasta",
    "balik",
    "et",
    "tavuk",
    "sebze",
    "makarna",
    "mezeler",
    "video",
    "dolma",
    "sarma",
    "pilav",
    "kofte",
    "kebap",
    "salata",
    "atistirmalik",
    "icecek",
    "sos",
    "bakliyat",
    "dolma-sarma",
    "pasta-tatli",
];

/// Special section slugs that are not recipes.
pub const SPECIAL_SLUGS: &[&str] = &["sizden-gelenler", "pasta-tatli", "video", "blog"];

/// The "and" connector used in compound collection slugs ("dolma-ve-sarma").
pub const AND_CONNECTOR: &str = "-ve-";

/// The "recipe" stem; with [`AND_CONNECTOR`] it marks a collection page.
pub const RECIPE_STEM: &str = "tarif";

/// Compound slugs with at most this many hyphens are treated as collections.
pub const MAX_COMPOUND_CATEGORY_HYPHENS: usize = 3;

/// Shortest slug considered a real recipe.
pub const MIN_SLUG_LEN: usize = 4;

/// Text of the main ingredients heading contains this.
pub const INGREDIENTS_HEADING: &str = "malzem";

/// An `h2` containing one of these starts the instructions section.
pub const INSTRUCTIONS_SECTION_MARKERS: &[&str] = &["nasıl", "yapılış", "püf noktası"];

/// Sub-headings containing one of these name an ingredient group
/// ("Hamuru için:", "Üzeri için", "Sosu", ...).
pub const SUBSECTION_WORDS: &[&str] = &[
    "için:", "için", "malzem", "üzeri", "iç", "harç", "sos", "dolgu", "krema", "hamur",
    "çikolata",
];

/// Measurement words; a real ingredient list mentions at least one early on.
pub const UNIT_WORDS: &[&str] = &["gram", "adet", "su bardağı", "kaşık", "diş", "bardağı"];

/// Navigation noise that leaks into lists under the ingredients heading.
pub const INGREDIENT_SECTION_NOISE: &[&str] = &[
    "yemek tarifleri",
    "tüm tarif",
    "kategoriler",
    "video",
    "çorba tarifleri",
];

/// Navigation noise for lists found by shape alone.
pub const LIST_SHAPE_NOISE: &[&str] = &[
    "yemek tarifleri",
    "tüm tarif",
    "kategoriler",
    "hakkımızda",
    "iletişim",
];

/// Navigation noise under instruction headings.
pub const INSTRUCTION_NOISE: &[&str] = &[
    "yemek tarifleri",
    "çorba",
    "kahvaltılık",
    "tatlı",
    "poğaça",
    "tüm tarif",
    "kategoriler",
    "börek",
    "pasta",
    "makarna",
];

/// Headings containing one of these introduce the method ("Nasıl Yapılır?").
pub const INSTRUCTION_HEADING_WORDS: &[&str] = &["nasıl", "yap", "yapılış", "yapilis", "hazırlan"];

/// Class name fragments of containers that usually hold the method list.
pub const INSTRUCTION_CONTAINER_HINTS: &[&str] = &["recipe", "instruction"];

/// Imperative verbs that mark an ordered list as cooking steps.
pub const ACTION_VERBS: &[&str] = &["ekle", "karıştır", "pişir", "koy", "çıkar", "alın", "yapın"];

/// Whether `text` (already lower-cased) contains any of `words`.
pub fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}

/// Whether `text` (already lower-cased) ends with any of `words`.
pub fn ends_with_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.ends_with(word))
}

/// Whether the first `sample_size` items, joined and lower-cased, mention a unit.
pub fn mentions_unit<S: AsRef<str>>(items: &[S], sample_size: usize) -> bool {
    let sample = items
        .iter()
        .take(sample_size)
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    contains_any(&sample, UNIT_WORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_unit() {
        let items = ["2 su bardağı un", "1 adet yumurta"];
        assert!(mentions_unit(&items, 5));

        let menu = ["Ana Sayfa", "Çorbalar", "Tatlılar"];
        assert!(!mentions_unit(&menu, 5));
    }

    #[test]
    fn test_mentions_unit_respects_sample_size() {
        let items = ["Tuz", "Karabiber", "Pul biber", "200 gram kıyma"];
        assert!(!mentions_unit(&items, 3));
        assert!(mentions_unit(&items, 4));
    }

    #[test]
    fn test_mentions_unit_is_case_insensitive() {
        assert!(mentions_unit(&["3 DİŞ sarımsak", "500 GRAM kuzu"], 5));
    }

    #[test]
    fn test_category_suffixes() {
        assert!(ends_with_any("tavuk-yemekleri", CATEGORY_SUFFIXES));
        assert!(ends_with_any("kolay-tarifler", CATEGORY_SUFFIXES));
        assert!(!ends_with_any("firinda-tavuk-but", CATEGORY_SUFFIXES));
    }

    #[test]
    fn test_tables_are_lower_case() {
        let tables: &[&[&str]] = &[
            CATEGORY_SUFFIXES,
            CATEGORY_SLUGS,
            SPECIAL_SLUGS,
            INSTRUCTIONS_SECTION_MARKERS,
            SUBSECTION_WORDS,
            UNIT_WORDS,
            INGREDIENT_SECTION_NOISE,
            LIST_SHAPE_NOISE,
            INSTRUCTION_NOISE,
            INSTRUCTION_HEADING_WORDS,
            INSTRUCTION_CONTAINER_HINTS,
            ACTION_VERBS,
        ];
        for table in tables {
            for word in *table {
                assert_eq!(*word, word.to_lowercase(), "{word} should be lower case");
            }
        }
    }
}
