use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when no title strategy matched.
pub const TITLE_NOT_FOUND: &str = "Title Not Found";

/// Prefix that marks an ingredient entry as a subsection heading.
pub const SUBSECTION_MARKER: &str = "## ";

/// One scraped recipe, written as a single JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub url: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl RecipeRecord {
    /// Whether the title came from the page rather than the sentinel.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty() && self.title != TITLE_NOT_FOUND
    }

    /// Subsection names in ingredient order, without the marker.
    pub fn ingredient_sections(&self) -> Vec<&str> {
        self.ingredients
            .iter()
            .filter_map(|item| item.strip_prefix(SUBSECTION_MARKER))
            .collect()
    }

    /// Serialize as one newline-terminated JSON line.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// A field the parser had to leave empty or fill with a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    MissingTitle,
    MissingIngredients,
    MissingInstructions,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let note = match self {
            Degradation::MissingTitle => "no title",
            Degradation::MissingIngredients => "no ingredients",
            Degradation::MissingInstructions => "no instructions",
        };
        f.write_str(note)
    }
}

/// Result of parsing one recipe page: the record plus what went missing.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub record: RecipeRecord,
    pub degradations: Vec<Degradation>,
    /// Name of the strategy that produced each field, if any did.
    pub title_source: Option<&'static str>,
    pub ingredients_source: Option<&'static str>,
    pub instructions_source: Option<&'static str>,
}

impl ParseOutcome {
    pub fn is_complete(&self) -> bool {
        self.degradations.is_empty()
    }

    /// Degradation notes joined for log output, e.g. "no title, no ingredients".
    pub fn notes(&self) -> String {
        self.degradations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecipeRecord {
        RecipeRecord {
            url: "https://yemek.com/tarif/mercimek-corbasi/".to_string(),
            title: "Mercimek Çorbası".to_string(),
            ingredients: vec![
                "## Çorbası için:".to_string(),
                "1 su bardağı kırmızı mercimek".to_string(),
                "1 adet soğan".to_string(),
            ],
            instructions: vec!["Soğanı doğrayıp tencerede kavurun.".to_string()],
        }
    }

    #[test]
    fn test_json_line_round_trip() {
        let record = sample();
        let line = record.to_json_line().unwrap();

        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        // Non-ASCII text is kept literally, not escaped
        assert!(line.contains("Mercimek Çorbası"));

        let parsed: RecipeRecord = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_json_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["ingredients", "instructions", "title", "url"]);
    }

    #[test]
    fn test_ingredient_sections() {
        assert_eq!(sample().ingredient_sections(), vec!["Çorbası için:"]);
    }

    #[test]
    fn test_sentinel_title() {
        let mut record = sample();
        assert!(record.has_title());
        record.title = TITLE_NOT_FOUND.to_string();
        assert!(!record.has_title());
    }

    #[test]
    fn test_outcome_notes() {
        let outcome = ParseOutcome {
            record: sample(),
            degradations: vec![Degradation::MissingTitle, Degradation::MissingInstructions],
            title_source: None,
            ingredients_source: Some("heading-anchored"),
            instructions_source: None,
        };
        assert!(!outcome.is_complete());
        assert_eq!(outcome.notes(), "no title, no instructions");
    }
}
