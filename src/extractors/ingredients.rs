use std::collections::HashSet;

use log::debug;
use scraper::ElementRef;

use super::{char_len, direct_items, element_text, ParsingContext, Strategy};
use crate::model::SUBSECTION_MARKER;
use crate::vocabulary::{
    contains_any, mentions_unit, INGREDIENTS_HEADING, INGREDIENT_SECTION_NOISE,
    INSTRUCTIONS_SECTION_MARKERS, LIST_SHAPE_NOISE, SUBSECTION_WORDS,
};

/// Items checked for unit words when validating a heading-anchored result.
const VALIDATION_SAMPLE: usize = 5;
/// Items checked for unit words when judging a list by shape.
const SHAPE_SAMPLE: usize = 3;

/// Collects every list between the "Malzemeler" heading and the instructions
/// heading, keeping sub-headings such as "Hamuru için:" as `## ` markers.
pub struct HeadingAnchoredIngredients;

/// Picks the first list on the page that looks like ingredients: unit words
/// early on and short, line-sized items.
pub struct ListShapeIngredients;

impl Strategy for HeadingAnchoredIngredients {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "heading-anchored"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Vec<String>> {
        let heading = context.select("h2").into_iter().find(|h2| {
            element_text(*h2)
                .to_lowercase()
                .contains(INGREDIENTS_HEADING)
        })?;

        let items = dedup_case_insensitive(collect_after_heading(context, heading));
        if items.is_empty() {
            return None;
        }
        if !looks_like_ingredients(&items) {
            debug!(
                "Discarding {} items under the ingredients heading of {}: no unit words",
                items.len(),
                context.url
            );
            return None;
        }
        Some(items)
    }
}

impl Strategy for ListShapeIngredients {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "list-shape"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Vec<String>> {
        for list in context.select("ul, ol") {
            let lis = direct_items(list);
            if lis.len() < 2 {
                continue;
            }

            let items: Vec<String> = lis.into_iter().map(element_text).collect();
            if !mentions_unit(&items, SHAPE_SAMPLE) {
                continue;
            }

            let sized: Vec<String> = items
                .into_iter()
                .filter(|item| (6..100).contains(&char_len(item)))
                .collect();
            if sized.len() < 2 {
                continue;
            }

            let clean: Vec<String> = sized
                .into_iter()
                .filter(|item| !contains_any(&item.to_lowercase(), LIST_SHAPE_NOISE))
                .collect();
            if !clean.is_empty() {
                return Some(clean);
            }
        }
        None
    }
}

/// Whether the first few entries of a collected list mention a measurement unit.
pub fn looks_like_ingredients<S: AsRef<str>>(items: &[S]) -> bool {
    mentions_unit(items, VALIDATION_SAMPLE)
}

/// Walks every element after `heading` in document order until the
/// instructions heading.
fn collect_after_heading(context: &ParsingContext, heading: ElementRef) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let mut pending_section: Option<String> = None;
    let mut past_heading = false;

    for node in context.document.root_element().descendants() {
        if node.id() == heading.id() {
            past_heading = true;
            continue;
        }
        if !past_heading {
            continue;
        }
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        match element.value().name() {
            "h2" => {
                let text = element_text(element).to_lowercase();
                if contains_any(&text, INSTRUCTIONS_SECTION_MARKERS) {
                    break;
                }
            }
            "h3" | "h4" | "h5" => {
                let text = element_text(element);
                if contains_any(&text.to_lowercase(), SUBSECTION_WORDS) {
                    pending_section = Some(text);
                }
            }
            "ul" | "ol" => {
                let lis = direct_items(element);
                if lis.is_empty() {
                    continue;
                }

                if let Some(section) = pending_section.take() {
                    let marker = format!("{SUBSECTION_MARKER}{section}");
                    if !items.contains(&marker) {
                        items.push(marker);
                    }
                }

                for li in lis {
                    let text = element_text(li);
                    let len = char_len(&text);
                    if len > 3
                        && len < 150
                        && !contains_any(&text.to_lowercase(), INGREDIENT_SECTION_NOISE)
                    {
                        items.push(text);
                    }
                }
            }
            _ => {}
        }
    }

    items
}

fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.trim().to_lowercase()))
        .collect()
}
