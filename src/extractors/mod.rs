use crate::model::{Degradation, ParseOutcome, RecipeRecord, TITLE_NOT_FOUND};
use log::debug;
use scraper::{ElementRef, Html, Selector};

pub mod ingredients;
pub mod instructions;
pub mod listing;
pub mod title;

pub use ingredients::{HeadingAnchoredIngredients, ListShapeIngredients};
pub use instructions::{
    ActionVerbInstructions, ContainerClassInstructions, HeadingAnchoredInstructions,
    NumberedLineInstructions,
};
pub use listing::{classify_slug, extract_recipe_links, ListingLinkExtractor, SlugVerdict};
pub use title::{DocumentTitle, HeadingTitle, OpenGraphTitle};

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(html: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            document: Html::parse_document(html),
        }
    }

    /// All elements matching `css`, in document order.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        select_within(self.document.root_element(), css)
    }
}

/// One way of extracting a field. Strategies for the same field are tried in
/// order and the first `Some` wins.
pub trait Strategy {
    type Output;

    fn name(&self) -> &'static str;

    fn extract(&self, context: &ParsingContext) -> Option<Self::Output>;
}

/// Run `strategies` in order and return the first result with its strategy name.
pub fn first_match<T>(
    strategies: &[&dyn Strategy<Output = T>],
    context: &ParsingContext,
) -> Option<(&'static str, T)> {
    for strategy in strategies {
        if let Some(output) = strategy.extract(context) {
            debug!("{} matched for {}", strategy.name(), context.url);
            return Some((strategy.name(), output));
        }
        debug!("{} found nothing for {}", strategy.name(), context.url);
    }
    None
}

/// Best-effort recipe page parser. Never fails; missing fields are reported as
/// degradations on the outcome.
pub struct RecipeParser;

impl RecipeParser {
    pub fn parse(&self, html: &str, url: &str) -> ParseOutcome {
        let context = ParsingContext::new(html, url);
        let mut degradations = Vec::new();

        let title_strategies: [&dyn Strategy<Output = String>; 3] =
            [&HeadingTitle, &OpenGraphTitle, &DocumentTitle];
        let (title_source, title) = match first_match(&title_strategies, &context) {
            Some((name, title)) => (Some(name), title),
            None => {
                degradations.push(Degradation::MissingTitle);
                (None, TITLE_NOT_FOUND.to_string())
            }
        };

        let ingredient_strategies: [&dyn Strategy<Output = Vec<String>>; 2] =
            [&HeadingAnchoredIngredients, &ListShapeIngredients];
        let (ingredients_source, ingredients) =
            split_source(first_match(&ingredient_strategies, &context));
        if ingredients.is_empty() {
            degradations.push(Degradation::MissingIngredients);
        }

        let instruction_strategies: [&dyn Strategy<Output = Vec<String>>; 4] = [
            &ContainerClassInstructions,
            &HeadingAnchoredInstructions,
            &ActionVerbInstructions,
            &NumberedLineInstructions,
        ];
        let (instructions_source, instructions) =
            split_source(first_match(&instruction_strategies, &context));
        if instructions.is_empty() {
            degradations.push(Degradation::MissingInstructions);
        }

        ParseOutcome {
            record: RecipeRecord {
                url: url.to_string(),
                title,
                ingredients,
                instructions,
            },
            degradations,
            title_source,
            ingredients_source,
            instructions_source,
        }
    }
}

/// Parse one recipe page. See [`RecipeParser`].
pub fn parse_recipe_page(html: &str, url: &str) -> ParseOutcome {
    RecipeParser.parse(html, url)
}

fn split_source(found: Option<(&'static str, Vec<String>)>) -> (Option<&'static str>, Vec<String>) {
    match found {
        Some((name, items)) => (Some(name), items),
        None => (None, Vec::new()),
    }
}

/// Elements under `root` matching `css`. An invalid selector matches nothing.
pub(crate) fn select_within<'a>(root: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => root.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Text of an element: trimmed text nodes joined with single spaces.
pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `li` elements that are direct children of a list element.
pub(crate) fn direct_items(list: ElementRef) -> Vec<ElementRef> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .collect()
}

/// Heading level for `h1`..`h6`.
pub(crate) fn heading_level(element: ElementRef) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
