use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use super::{char_len, element_text, heading_level, select_within, ParsingContext, Strategy};
use crate::vocabulary::{
    contains_any, ACTION_VERBS, INSTRUCTION_CONTAINER_HINTS, INSTRUCTION_HEADING_WORDS,
    INSTRUCTION_NOISE,
};

/// Shortest step kept from an ordered list.
const MIN_STEP_LEN: usize = 10;
/// Shortest step kept from a numbered text line.
const MIN_NUMBERED_LINE_LEN: usize = 15;

/// Elements whose text never reaches the reader.
const HIDDEN_TEXT_CONTAINERS: [&str; 4] = ["script", "style", "noscript", "template"];

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+").expect("numbered line pattern is valid"));

/// First ordered list inside a `div` whose class mentions "recipe" or "instruction".
pub struct ContainerClassInstructions;

/// List items around a "Nasıl Yapılır?" style heading.
pub struct HeadingAnchoredInstructions;

/// Any ordered list whose opening steps use cooking verbs.
pub struct ActionVerbInstructions;

/// "1. ..." / "2) ..." lines in the page text.
pub struct NumberedLineInstructions;

impl Strategy for ContainerClassInstructions {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "container-class"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Vec<String>> {
        let containers = context.select("div").into_iter().filter(|div| {
            div.value()
                .attr("class")
                .map(|class| contains_any(&class.to_lowercase(), INSTRUCTION_CONTAINER_HINTS))
                .unwrap_or(false)
        });

        for container in containers {
            let first_list = select_within(container, "ol")
                .into_iter()
                .map(all_item_texts)
                .find(|items| items.len() >= 2);

            if let Some(items) = first_list {
                let steps = keep_longer_than(items, MIN_STEP_LEN);
                if !steps.is_empty() {
                    return Some(steps);
                }
            }
        }
        None
    }
}

impl Strategy for HeadingAnchoredInstructions {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "heading-anchored"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Vec<String>> {
        for heading in context.select("h2, h3, h4, h5") {
            let text = element_text(heading).to_lowercase();
            if !contains_any(&text, INSTRUCTION_HEADING_WORDS) {
                continue;
            }

            let mut raw = section_items(heading);
            if raw.is_empty() {
                raw = sibling_items(heading);
            }

            let steps = clean_steps(raw);
            if !steps.is_empty() {
                return Some(steps);
            }
        }
        None
    }
}

impl Strategy for ActionVerbInstructions {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "action-verb"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Vec<String>> {
        let items = context
            .select("ol")
            .into_iter()
            .map(all_item_texts)
            .find(|items| {
                items.len() >= 2 && contains_any(&items[..2].join(" ").to_lowercase(), ACTION_VERBS)
            })?;

        let steps = keep_longer_than(items, MIN_STEP_LEN);
        if steps.is_empty() {
            None
        } else {
            Some(steps)
        }
    }
}

impl Strategy for NumberedLineInstructions {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "numbered-lines"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Vec<String>> {
        let steps: Vec<String> = visible_text(&context.document)
            .flat_map(str::lines)
            .map(str::trim)
            .filter_map(strip_step_number)
            .filter(|step| char_len(step) > MIN_NUMBERED_LINE_LEN)
            .collect();

        if steps.len() >= 2 {
            Some(steps)
        } else {
            None
        }
    }
}

/// Strip a leading "3. " or "3) " and return the rest, if the line has one.
pub fn strip_step_number(line: &str) -> Option<String> {
    let prefix = NUMBERED_LINE.find(line)?;
    Some(line[prefix.end()..].to_string())
}

/// Text nodes of `document` outside scripts, styles and templates.
fn visible_text(document: &Html) -> impl Iterator<Item = &str> {
    document.root_element().descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| HIDDEN_TEXT_CONTAINERS.contains(&el.value().name()));
        if hidden {
            None
        } else {
            Some(&**text)
        }
    })
}

/// Texts of every `li` under `list`, nested ones included.
fn all_item_texts(list: ElementRef) -> Vec<String> {
    select_within(list, "li")
        .into_iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn keep_longer_than(items: Vec<String>, min_len: usize) -> Vec<String> {
    items
        .into_iter()
        .filter(|item| char_len(item) > min_len)
        .collect()
}

/// Items from the heading's closest `div`/`section`/`article`, preferring
/// ordered lists over any list.
fn section_items(heading: ElementRef) -> Vec<String> {
    let Some(section) = heading
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "div" | "section" | "article"))
    else {
        return Vec::new();
    };

    let ordered = texts_longer_than_two(select_within(section, "ol li"));
    if !ordered.is_empty() {
        return ordered;
    }
    texts_longer_than_two(select_within(section, "li"))
}

/// Items from the siblings after the heading, up to the next heading of the
/// same or a higher level.
fn sibling_items(heading: ElementRef) -> Vec<String> {
    let level = heading_level(heading).unwrap_or(6);
    let mut items = Vec::new();

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        if heading_level(sibling).is_some_and(|l| l <= level) {
            break;
        }
        items.extend(texts_longer_than_two(select_within(sibling, "li")));
    }
    items
}

fn texts_longer_than_two(elements: Vec<ElementRef>) -> Vec<String> {
    elements
        .into_iter()
        .map(element_text)
        .filter(|text| char_len(text) > 2)
        .collect()
}

/// Strip bullets, drop exact duplicates, oversized entries and navigation noise.
fn clean_steps(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut steps = Vec::new();

    for item in raw {
        let step = item.trim_start_matches(['•', ' ']).trim().to_string();
        let len = char_len(&step);
        if len <= 2 || len >= 150 {
            continue;
        }
        if contains_any(&step.to_lowercase(), INSTRUCTION_NOISE) {
            continue;
        }
        if seen.insert(step.clone()) {
            steps.push(step);
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(body: &str) -> ParsingContext {
        ParsingContext::new(
            &format!("<html><body>{body}</body></html>"),
            "https://yemek.com/tarif/test-tarifi/",
        )
    }

    #[test]
    fn test_strip_step_number() {
        assert_eq!(
            strip_step_number("1. Fırını 180 dereceye ısıtın."),
            Some("Fırını 180 dereceye ısıtın.".to_string())
        );
        assert_eq!(
            strip_step_number("12) Servis edin."),
            Some("Servis edin.".to_string())
        );
        assert_eq!(strip_step_number("1.Fırını ısıtın."), None);
        assert_eq!(strip_step_number("Adım 1. Fırını ısıtın."), None);
    }

    #[test]
    fn test_container_class_skips_short_lists() {
        let ctx = context(
            r#"
            <div class="recipe-content">
              <ol><li>Tek adım listesi burada</li></ol>
              <ol>
                <li>Soğanları yağda pembeleşene kadar kavurun.</li>
                <li>Kısa</li>
                <li>Kıymayı ekleyip suyunu çekene kadar pişirin.</li>
              </ol>
            </div>
            "#,
        );

        assert_eq!(
            ContainerClassInstructions.extract(&ctx),
            Some(vec![
                "Soğanları yağda pembeleşene kadar kavurun.".to_string(),
                "Kıymayı ekleyip suyunu çekene kadar pişirin.".to_string(),
            ])
        );
    }

    #[test]
    fn test_container_class_needs_matching_class() {
        let ctx = context(
            r#"
            <div class="sidebar">
              <ol><li>Soğanları yağda kavurun.</li><li>Kıymayı ekleyip pişirin.</li></ol>
            </div>
            "#,
        );
        assert_eq!(ContainerClassInstructions.extract(&ctx), None);
    }

    #[test]
    fn test_heading_prefers_ordered_items_in_section() {
        let ctx = context(
            r#"
            <section>
              <h2>Nasıl Yapılır?</h2>
              <ul><li>Paylaş</li></ul>
              <ol>
                <li>• Nohutları bir gece önceden ıslatın.</li>
                <li>Haşlayıp süzün.</li>
                <li>Haşlayıp süzün.</li>
              </ol>
            </section>
            "#,
        );

        assert_eq!(
            HeadingAnchoredInstructions.extract(&ctx),
            Some(vec![
                "Nohutları bir gece önceden ıslatın.".to_string(),
                "Haşlayıp süzün.".to_string(),
            ])
        );
    }

    #[test]
    fn test_heading_falls_back_to_siblings() {
        let ctx = context(
            r#"
            <h2>Nasıl Yapılır?</h2>
            <ul><li>Patlıcanları alacalı soyun.</li></ul>
            <h3>Servis</h3>
            <ul><li>Sıcak servis yapın.</li></ul>
            <h2>Yorumlar</h2>
            <ul><li>Harika olmuş!</li></ul>
            "#,
        );

        assert_eq!(
            HeadingAnchoredInstructions.extract(&ctx),
            Some(vec![
                "Patlıcanları alacalı soyun.".to_string(),
                "Sıcak servis yapın.".to_string(),
            ])
        );
    }

    #[test]
    fn test_heading_filters_navigation_noise() {
        let ctx = context(
            r#"
            <div>
              <h3>Hazırlanışı</h3>
              <ul><li>Tüm Tarifler</li><li>Kategoriler</li></ul>
            </div>
            "#,
        );
        assert_eq!(HeadingAnchoredInstructions.extract(&ctx), None);
    }

    #[test]
    fn test_action_verb_list() {
        let ctx = context(
            r#"
            <ol><li>Birinci</li><li>İkinci</li></ol>
            <ol>
              <li>Tereyağını tavada eritin ve unu ekleyin.</li>
              <li>Sütü azar azar ekleyerek karıştırın.</li>
            </ol>
            "#,
        );

        let steps = ActionVerbInstructions.extract(&ctx).unwrap();
        assert_eq!(steps.len(), 2);
        assert!(steps[0].starts_with("Tereyağını"));
    }

    #[test]
    fn test_numbered_lines() {
        let ctx = context(
            r#"
            <p>1. Bulguru sıcak suyla ıslatıp bekletin.</p>
            <p>2) Salçayı ve baharatları ekleyip yoğurun.</p>
            <p>3. Kısa</p>
            <p>Afiyet olsun</p>
            "#,
        );

        assert_eq!(
            NumberedLineInstructions.extract(&ctx),
            Some(vec![
                "Bulguru sıcak suyla ıslatıp bekletin.".to_string(),
                "Salçayı ve baharatları ekleyip yoğurun.".to_string(),
            ])
        );
    }

    #[test]
    fn test_numbered_lines_ignore_scripts_and_styles() {
        let ctx = context(
            r#"
            <script>
            1. var birinci_adim_degiskeni = 1;
            2. var ikinci_adim_degiskeni = 2;
            </script>
            <style>
            1) .tarif-karti { margin: 0 auto; }
            2) .tarif-basligi { font-weight: bold; }
            </style>
            <noscript>
            1. Tarayıcınızda JavaScript kapalı görünüyor.
            2. Lütfen sayfayı yeniledikten sonra tekrar deneyin.
            </noscript>
            <h1>Tarif</h1>
            "#,
        );
        assert_eq!(NumberedLineInstructions.extract(&ctx), None);
    }

    #[test]
    fn test_numbered_lines_skip_script_but_keep_page_steps() {
        let ctx = context(
            r#"
            <script>
            1. var birinci_adim_degiskeni = 1;
            2. var ikinci_adim_degiskeni = 2;
            </script>
            <p>1. Bulguru sıcak suyla ıslatıp bekletin.</p>
            <p>2. Salçayı ve baharatları ekleyip yoğurun.</p>
            "#,
        );

        assert_eq!(
            NumberedLineInstructions.extract(&ctx),
            Some(vec![
                "Bulguru sıcak suyla ıslatıp bekletin.".to_string(),
                "Salçayı ve baharatları ekleyip yoğurun.".to_string(),
            ])
        );
    }

    #[test]
    fn test_single_numbered_line_is_not_enough() {
        let ctx = context("<p>1. Bulguru sıcak suyla ıslatıp bekletin.</p>");
        assert_eq!(NumberedLineInstructions.extract(&ctx), None);
    }
}
