use super::{element_text, ParsingContext, Strategy};

/// Text of the first `h1`.
pub struct HeadingTitle;

/// `og:title` social preview metadata.
pub struct OpenGraphTitle;

/// The `<title>` element, cut at the first `|` ("Karnıyarık | Yemek.com").
pub struct DocumentTitle;

impl Strategy for HeadingTitle {
    type Output = String;

    fn name(&self) -> &'static str {
        "heading"
    }

    fn extract(&self, context: &ParsingContext) -> Option<String> {
        let heading = context.select("h1").into_iter().next()?;
        non_empty(element_text(heading))
    }
}

impl Strategy for OpenGraphTitle {
    type Output = String;

    fn name(&self) -> &'static str {
        "og-title"
    }

    fn extract(&self, context: &ParsingContext) -> Option<String> {
        let meta = context
            .select(r#"meta[property="og:title"]"#)
            .into_iter()
            .next()?;
        non_empty(meta.value().attr("content")?.trim().to_string())
    }
}

impl Strategy for DocumentTitle {
    type Output = String;

    fn name(&self) -> &'static str {
        "document-title"
    }

    fn extract(&self, context: &ParsingContext) -> Option<String> {
        let title = context.select("title").into_iter().next()?;
        let text = title.text().collect::<String>();
        let before_separator = text.split('|').next().unwrap_or_default();
        non_empty(before_separator.trim().to_string())
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
