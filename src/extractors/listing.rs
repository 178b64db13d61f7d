use std::collections::HashSet;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use scraper::Html;
use url::Url;

use super::select_within;
use crate::vocabulary::{
    ends_with_any, AND_CONNECTOR, CATEGORY_SLUGS, CATEGORY_SUFFIXES, MAX_COMPOUND_CATEGORY_HYPHENS,
    MIN_SLUG_LEN, RECIPE_STEM, SPECIAL_SLUGS,
};

/// Path prefix shared by recipe pages and the paginated listing.
pub const RECIPE_PATH_PREFIX: &str = "/tarif/";
/// Path segment that marks a listing page ("/tarif/sayfa/3/").
pub const PAGINATION_SEGMENT: &str = "/sayfa/";

static RECIPE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{RECIPE_PATH_PREFIX}[^/]+/?$")).expect("recipe path pattern is valid")
});

/// Why a slug was or wasn't accepted as a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugVerdict {
    Recipe,
    CategorySuffix,
    CategorySlug,
    CompoundCategory,
    SpecialPage,
    TooGeneric,
}

/// Classify a lower-cased slug.
pub fn classify_slug(slug: &str) -> SlugVerdict {
    if ends_with_any(slug, CATEGORY_SUFFIXES) {
        return SlugVerdict::CategorySuffix;
    }
    if CATEGORY_SLUGS.contains(&slug) {
        return SlugVerdict::CategorySlug;
    }
    // "dolma-ve-sarma-tarifleri", "pasta-ve-tatli"
    if slug.contains(AND_CONNECTOR)
        && (slug.contains(RECIPE_STEM) || slug.matches('-').count() <= MAX_COMPOUND_CATEGORY_HYPHENS)
    {
        return SlugVerdict::CompoundCategory;
    }
    if SPECIAL_SLUGS.contains(&slug) {
        return SlugVerdict::SpecialPage;
    }
    if slug.chars().count() < MIN_SLUG_LEN || !slug.contains('-') {
        return SlugVerdict::TooGeneric;
    }
    SlugVerdict::Recipe
}

/// Pulls individual recipe URLs out of a listing page.
///
/// Listing pages mix the main recipe grid with category, pagination and
/// "related" links that use the same markup, so links are told apart by URL
/// shape only. The grid comes first in the document, which is why the result
/// is capped per page.
#[derive(Debug, Clone)]
pub struct ListingLinkExtractor {
    base: Url,
}

impl ListingLinkExtractor {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Recipe URLs in document order, deduplicated, at most `max_per_page`.
    pub fn extract(&self, listing_html: &str, max_per_page: usize) -> Vec<String> {
        let document = Html::parse_document(listing_html);
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for anchor in select_within(document.root_element(), "a[href]") {
            if urls.len() >= max_per_page {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(url) = self.resolve(href) else {
                continue;
            };
            if !self.is_recipe_url(&url) {
                continue;
            }
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }

        debug!("Found {} recipe links on listing page", urls.len());
        urls
    }

    /// Absolute form of `href`: `http…` links as-is, the rest joined onto the base.
    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        let url = if href.starts_with("http") {
            Url::parse(href).ok()?
        } else {
            self.base.join(href).ok()?
        };
        match url.scheme() {
            "http" | "https" => Some(url.to_string()),
            _ => None,
        }
    }

    fn is_recipe_url(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let path = parsed.path();
        if !RECIPE_PATH.is_match(path) || url.contains(PAGINATION_SEGMENT) {
            return false;
        }
        let slug = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        classify_slug(&slug) == SlugVerdict::Recipe
    }
}

/// Recipe URLs found on `listing_html`, resolved against `base`.
pub fn extract_recipe_links(listing_html: &str, base: &Url, max_per_page: usize) -> Vec<String> {
    ListingLinkExtractor::new(base.clone()).extract(listing_html, max_per_page)
}
