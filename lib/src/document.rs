//! Rendering items as front-matter documents.

use std::path::PathBuf;
use std::sync::Arc;

use memchr::memmem;
use pulldown_cmark::{Event, Parser, TagEnd};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Chainable, Result};
use crate::ring::Links;
use crate::taxonomy::{Catalog, Item, Location};
use crate::dict;
use crate::value::{Dict, Format, Json, Toml, Value};

/// The `managed_by` marker on every generated document.
pub const MANAGED_BY: &str = "spreadsheet";

/// The layout every generated document uses.
pub const LAYOUT: &str = "work";

/// The schema type used when a row names none.
pub const DEFAULT_SCHEMA_TYPE: &str = "CreativeWork";

/// Length, in characters, of derived excerpts.
pub const EXCERPT_LENGTH: usize = 160;

/// Most keywords kept per document.
pub const MAX_KEYWORDS: usize = 10;

/// Row columns copied into front matter verbatim when non-blank.
const PASS_THROUGH: &[&str] = &["media_hero", "media_alt", "taglines", "references", "album", "series"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMatterFormat {
    /// `+++` fences around TOML.
    #[default]
    Toml,
    /// `---` fences around JSON, which YAML front-matter readers accept.
    Json,
}

impl FrontMatterFormat {
    pub fn fence(self) -> &'static str {
        match self {
            FrontMatterFormat::Toml => "+++",
            FrontMatterFormat::Json => "---",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: FrontMatterFormat,
    /// Written as `last_generated` when present.
    pub generated: Option<Arc<str>>,
}

impl RenderOptions {
    pub fn new(format: FrontMatterFormat) -> Self {
        RenderOptions { format, generated: None }
    }

    /// Stamps documents with the current UTC time.
    pub fn stamped(mut self) -> Self {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        self.generated = Some(now.into());
        self
    }
}

/// A rendered document and where it goes, relative to the output root.
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub location: Location,
    pub path: PathBuf,
    #[debug(ignore)]
    pub text: String,
}

impl Document {
    /// Renders `item` with its `links` resolved through `catalog`.
    pub fn new(item: &Item, links: &Links, catalog: &Catalog, options: &RenderOptions) -> Result<Self> {
        Ok(Document {
            location: item.location.clone(),
            path: Document::path_for(item),
            text: Document::render(item, links, catalog, options)?,
        })
    }

    /// `_<category>/<subgroup...>/<identity>.md`
    pub fn path_for(item: &Item) -> PathBuf {
        let mut path = PathBuf::from(format!("_{}", item.category));
        path.extend(item.subgroup.segments());
        path.push(format!("{}.md", item.identity));
        path
    }

    pub fn front_matter(item: &Item, links: &Links, catalog: &Catalog, options: &RenderOptions) -> Dict {
        let row = &item.source;
        let keywords = row.text("keywords").map(|raw| keywords(&raw)).unwrap_or_default();
        let excerpt = row.text("excerpt")
            .map(|text| text.into_owned())
            .or_else(|| excerpt(&item.body, EXCERPT_LENGTH));

        let mut dict = dict! {
            "layout" => LAYOUT,
            "collection" => item.category.clone(),
            "title" => item.title.clone(),
            "slug" => item.identity.clone(),
            "group" =>? (!item.subgroup.is_empty()).then(|| item.subgroup.to_string()),
            "order" =>? item.order.explicit(),
            "permalink" => item.permalink(),
            "is_homepage" => item.homepage,
            "schema_type" => row.text("schema_type").unwrap_or(DEFAULT_SCHEMA_TYPE.into()),
            "excerpt" =>? excerpt,
            "keywords" =>? (!keywords.is_empty()).then_some(keywords),
            "managed_by" => MANAGED_BY,
            "last_generated" =>? options.generated.clone(),
        };

        for &column in PASS_THROUGH {
            if let Some(text) = row.text(column) {
                dict.insert(column.into(), text.into());
            }
        }

        let nav: Dict = links.iter()
            .map(|(slot, location)| (Arc::from(slot), Value::from(catalog.permalink(location))))
            .collect();

        if !nav.is_empty() {
            dict.insert("nav".into(), nav.into());
        }

        dict
    }

    /// The full text of the document: fenced front matter, then the body.
    pub fn render(item: &Item, links: &Links, catalog: &Catalog, options: &RenderOptions) -> Result<String> {
        let front_matter = Document::front_matter(item, links, catalog, options);
        let fence = options.format.fence();
        let serialized = match options.format {
            FrontMatterFormat::Toml => Toml::to_string(&front_matter)?,
            FrontMatterFormat::Json => Json::to_string(&front_matter)?,
        };

        let mut text = format!("{fence}\n{}\n{fence}\n", serialized.trim_end());
        if !item.body.is_empty() {
            text.push('\n');
            text.push_str(&item.body);
            text.push('\n');
        }

        Ok(text)
    }
}

/// The record written for `item` by a snapshot export.
pub fn export_record(item: &Item) -> Dict {
    let row = &item.source;
    let keywords = row.text("keywords").map(|raw| keywords(&raw)).unwrap_or_default();
    let excerpt = row.text("excerpt")
        .map(|text| text.into_owned())
        .or_else(|| excerpt(&item.body, EXCERPT_LENGTH));

    dict! {
        "collection" => item.category.clone(),
        "is_homepage" => item.homepage,
        "title" => item.title.clone(),
        "slug" => item.identity.clone(),
        "permalink" => item.permalink(),
        "group" => item.subgroup.to_string(),
        "order" => item.order.explicit(),
        "keywords" => keywords,
        "excerpt" => excerpt,
        "body" => item.body.clone(),
    }
}

/// The first sentence of the plain text of the markdown `body`. A sentence
/// longer than `limit` characters is cut to `limit`, then back to its last
/// space, and gets a trailing `...`.
///
/// ```
/// use wayfinder::document::excerpt;
///
/// let body = "# Dawn\n\nThe *first* light. Then the rest.";
/// assert_eq!(excerpt(body, 160).as_deref(), Some("Dawn The first light."));
/// assert_eq!(excerpt("one two three", 9).as_deref(), Some("one two..."));
/// assert_eq!(excerpt("", 160), None);
/// ```
pub fn excerpt(body: &str, limit: usize) -> Option<String> {
    let mut plain = String::new();
    for event in Parser::new(body) {
        match event {
            Event::Text(text) | Event::Code(text) => plain.push_str(&text),
            Event::SoftBreak | Event::HardBreak => plain.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => plain.push(' '),
            _ => {}
        }
    }

    let plain = plain.split_whitespace().collect::<Vec<_>>().join(" ");
    if plain.is_empty() {
        return None;
    }

    let end = plain.char_indices()
        .find(|&(i, c)| matches!(c, '.' | '!' | '?') && plain[i + c.len_utf8()..].starts_with(' '))
        .map_or(plain.len(), |(i, c)| i + c.len_utf8());

    let sentence = &plain[..end];
    let cut = match sentence.char_indices().nth(limit) {
        Some((cut, _)) => cut,
        None => return Some(sentence.to_string()),
    };

    let head = &sentence[..cut];
    let head = head.rsplit_once(' ').map_or(head, |(words, _)| words);
    Some(format!("{head}..."))
}

/// Splits a keyword cell on `,` and `;`, then lowercases, ASCII-folds, and
/// deduplicates the pieces.
///
/// ```
/// use wayfinder::document::keywords;
///
/// assert_eq!(keywords("Café; Night , café,,Rain"), ["cafe", "night", "rain"]);
/// ```
pub fn keywords(raw: &str) -> Vec<String> {
    let mut seen = FxHashSet::default();
    raw.split([',', ';'])
        .map(|keyword| deunicode::deunicode(keyword.trim()).to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .filter(|keyword| seen.insert(keyword.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}

/// Parses the front matter of a document written with either fence. Returns
/// `None` if `text` has no front matter or it does not parse.
pub fn parse_front_matter(text: &str) -> Option<Dict> {
    let format = [FrontMatterFormat::Toml, FrontMatterFormat::Json].into_iter()
        .find(|format| text.starts_with(format.fence()))?;

    let fence = format.fence();
    let rest = text[fence.len()..].strip_prefix('\n')
        .or_else(|| text[fence.len()..].strip_prefix("\r\n"))?;

    let closing = format!("\n{fence}");
    let end = memmem::find(rest.as_bytes(), closing.as_bytes())?;
    let front_matter = &rest[..end];
    match format {
        FrontMatterFormat::Toml => Toml::from_str(front_matter).ok(),
        FrontMatterFormat::Json => Json::from_str(front_matter).ok(),
    }
}

/// Whether `text` is a document this crate generated.
pub fn is_managed(text: &str) -> bool {
    parse_front_matter(text)
        .and_then(|dict| dict.get("managed_by").and_then(Value::as_str).map(|m| m == MANAGED_BY))
        .unwrap_or(false)
}

/// Writes `records` as a pretty JSON array.
pub fn export_json(records: &[Dict]) -> Result<String> {
    Json::to_string(records).chain_with(|| error!("failed to serialize snapshot export"))
}
