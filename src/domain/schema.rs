// Logical column roles and their accepted header spellings.
//
// Candidates are listed in priority order: the first one present in the
// sheet wins. Matching is case-, accent- and whitespace-insensitive (see
// application::use_cases::column_resolver).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalField {
    Publication,
    PublishedDate,
    Url,
    Content,
    Title,
}

pub const PUBLICATION_CANDIDATES: &[&str] = &["media outlet", "publication", "media", "journal"];

pub const PUBLISHED_DATE_CANDIDATES: &[&str] =
    &["published", "date", "publication_date", "date de parution"];

pub const URL_CANDIDATES: &[&str] = &["url", "lien", "link", "adresse web"];

pub const CONTENT_CANDIDATES: &[&str] = &[
    "snippet", "content", "texte", "text", "body", "résumé", "summary",
];

pub const TITLE_CANDIDATES: &[&str] = &["article", "titre", "title", "intitulé", "headline"];

impl LogicalField {
    pub const MANDATORY: [LogicalField; 3] = [
        LogicalField::Publication,
        LogicalField::PublishedDate,
        LogicalField::Url,
    ];

    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            LogicalField::Publication => PUBLICATION_CANDIDATES,
            LogicalField::PublishedDate => PUBLISHED_DATE_CANDIDATES,
            LogicalField::Url => URL_CANDIDATES,
            LogicalField::Content => CONTENT_CANDIDATES,
            LogicalField::Title => TITLE_CANDIDATES,
        }
    }

    /// Short name shown to the operator in issues.
    pub fn label(self) -> &'static str {
        match self {
            LogicalField::Publication => "publication",
            LogicalField::PublishedDate => "published",
            LogicalField::Url => "URL",
            LogicalField::Content => "content",
            LogicalField::Title => "title",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Actual header text for each mandatory field of one dataset.
///
/// Only constructible with all three mandatory headers present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSchema {
    publication: String,
    published_date: String,
    url: String,
}

impl ResolvedSchema {
    pub fn new(publication: String, published_date: String, url: String) -> Self {
        Self {
            publication,
            published_date,
            url,
        }
    }

    pub fn publication(&self) -> &str {
        &self.publication
    }

    pub fn published_date(&self) -> &str {
        &self.published_date
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
