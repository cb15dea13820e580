// ============================================================
// ROW VALIDATOR
// ============================================================
// Resolves the sheet schema and reports data-quality issues before any
// summarization call is made.

use crate::application::use_cases::column_resolver::resolve_field;
use crate::application::use_cases::date_normalizer::{coerce, DateCoercion};
use crate::domain::issue::Issue;
use crate::domain::schema::{LogicalField, ResolvedSchema};
use crate::domain::table::Table;
use tracing::{debug, info};
use url::{Host, Url};

/// Offset from a 0-based data row index to the sheet row number shown to
/// the operator: one header row, and sheets count from 1.
pub const SHEET_ROW_OFFSET: usize = 2;

/// Everything the rest of the pipeline needs from one validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Discovery order, never deduplicated.
    pub issues: Vec<Issue>,
    pub schema: Option<ResolvedSchema>,
    pub content_header: Option<String>,
    pub title_header: Option<String>,
    /// One entry per table row; empty when the schema is unusable.
    pub dates: Vec<DateCoercion>,
}

impl ValidationReport {
    pub fn is_usable(&self) -> bool {
        self.schema.is_some()
    }

    pub fn issue_messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.to_string()).collect()
    }
}

pub fn validate(table: &Table) -> ValidationReport {
    let headers = table.headers();
    let mut issues = Vec::new();

    let mut resolved: Vec<Option<String>> = Vec::with_capacity(LogicalField::MANDATORY.len());
    for field in LogicalField::MANDATORY {
        let header = resolve_field(headers, field).map(str::to_string);
        if header.is_none() {
            issues.push(Issue::blocking(format!(
                "Colonne requise manquante : {} (attendu parmi {:?})",
                field.label(),
                field.candidates()
            )));
        }
        resolved.push(header);
    }

    let content_header = resolve_field(headers, LogicalField::Content).map(str::to_string);
    let title_header = resolve_field(headers, LogicalField::Title).map(str::to_string);

    if content_header.is_none() {
        issues.push(Issue::info(
            "Pas de colonne de contenu trouvée (résumés plus pauvres).",
        ));
    }
    if title_header.is_none() {
        issues.push(Issue::info("Pas de colonne de titre trouvée."));
    }

    let schema = match (resolved[0].take(), resolved[1].take(), resolved[2].take()) {
        (Some(publication), Some(published), Some(url)) => {
            ResolvedSchema::new(publication, published, url)
        }
        _ => {
            info!(issues = issues.len(), "Mandatory columns missing, dataset rejected");
            return ValidationReport {
                issues,
                schema: None,
                content_header: None,
                title_header: None,
                dates: Vec::new(),
            };
        }
    };

    debug!(
        publication = schema.publication(),
        published = schema.published_date(),
        url = schema.url(),
        content = ?content_header,
        title = ?title_header,
        "Schema resolved"
    );

    let dates: Vec<DateCoercion> = table.column(schema.published_date()).map(coerce).collect();

    let blank_publications = table
        .column(schema.publication())
        .filter(|cell| cell.is_blank())
        .count();
    if blank_publications > 0 {
        issues.push(Issue::info(format!(
            "{} ligne(s) avec '{}' vide.",
            blank_publications,
            schema.publication()
        )));
    }

    let invalid_urls: Vec<usize> = table
        .column(schema.url())
        .enumerate()
        .filter(|(_, cell)| !cell.is_blank() && !is_valid_url(&cell.trimmed()))
        .map(|(idx, _)| idx + SHEET_ROW_OFFSET)
        .collect();
    if !invalid_urls.is_empty() {
        issues.push(Issue::info(format!(
            "URLs invalides aux lignes {:?}",
            invalid_urls
        )));
    }

    info!(
        rows = table.len(),
        issues = issues.len(),
        "Validation complete"
    );

    ValidationReport {
        issues,
        schema: Some(schema),
        content_header,
        title_header,
        dates,
    }
}

/// Absolute web URL with a plausible host.
pub fn is_valid_url(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }

    let Ok(url) = Url::parse(value) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https" | "ftp") {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.');
            domain.contains('.')
                && domain
                    .split('.')
                    .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::issue::IssueSeverity;
    use crate::domain::table::CellValue;

    fn table(headers: &[&str], rows: Vec<Vec<&str>>) -> Table {
        Table::from_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_url_syntax_check() {
        assert!(is_valid_url("https://example.com/a"));
        assert!(is_valid_url("http://192.168.0.1/path?q=1"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("www.example.com"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("https://localhost"));
    }

    #[test]
    fn test_missing_mandatory_field_blocks_dataset() {
        let t = table(&["Media", "Titre"], vec![vec!["Le Monde", "A"]]);
        let report = validate(&t);

        assert!(!report.is_usable());
        assert!(report.content_header.is_none());
        assert!(report.title_header.is_none());
        assert!(report.dates.is_empty());

        let blocking: Vec<_> = report.issues.iter().filter(|i| i.is_blocking()).collect();
        assert_eq!(blocking.len(), 2);
        assert!(blocking[0].message.contains("published"));
        assert!(blocking[1].message.contains("URL"));
        assert!(blocking[1].message.contains("adresse web"));
    }

    #[test]
    fn test_all_mandatory_missing() {
        let t = table(&["foo"], vec![]);
        let report = validate(&t);
        assert!(report.schema.is_none());
        assert_eq!(report.issues.iter().filter(|i| i.is_blocking()).count(), 3);
    }

    #[test]
    fn test_schema_resolves_with_optional_columns_missing() {
        let t = table(
            &["MÉDIA", "Date", "Lien"],
            vec![vec!["Le Monde", "01/02/2023", "https://lemonde.fr/x"]],
        );
        let report = validate(&t);
        let schema = report.schema.as_ref().unwrap();

        assert_eq!(schema.publication(), "MÉDIA");
        assert_eq!(schema.published_date(), "Date");
        assert_eq!(schema.url(), "Lien");
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.iter().all(|i| i.severity == IssueSeverity::Info));
    }

    #[test]
    fn test_blank_publications_and_invalid_urls_are_aggregated() {
        let t = table(
            &["media", "date", "url", "titre", "texte"],
            vec![
                vec!["Le Monde", "2024-03-05", "https://lemonde.fr/a", "A", ""],
                vec!["  ", "n/a", "not a url", "B", ""],
                vec!["", "", "", "C", ""],
                vec!["Libé", "05/03/2024", "lemonde", "D", ""],
            ],
        );
        let report = validate(&t);

        assert!(report.is_usable());
        assert_eq!(
            report.issue_messages(),
            vec![
                "⚠️ 2 ligne(s) avec 'media' vide.".to_string(),
                "⚠️ URLs invalides aux lignes [3, 5]".to_string(),
            ]
        );
    }

    #[test]
    fn test_dates_are_precomputed_per_row() {
        let t = table(
            &["media", "date", "url"],
            vec![
                vec!["A", "2024-03-05", ""],
                vec!["B", "n/a", ""],
                vec!["C", "", ""],
            ],
        );
        let report = validate(&t);

        assert_eq!(report.dates.len(), 3);
        assert!(report.dates[0].date().is_some());
        assert!(matches!(report.dates[1], DateCoercion::Unparseable { .. }));
        assert_eq!(report.dates[2], DateCoercion::Blank);
    }
}
