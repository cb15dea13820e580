use crate::application::use_cases::date_normalizer::{coerce, format_date, DateCoercion};
use crate::domain::record::NormalizedRecord;
use crate::domain::schema::ResolvedSchema;
use crate::domain::table::RawRow;

/// Turn one raw row into a record ready for summarization.
///
/// `precomputed_date` is the validator's coercion for this row; when absent
/// the date cell is coerced here. Total over any cell content.
pub fn transform(
    row: &RawRow,
    schema: &ResolvedSchema,
    content_header: Option<&str>,
    title_header: Option<&str>,
    precomputed_date: Option<&DateCoercion>,
) -> NormalizedRecord {
    let publication = row.text(schema.publication());

    let url = Some(row.text(schema.url())).filter(|u| !u.is_empty());

    let date_cell = row.get(schema.published_date());
    let date = match precomputed_date {
        Some(coercion) => coercion.date(),
        None => coerce(date_cell).date(),
    }
    .map(format_date)
    .unwrap_or_else(|| date_cell.trimmed());

    let title = match title_header {
        Some(header) => row.text(header),
        None => publication.clone(),
    };

    let content = content_header.map(|h| row.text(h)).unwrap_or_default();

    NormalizedRecord {
        publication,
        date,
        title,
        content,
        url,
    }
}
