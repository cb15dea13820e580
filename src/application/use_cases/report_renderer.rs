// Renders summarized records as an inline-styled HTML fragment that can be
// pasted into a mail body or embedded in a page.

use crate::application::use_cases::row_validator::is_valid_url;
use crate::domain::record::SummarizedRecord;

pub const DEFAULT_REPORT_TITLE: &str = "Revue de presse";

const WRAPPER_STYLE: &str = "font-family:Arial,Helvetica,sans-serif;font-size:14px;line-height:1.45;";
const HEADING_STYLE: &str = "font-size:20px;margin-bottom:16px;";
const CARD_STYLE: &str = "margin-bottom:14px;padding:12px;border:1px solid #e6e6e6;border-radius:8px;";

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Records appear in input order; output is deterministic.
pub fn render(records: &[SummarizedRecord], title: &str) -> String {
    let mut parts = Vec::with_capacity(records.len() * 6 + 3);

    parts.push(format!(r#"<div style="{}">"#, WRAPPER_STYLE));
    parts.push(format!(
        r#"<h1 style="{}">{}</h1>"#,
        HEADING_STYLE,
        escape_html(title)
    ));

    for r in records {
        parts.push(format!(r#"<div style="{}">"#, CARD_STYLE));
        parts.push(format!(
            "<div><b>Publication:</b> {}</div>",
            escape_html(&r.record.publication)
        ));
        parts.push(format!("<div><b>Date:</b> {}</div>", escape_html(&r.record.date)));
        parts.push(format!(
            "<div><b>Résumé:</b> {}</div>",
            escape_html(r.summary_text())
        ));
        if let Some(url) = r.record.url.as_deref().filter(|u| !u.is_empty()) {
            let url_esc = escape_html(url);
            // Only web schemes become links; anything else stays inert text.
            if is_valid_url(url) {
                parts.push(format!(
                    r#"<div><b>Lien:</b> <a href="{}">{}</a></div>"#,
                    url_esc, url_esc
                ));
            } else {
                parts.push(format!("<div><b>Lien:</b> {}</div>", url_esc));
            }
        }
        parts.push("</div>".to_string());
    }

    parts.push("</div>".to_string());
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{NormalizedRecord, SummaryOutcome};

    fn summarized(publication: &str, url: Option<&str>, summary: &str) -> SummarizedRecord {
        SummarizedRecord::new(
            NormalizedRecord {
                publication: publication.into(),
                date: "01/02/2023".into(),
                title: "Titre".into(),
                content: String::new(),
                url: url.map(str::to_string),
            },
            SummaryOutcome::Generated {
                text: summary.into(),
            },
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_script_in_publication_is_escaped() {
        let html = render(
            &[summarized("<script>alert(1)</script>", None, "ok")],
            "Revue",
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_non_web_url_is_not_a_link() {
        let html = render(
            &[summarized("X", Some("javascript:alert(document.cookie)"), "ok")],
            "Revue",
        );
        assert!(!html.contains("<a "));
        assert!(!html.contains("href"));
        assert!(html.contains("<div><b>Lien:</b> javascript:alert(document.cookie)</div>"));

        let html = render(&[summarized("X", Some("not a url"), "ok")], "Revue");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_card_layout() {
        let html = render(
            &[summarized("Le Monde", Some("https://lemonde.fr/x?a=1&b=2"), "Un résumé.")],
            DEFAULT_REPORT_TITLE,
        );
        let expected = [
            r#"<div style="font-family:Arial,Helvetica,sans-serif;font-size:14px;line-height:1.45;">"#,
            r#"<h1 style="font-size:20px;margin-bottom:16px;">Revue de presse</h1>"#,
            r#"<div style="margin-bottom:14px;padding:12px;border:1px solid #e6e6e6;border-radius:8px;">"#,
            "<div><b>Publication:</b> Le Monde</div>",
            "<div><b>Date:</b> 01/02/2023</div>",
            "<div><b>Résumé:</b> Un résumé.</div>",
            r#"<div><b>Lien:</b> <a href="https://lemonde.fr/x?a=1&amp;b=2">https://lemonde.fr/x?a=1&amp;b=2</a></div>"#,
            "</div>",
            "</div>",
        ]
        .join("\n");
        assert_eq!(html, expected);
    }

    #[test]
    fn test_link_omitted_without_url_and_order_kept() {
        let html = render(
            &[
                summarized("B", None, "second"),
                summarized("A", None, "first"),
            ],
            "T",
        );
        assert!(!html.contains("Lien:"));
        assert!(html.find("second").unwrap() < html.find("first").unwrap());
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let records = vec![
            summarized("Le Monde", Some("https://lemonde.fr/x"), "Un"),
            summarized("Libération", None, "Deux"),
        ];
        assert_eq!(render(&records, "Revue"), render(&records, "Revue"));
    }

    #[test]
    fn test_empty_report_has_heading_only() {
        let html = render(&[], "Vide");
        assert_eq!(html.matches("<div").count(), 1);
        assert!(html.contains(">Vide</h1>"));
    }
}
