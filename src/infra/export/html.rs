use std::fmt::Write as _;
use std::io::Write;

use crate::domain::entities::report::{
    CoverPage, DetailSection, LetterPage, NotesSection, ReportDocument,
};
use crate::infra::export::layout::PageLayout;
use crate::usecase::ports::exporter::{ExportError, ReportExporter};

const STYLE: &str = "
@page { size: letter; margin: 0; }
body { font-family: Helvetica, Arial, sans-serif; font-size: 10pt; margin: 0; }
.page { page-break-after: always; padding: 12mm 15mm; box-sizing: border-box; min-height: 279.4mm; position: relative; }
.page:last-child { page-break-after: auto; }
.cover h1 { font-size: 22pt; margin-top: 60mm; text-align: center; }
.cover p { text-align: center; font-size: 12pt; }
table { width: 100%; border-collapse: collapse; }
th { text-align: left; border-bottom: 1px solid #444; padding: 2mm; }
td { padding: 2mm; vertical-align: top; }
tr:nth-child(even) td { background: #fafafa; }
.continued { color: #666; font-size: 9pt; }
.footer { position: absolute; bottom: 8mm; right: 15mm; font-size: 8pt; color: #666; }
";

/// Writes the report as a single print-ready HTML file, one `.page` block per
/// printed page.
#[derive(Debug, Clone, Default)]
pub struct HtmlExporter {
    pub layout: PageLayout,
}

impl HtmlExporter {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    fn render(&self, document: &ReportDocument) -> Result<String, ExportError> {
        if self.layout.available_height() <= self.layout.table_header_height {
            return Err(ExportError::Render(
                "page layout leaves no room for table rows".to_string(),
            ));
        }

        let mut pages = Vec::new();
        pages.push(cover_page(&document.cover));
        pages.push(letter_page(&document.letter));
        pages.extend(self.notes_pages(&document.notes));
        pages.extend(self.detail_pages(&document.detail));

        let total = pages.len();
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
        let _ = write!(html, "<title>{}</title>", escape(&document.cover.title));
        let _ = write!(html, "<style>{STYLE}</style></head><body>\n");
        for (idx, body) in pages.iter().enumerate() {
            let _ = write!(
                html,
                "<section class=\"page\">{body}<div class=\"footer\">Page {} of {total}</div></section>\n",
                idx + 1
            );
        }
        html.push_str("</body></html>\n");
        Ok(html)
    }

    fn notes_pages(&self, notes: &NotesSection) -> Vec<String> {
        let ranges = self.layout.paginate(&notes.rows, |row| row.note.as_str());
        ranges
            .iter()
            .enumerate()
            .map(|(page_idx, range)| {
                let mut body = section_heading(&notes.title, page_idx);
                let _ = write!(
                    body,
                    "<table><thead><tr><th>{}</th><th>{}</th></tr></thead><tbody>",
                    escape(&notes.unit_header),
                    escape(&notes.note_header)
                );
                for row in &notes.rows[range.clone()] {
                    let _ = write!(
                        body,
                        "<tr><td>{}</td><td>{}</td></tr>",
                        escape(&row.unit),
                        escape(&row.note)
                    );
                }
                body.push_str("</tbody></table>");
                body
            })
            .collect()
    }

    fn detail_pages(&self, detail: &DetailSection) -> Vec<String> {
        let ranges = self.layout.paginate(&detail.rows, |row| row.note.as_str());
        ranges
            .iter()
            .enumerate()
            .map(|(page_idx, range)| {
                let mut body = section_heading(&detail.title, page_idx);
                body.push_str("<table><thead><tr>");
                for (_, label) in &detail.columns {
                    let _ = write!(body, "<th>{}</th>", escape(label));
                }
                body.push_str("</tr></thead><tbody>");
                for row in &detail.rows[range.clone()] {
                    body.push_str("<tr>");
                    for (column, _) in &detail.columns {
                        let _ = write!(body, "<td>{}</td>", escape(row.cell(*column)));
                    }
                    body.push_str("</tr>");
                }
                body.push_str("</tbody></table>");
                body
            })
            .collect()
    }
}

impl ReportExporter for HtmlExporter {
    fn export(&self, document: &ReportDocument, out: &mut dyn Write) -> Result<(), ExportError> {
        let html = self.render(document)?;
        out.write_all(html.as_bytes())?;
        out.flush()?;
        tracing::info!(
            notes = document.notes.rows.len(),
            units = document.detail.rows.len(),
            bytes = html.len(),
            "report exported"
        );
        Ok(())
    }
}

fn section_heading(title: &str, page_idx: usize) -> String {
    if page_idx == 0 {
        format!("<h2>{}</h2>", escape(title))
    } else {
        format!(
            "<h2>{} <span class=\"continued\">(continued)</span></h2>",
            escape(title)
        )
    }
}

fn cover_page(cover: &CoverPage) -> String {
    let mut body = String::from("<div class=\"cover\">");
    let _ = write!(body, "<h1>{}</h1>", escape(&cover.title));
    for line in [&cover.property_name, &cover.location, &cover.customer_name, &cover.date] {
        if !line.trim().is_empty() {
            let _ = write!(body, "<p>{}</p>", escape(line));
        }
    }
    body.push_str("</div>");
    body
}

fn letter_page(letter: &LetterPage) -> String {
    let mut body = String::new();
    let _ = write!(body, "<p>{}</p>", escape(&letter.date));
    body.push_str("<p>");
    for line in [&letter.property_name, &letter.customer_name, &letter.location] {
        if !line.trim().is_empty() {
            let _ = write!(body, "{}<br>", escape(line));
        }
    }
    body.push_str("</p>");
    let _ = write!(body, "<p><strong>{}</strong></p>", escape(&letter.re_line));
    let _ = write!(body, "<p>{}</p>", escape(&letter.salutation));
    for paragraph in &letter.paragraphs {
        let _ = write!(body, "<p>{}</p>", escape(paragraph));
    }
    let _ = write!(
        body,
        "<p>Sincerely,</p><p>{}<br>{}</p>",
        escape(&letter.signature_name),
        escape(&letter.signature_title)
    );
    body
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
