//! Invoice document rendering.
//!
//! Two formats are produced from the same [`Invoice`]: Markdown for editing
//! and a self-contained HTML page for printing.

use std::fmt::Write;

use pulldown_cmark::{Options, Parser, html};

use crate::invoice::{Invoice, InvoiceLine, money, two_places};

const DATE_FORMAT: &str = "%B %d, %Y";

/// A rendered document and where it belongs in the month folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Subfolder under the month folder, e.g. `markdowns`.
    pub folder: &'static str,
    pub extension: &'static str,
    pub contents: String,
}

/// Turns an invoice into one or more documents.
pub trait InvoiceRenderer {
    fn render(&self, invoice: &Invoice<'_>) -> Vec<Document>;
}

/// Renders both formats.
impl<A: InvoiceRenderer, B: InvoiceRenderer> InvoiceRenderer for (A, B) {
    fn render(&self, invoice: &Invoice<'_>) -> Vec<Document> {
        let mut documents = self.0.render(invoice);
        documents.extend(self.1.render(invoice));
        documents
    }
}

/// Column headings in display order. Parking is only included when used.
fn columns(with_parking: bool) -> Vec<&'static str> {
    let mut columns = vec!["Service", "Date", "Hours", "Rate", "Travel Fee"];
    if with_parking {
        columns.push("Parking");
    }
    columns.push("Total Fee");
    columns
}

fn cells(invoice: &Invoice<'_>, line: &InvoiceLine, with_parking: bool) -> Vec<String> {
    let mut cells = vec![
        invoice.service_name.to_string(),
        line.date.format(DATE_FORMAT).to_string(),
        two_places(line.hours),
        money(line.rate),
        money(line.travel_fee),
    ];
    if with_parking {
        cells.push(line.parking.map_or_else(|| "-".to_string(), money));
    }
    cells.push(money(line.total));
    cells
}

/// Header fields as (label, value) pairs.
fn header(invoice: &Invoice<'_>) -> [(&'static str, String); 5] {
    [
        ("Service Provider", invoice.provider.name.clone()),
        ("Mailing Address", invoice.provider.mailing_address.clone()),
        ("Phone Number", invoice.provider.phone_number.clone()),
        ("Client Name", invoice.client.name.clone()),
        ("Invoice Period", invoice.period.label()),
    ]
}

// ========== Markdown ==========

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn to_markdown(invoice: &Invoice<'_>) -> String {
        let mut out = String::new();
        let with_parking = invoice.has_parking();

        writeln!(out, "Invoice Date: {}", invoice.issued_on.format(DATE_FORMAT)).unwrap();
        for (label, value) in header(invoice) {
            writeln!(out, "### {label}: {}", escape_markdown(value.trim())).unwrap();
        }
        writeln!(out).unwrap();

        let columns = columns(with_parking);
        writeln!(out, "| {} |", columns.join(" | ")).unwrap();
        writeln!(out, "|{}|", vec![" --- "; columns.len()].join("|")).unwrap();
        for line in &invoice.lines {
            let cells: Vec<String> = cells(invoice, line, with_parking)
                .iter()
                .map(|cell| escape_markdown(cell))
                .collect();
            writeln!(out, "| {} |", cells.join(" | ")).unwrap();
        }
        writeln!(out).unwrap();

        writeln!(out, "Total Hours: {} hours", two_places(invoice.total_hours())).unwrap();
        writeln!(out).unwrap();
        writeln!(out, "Final Invoice Amount: {}", money(invoice.total_amount())).unwrap();
        out
    }
}

/// Backslash-escapes characters Markdown would read as markup or raw HTML.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '&' | '|' | '#') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl InvoiceRenderer for MarkdownRenderer {
    fn render(&self, invoice: &Invoice<'_>) -> Vec<Document> {
        vec![Document {
            folder: "markdowns",
            extension: "md",
            contents: Self::to_markdown(invoice),
        }]
    }
}

// ========== HTML ==========

const STYLE: &str = "table { width: 100%; border-collapse: collapse; }
th, td { border: 1px solid black; padding: 1px; text-align: left; }
th { background-color: #f2f2f2; }";

/// Renders the Markdown document to HTML and wraps it in a printable page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn to_html(invoice: &Invoice<'_>) -> String {
        let markdown = MarkdownRenderer::to_markdown(invoice);
        let parser = Parser::new_ext(&markdown, Options::ENABLE_TABLES);

        let mut body = String::new();
        html::push_html(&mut body, parser);

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <style>\n{STYLE}\n</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
        )
    }
}

impl InvoiceRenderer for HtmlRenderer {
    fn render(&self, invoice: &Invoice<'_>) -> Vec<Document> {
        vec![Document {
            folder: "html",
            extension: "html",
            contents: Self::to_html(invoice),
        }]
    }
}
