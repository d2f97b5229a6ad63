//! Invoice generation for a whole month.
//!
//! [`Invoicer`] wires the pieces together: it loads events from an
//! [`EventSource`], bills every client, prices the entries and hands each
//! invoice to an [`InvoiceRenderer`]. Documents are written to
//! `<output_dir>/<month>/<folder>/<client name>_<MM>_<YYYY>.<ext>`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use inv_core::{Client, ClientBilling, Event, FeeMarker, Period, bill_clients};

use crate::invoice::{Invoice, InvoiceTerms, Provider};
use crate::render::{Document, InvoiceRenderer};

/// Where calendar events come from.
pub trait EventSource {
    fn load(&self) -> Result<Vec<Event>>;
}

/// Events read from an `.ics` file.
#[derive(Debug, Clone)]
pub struct IcsFile {
    path: PathBuf,
}

impl IcsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventSource for IcsFile {
    fn load(&self) -> Result<Vec<Event>> {
        Ok(inv_ics::load_calendar(&self.path)?)
    }
}

/// Events already in memory.
impl EventSource for Vec<Event> {
    fn load(&self) -> Result<Vec<Event>> {
        Ok(self.clone())
    }
}

/// A document written for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenInvoice {
    pub client_name: String,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct Invoicer<S, R> {
    source: S,
    renderer: R,
    clients: Vec<Client>,
    provider: Provider,
    terms: InvoiceTerms,
    marker: FeeMarker,
}

impl<S: EventSource, R: InvoiceRenderer> Invoicer<S, R> {
    pub const fn new(
        source: S,
        renderer: R,
        clients: Vec<Client>,
        provider: Provider,
        terms: InvoiceTerms,
        marker: FeeMarker,
    ) -> Self {
        Self {
            source,
            renderer,
            clients,
            provider,
            terms,
            marker,
        }
    }

    /// Bills every client for `period` and passes the results to `f`.
    pub fn with_billings<T>(
        &self,
        period: Period,
        f: impl FnOnce(&[ClientBilling<'_>]) -> T,
    ) -> Result<T> {
        let events = self.source.load().context("failed to load calendar events")?;
        let billings = bill_clients(&events, &self.clients, period, &self.marker);
        Ok(f(&billings))
    }

    /// Renders and writes invoices for every client with entries in `period`.
    pub fn generate(
        &self,
        period: Period,
        issued_on: NaiveDate,
        output_dir: &Path,
    ) -> Result<Vec<WrittenInvoice>> {
        let _span = tracing::info_span!("generate", %period).entered();

        self.with_billings(period, |billings| -> Result<Vec<WrittenInvoice>> {
            let mut written = Vec::new();
            for billing in billings {
                if billing.is_empty() {
                    tracing::info!(client = %billing.client.id, "no billable entries; skipping invoice");
                    continue;
                }
                let invoice = Invoice::new(billing, &self.provider, &self.terms, issued_on);
                for document in self.renderer.render(&invoice) {
                    let path = write_document(output_dir, &invoice, &document)?;
                    written.push(WrittenInvoice {
                        client_name: invoice.client.name.clone(),
                        path,
                    });
                }
                tracing::info!(client = %billing.client.id, lines = invoice.lines.len(), "finished invoice");
            }
            Ok(written)
        })?
    }
}

/// Path of a rendered document, e.g. `output/april/markdowns/Alice_04_2024.md`.
pub fn document_path(output_dir: &Path, client_name: &str, period: Period, document: &Document) -> PathBuf {
    output_dir
        .join(period.month_slug())
        .join(document.folder)
        .join(format!(
            "{}_{}.{}",
            file_name_safe(client_name),
            period.file_stamp(),
            document.extension
        ))
}

fn write_document(output_dir: &Path, invoice: &Invoice<'_>, document: &Document) -> Result<PathBuf> {
    let path = document_path(output_dir, &invoice.client.name, invoice.period, document);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, &document.contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote document");
    Ok(path)
}

/// Replaces path separators so a client name stays a single file name.
fn file_name_safe(name: &str) -> String {
    let name: String = name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    if name.is_empty() || name == "." || name == ".." {
        "client".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDateTime};
    use inv_core::{ClientId, EventId, Frequency, Recurrence};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use super::*;
    use crate::render::{HtmlRenderer, MarkdownRenderer};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn events() -> Vec<Event> {
        vec![
            Event::new(EventId::new("weekly").unwrap(), "AA", at(1, 9))
                .with_end(at(1, 11))
                .with_recurrence(Recurrence::new(Frequency::Weekly))
                .with_exclusions([NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()]),
            Event::new(EventId::new("extra").unwrap(), "AA - session parking", at(3, 13))
                .with_duration(Duration::minutes(90)),
        ]
    }

    fn invoicer(events: Vec<Event>) -> Invoicer<Vec<Event>, (MarkdownRenderer, HtmlRenderer)> {
        Invoicer::new(
            events,
            (MarkdownRenderer, HtmlRenderer),
            vec![
                Client::new(ClientId::new("AA").unwrap(), "Alice/Smith", dec!(60))
                    .with_parking_rate(dec!(10)),
                Client::new(ClientId::new("BB").unwrap(), "Bob", dec!(50)),
            ],
            Provider {
                name: "Jane Doe".to_string(),
                mailing_address: "1 Main St".to_string(),
                phone_number: "555-0100".to_string(),
            },
            InvoiceTerms {
                service_name: "Behaviour Intervention".to_string(),
                travel_fee: dec!(3),
            },
            FeeMarker::default(),
        )
    }

    #[test]
    fn writes_both_documents_for_clients_with_entries() {
        let temp = TempDir::new().unwrap();
        let period = Period::new(2024, 4).unwrap();
        let issued = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let written = invoicer(events()).generate(period, issued, temp.path()).unwrap();

        let paths: Vec<_> = written
            .iter()
            .map(|w| w.path.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("april/markdowns/Alice_Smith_04_2024.md"),
                PathBuf::from("april/html/Alice_Smith_04_2024.html"),
            ]
        );

        let markdown = std::fs::read_to_string(&written[0].path).unwrap();
        assert!(markdown.contains("### Client Name: Alice/Smith"));
        assert!(markdown.contains("| Behaviour Intervention | April 03, 2024 | 1.50 | $60.00 | $3.00 | $10.00 | $103.00 |"));
        assert!(!markdown.contains("April 15, 2024"));
        assert!(markdown.contains("Total Hours: 9.50 hours"));
    }

    #[test]
    fn nothing_is_written_without_entries() {
        let temp = TempDir::new().unwrap();
        let period = Period::new(2024, 6).unwrap();
        let issued = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let only_one_off = vec![events().remove(1)];

        let written = invoicer(only_one_off).generate(period, issued, temp.path()).unwrap();

        assert!(written.is_empty());
        assert!(!temp.path().join("june").exists());
    }

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(file_name_safe(" A/B\\C "), "A_B_C");
        assert_eq!(file_name_safe(".."), "client");
    }
}
