//! Generate command: writes invoice documents for the month.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use inv_core::Period;

use crate::Config;
use crate::clients::{load_clients, load_provider};
use crate::invoicer::{IcsFile, Invoicer, WrittenInvoice};
use crate::render::{HtmlRenderer, MarkdownRenderer};

/// Format the list of written files for the terminal.
pub fn format_summary(written: &[WrittenInvoice], period: Period) -> String {
    let mut output = String::new();

    if written.is_empty() {
        writeln!(output, "No billable entries for {}; nothing written.", period.label()).unwrap();
        return output;
    }

    let clients = {
        let mut names: Vec<&str> = written.iter().map(|w| w.client_name.as_str()).collect();
        names.dedup();
        names.len()
    };
    writeln!(output, "Invoices for {} ({clients} clients):", period.label()).unwrap();
    for invoice in written {
        writeln!(output, "  {}", invoice.path.display()).unwrap();
    }
    output
}

pub fn run(config: &Config, period: Period, issued_on: NaiveDate, output: Option<&Path>) -> Result<()> {
    // Inputs are read up front so a missing file fails before any client is billed.
    let clients = load_clients(&config.clients_path)?;
    let provider = load_provider(&config.provider_path)?;

    let invoicer = Invoicer::new(
        IcsFile::new(&config.calendar_path),
        (MarkdownRenderer, HtmlRenderer),
        clients,
        provider,
        config.terms(),
        config.fee_marker(),
    );
    let output_dir = output.unwrap_or(&config.output_dir);
    let written = invoicer.generate(period, issued_on, output_dir)?;

    print!("{}", format_summary(&written, period));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use insta::assert_snapshot;

    use super::*;

    fn written(name: &str, path: &str) -> WrittenInvoice {
        WrittenInvoice {
            client_name: name.to_string(),
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_format_summary() {
        let period = Period::new(2024, 4).unwrap();
        let output = format_summary(
            &[
                written("Alice", "output/april/markdowns/Alice_04_2024.md"),
                written("Alice", "output/april/html/Alice_04_2024.html"),
                written("Bob", "output/april/markdowns/Bob_04_2024.md"),
                written("Bob", "output/april/html/Bob_04_2024.html"),
            ],
            period,
        );

        assert_snapshot!(output, @r"
        Invoices for April 2024 (2 clients):
          output/april/markdowns/Alice_04_2024.md
          output/april/html/Alice_04_2024.html
          output/april/markdowns/Bob_04_2024.md
          output/april/html/Bob_04_2024.html
        ");
    }

    #[test]
    fn test_format_summary_empty() {
        let output = format_summary(&[], Period::new(2024, 2).unwrap());
        assert_eq!(output, "No billable entries for February 2024; nothing written.\n");
    }
}
