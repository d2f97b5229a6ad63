//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use inv_core::FeeMarker;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::InvoiceTerms;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the `.ics` calendar export.
    pub calendar_path: PathBuf,
    /// Path to the clients JSON file.
    pub clients_path: PathBuf,
    /// Path to the provider JSON file.
    pub provider_path: PathBuf,
    /// Root folder for generated invoices.
    pub output_dir: PathBuf,
    /// Service description printed on every line.
    pub service_name: String,
    /// Flat fee added to every line.
    pub travel_fee: Decimal,
    /// Summary keyword that marks an entry for the parking fee.
    pub supplemental_keyword: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("calendar_path", &self.calendar_path)
            .field("clients_path", &self.clients_path)
            .field("provider_path", &self.provider_path)
            .field("output_dir", &self.output_dir)
            .field("service_name", &self.service_name)
            .field("travel_fee", &self.travel_fee.to_string())
            .field("supplemental_keyword", &self.supplemental_keyword)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs_config_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            calendar_path: config_dir.join("calendar.ics"),
            clients_path: config_dir.join("clients.json"),
            provider_path: config_dir.join("provider.json"),
            output_dir: PathBuf::from("output"),
            service_name: "Behaviour Intervention".to_string(),
            travel_fee: Decimal::new(300, 2),
            supplemental_keyword: FeeMarker::DEFAULT_KEYWORD.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (INV_*)
        figment = figment.merge(Env::prefixed("INV_"));

        figment.extract()
    }

    pub fn terms(&self) -> InvoiceTerms {
        InvoiceTerms {
            service_name: self.service_name.clone(),
            travel_fee: self.travel_fee,
        }
    }

    pub fn fee_marker(&self) -> FeeMarker {
        FeeMarker::new(&self.supplemental_keyword)
    }
}

/// Returns the platform-specific config directory for inv.
///
/// On Linux: `~/.config/inv`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("inv"))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_inv() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "inv");
    }

    #[test]
    fn test_default_config_reads_inputs_from_config_dir() {
        let config = Config::default();
        let config_dir = dirs_config_path().unwrap();
        assert_eq!(config.calendar_path, config_dir.join("calendar.ics"));
        assert_eq!(config.clients_path, config_dir.join("clients.json"));
        assert_eq!(config.travel_fee, dec!(3.00));
        assert_eq!(config.fee_marker().keyword(), "park");
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "calendar_path = \"/tmp/work.ics\"\ntravel_fee = 4.5\nsupplemental_keyword = \"Meter\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.calendar_path, PathBuf::from("/tmp/work.ics"));
        assert_eq!(config.travel_fee, dec!(4.5));
        assert_eq!(config.fee_marker().keyword(), "meter");
        assert_eq!(config.service_name, "Behaviour Intervention");
    }
}
