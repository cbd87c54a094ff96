// Report configuration.
//
// Field names, dimension lists and display settings live here so a new
// dataset layout only needs a TOML file, not a code change.
use crate::error::{ClaimsError, Result};
use num_format::Locale;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Prefix for monetary KPI strings.
    pub currency_symbol: String,
    /// `num-format` locale name used for digit grouping (e.g. `en-IN`).
    pub locale: String,

    pub date_field: String,
    pub claim_amount_field: String,
    pub settled_amount_field: String,
    pub tat_field: String,
    pub aging_days_field: String,
    pub registration_field: String,

    /// chrono layouts tried in order when parsing the date field.
    pub date_layouts: Vec<String>,

    pub pivot_dimensions: Vec<String>,
    pub filter_dimensions: Vec<String>,
    pub trend_categories: Vec<String>,
    pub trend_top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            currency_symbol: "₹".to_string(),
            locale: "en-IN".to_string(),
            date_field: "Claim Intimation Date".to_string(),
            claim_amount_field: "Claim Amount".to_string(),
            settled_amount_field: "Settled Amount".to_string(),
            tat_field: "TAT".to_string(),
            aging_days_field: "Aging Days".to_string(),
            registration_field: "Registered to Insurer".to_string(),
            date_layouts: strings(&[
                "%Y-%m-%d",
                "%d-%m-%Y",
                "%d/%m/%Y",
                "%d-%b-%Y",
                "%d %b %Y",
                "%m/%d/%Y",
                "%Y/%m/%d",
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%dT%H:%M:%S",
                "%d-%m-%Y %H:%M:%S",
                "%d/%m/%Y %H:%M",
                // Two-digit years; four-digit layouts are tried first.
                "%d/%m/%y",
                "%d-%m-%y",
            ]),
            pivot_dimensions: strings(&[
                "Region",
                "State",
                "Filed By",
                "Product",
                "Aging Days Bucketing",
                "Registered to Insurer",
                "TAT Group",
                "Customer Gender",
                "Construct Type",
            ]),
            filter_dimensions: strings(&[
                "Region",
                "State",
                "Filed By",
                "Product",
                "Registered to Insurer",
                "Aging Days Bucketing",
            ]),
            trend_categories: strings(&[
                "Registered to Insurer",
                "Aging Days Bucketing",
                "TAT Group",
                "Customer Gender",
                "Construct Type",
                "State",
                "Product",
            ]),
            trend_top_n: 6,
        }
    }
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

impl ReportConfig {
    /// Load a config from a TOML file. Keys missing from the file keep
    /// their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: ReportConfig = toml::from_str(&text)?;
        // Fail at load time rather than at first KPI render.
        cfg.number_locale()?;
        Ok(cfg)
    }

    /// Resolve `locale` into a `num-format` locale. Accepts both `en-IN`
    /// and `en_IN` spellings.
    pub fn number_locale(&self) -> Result<Locale> {
        let name = self.locale.trim();
        Locale::from_name(name)
            .or_else(|_| Locale::from_name(name.replace('_', "-")))
            .or_else(|_| Locale::from_name(name.replace('-', "_")))
            .map_err(|_| ClaimsError::UnknownLocale(self.locale.clone()))
    }
}
