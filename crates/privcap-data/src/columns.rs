//! Column resolution.
//!
//! Maps the headers of an arbitrary spreadsheet onto the canonical fields the
//! rest of the pipeline understands. Three sources feed the mapping, in
//! increasing priority: fuzzy auto-detection, a named preset for a known
//! export format, and explicit caller overrides.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::DataError;

/// Canonical fields of an investment record.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CanonicalField {
    /// Investment identifier
    #[display("Investment Name")]
    #[serde(rename = "Investment Name")]
    InvestmentName,
    /// Capital invested
    #[display("Cost")]
    #[serde(rename = "Cost")]
    Cost,
    /// Current valuation
    #[display("Fair Value")]
    #[serde(rename = "Fair Value")]
    FairValue,
    /// Investment date
    #[display("Date")]
    #[serde(rename = "Date")]
    Date,
    /// Owning fund
    #[display("Fund Name")]
    #[serde(rename = "Fund Name")]
    FundName,
    /// Company stage (optional)
    #[display("Stage")]
    #[serde(rename = "Stage")]
    Stage,
    /// City (optional)
    #[display("City")]
    #[serde(rename = "City")]
    City,
    /// State or region (optional)
    #[display("State")]
    #[serde(rename = "State")]
    State,
    /// Realized / unrealized status (optional)
    #[display("Realized")]
    #[serde(rename = "Realized")]
    Realized,
}

impl CanonicalField {
    /// The five fields every dataset must provide.
    pub const REQUIRED: [Self; 5] = [
        Self::InvestmentName,
        Self::Cost,
        Self::FairValue,
        Self::Date,
        Self::FundName,
    ];

    /// Fields honored only when present.
    pub const OPTIONAL: [Self; 4] = [Self::Stage, Self::City, Self::State, Self::Realized];

    /// All fields in canonical order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::REQUIRED.into_iter().chain(Self::OPTIONAL)
    }

    /// Human-readable label, identical to the canonical header text.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvestmentName => "Investment Name",
            Self::Cost => "Cost",
            Self::FairValue => "Fair Value",
            Self::Date => "Date",
            Self::FundName => "Fund Name",
            Self::Stage => "Stage",
            Self::City => "City",
            Self::State => "State",
            Self::Realized => "Realized",
        }
    }

    /// Whether normalization fails without this field.
    pub const fn is_required(&self) -> bool {
        matches!(
            self,
            Self::InvestmentName | Self::Cost | Self::FairValue | Self::Date | Self::FundName
        )
    }

    /// Lowercase substrings used by auto-detection, in priority order.
    pub const fn auto_patterns(&self) -> &'static [&'static str] {
        match self {
            Self::InvestmentName => &["investment", "account"],
            Self::Cost => &["invested", "total investment", "amount invested", "cost"],
            Self::FairValue => &["fair value", "valuation"],
            Self::Date => &["date"],
            Self::FundName => &["fund", "parent"],
            Self::Stage => &["stage"],
            Self::City => &["city"],
            Self::State => &["state"],
            Self::Realized => &["realized", "status"],
        }
    }
}

impl FromStr for CanonicalField {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', '-'], " ");
        match key.as_str() {
            "investment name" | "investment" | "name" => Ok(Self::InvestmentName),
            "cost" => Ok(Self::Cost),
            "fair value" | "fv" | "value" => Ok(Self::FairValue),
            "date" | "investment date" => Ok(Self::Date),
            "fund name" | "fund" => Ok(Self::FundName),
            "stage" => Ok(Self::Stage),
            "city" => Ok(Self::City),
            "state" => Ok(Self::State),
            "realized" | "status" => Ok(Self::Realized),
            _ => Err(DataError::UnknownField(s.to_string())),
        }
    }
}

/// Mapping from canonical field to source header.
///
/// May be partial; [`crate::normalize::normalize`] decides whether it is
/// usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<CanonicalField, String>);

impl ColumnMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source header bound to a field.
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Bind a field, replacing any previous binding.
    pub fn insert(&mut self, field: CanonicalField, header: impl Into<String>) {
        self.0.insert(field, header.into());
    }

    /// Whether the field is bound.
    pub fn contains(&self, field: CanonicalField) -> bool {
        self.0.contains_key(&field)
    }

    /// Number of bound fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bindings in canonical field order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.0.iter().map(|(f, h)| (*f, h.as_str()))
    }

    /// Required fields without a binding.
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        CanonicalField::REQUIRED
            .into_iter()
            .filter(|f| !self.contains(*f))
            .collect()
    }

    /// Whether every required field is bound.
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Parse a `FIELD=HEADER` binding as typed on a command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the text has no `=` or names an unknown field.
    pub fn parse_binding(text: &str) -> Result<(CanonicalField, String), DataError> {
        let (field, header) = text
            .split_once('=')
            .ok_or_else(|| DataError::UnknownField(text.to_string()))?;
        Ok((field.parse()?, header.trim().to_string()))
    }
}

impl FromIterator<(CanonicalField, String)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (CanonicalField, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A known export format.
#[derive(Debug, Clone, Copy)]
pub struct ColumnPreset {
    /// Preset name (unique, matched case-insensitively)
    pub name: &'static str,
    /// Brief description of the source system
    pub description: &'static str,
    /// Field bindings
    pub columns: &'static [(CanonicalField, &'static str)],
}

impl ColumnPreset {
    /// Whether every header this preset needs is present.
    pub fn matches(&self, headers: &[String]) -> bool {
        self.columns
            .iter()
            .all(|(_, header)| headers.iter().any(|h| h.trim() == *header))
    }

    /// The preset's bindings as a mapping.
    pub fn mapping(&self) -> ColumnMapping {
        self.columns
            .iter()
            .map(|(field, header)| (*field, (*header).to_string()))
            .collect()
    }
}

const PRESETS: &[ColumnPreset] = &[
    ColumnPreset {
        name: "Salesforce",
        description: "Salesforce account export",
        columns: &[
            (CanonicalField::InvestmentName, "Account Name"),
            (CanonicalField::Cost, "Total Investment"),
            (CanonicalField::FairValue, "Share of Valuation"),
            (CanonicalField::Date, "Valuation Date"),
            (CanonicalField::FundName, "Parent Account"),
        ],
    },
    ColumnPreset {
        name: "Aduro",
        description: "Aduro fund administration export",
        columns: &[
            (CanonicalField::InvestmentName, "Investment Name"),
            (CanonicalField::Cost, "Total Invested Amount"),
            (CanonicalField::FairValue, "Fair Value"),
            (CanonicalField::Date, "Date"),
            (CanonicalField::FundName, "Fund Name"),
        ],
    },
];

/// All built-in presets.
pub const fn presets() -> &'static [ColumnPreset] {
    PRESETS
}

/// Look up a preset by name (case-insensitive).
pub fn find_preset(name: &str) -> Option<&'static ColumnPreset> {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// How the base mapping is chosen before overrides are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Use the first fully-present preset, then fill gaps fuzzily
    #[default]
    Auto,
    /// Use the named preset if all its headers are present
    Preset(String),
    /// Only the caller's overrides
    Manual,
}

impl FromStr for ResolutionMode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "auto-detect" | "autodetect" => Ok(Self::Auto),
            "manual" | "custom" => Ok(Self::Manual),
            other => find_preset(other)
                .map(|p| Self::Preset(p.name.to_string()))
                .ok_or_else(|| DataError::UnknownPreset(s.to_string())),
        }
    }
}

/// Inputs to column resolution besides the headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Base mapping strategy
    pub mode: ResolutionMode,
    /// Explicit bindings applied last
    pub overrides: ColumnMapping,
}

/// Outcome of column resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Resolved bindings (possibly partial)
    pub mapping: ColumnMapping,
    /// Preset that contributed the base mapping, if any
    pub preset: Option<String>,
}

/// Auto-detect bindings by substring match.
///
/// For each field in canonical order, binds the first header (in input
/// order) whose lowercased, trimmed text contains one of the field's
/// patterns.
pub fn auto_detect(headers: &[String]) -> ColumnMapping {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let mut mapping = ColumnMapping::new();
    for field in CanonicalField::all() {
        let patterns = field.auto_patterns();
        if let Some(idx) = lowered
            .iter()
            .position(|h| patterns.iter().any(|p| h.contains(p)))
        {
            mapping.insert(field, headers[idx].trim());
        }
    }
    mapping
}

/// Resolve source headers to canonical fields.
///
/// Never fails; the result may be partial.
pub fn resolve_columns(headers: &[String], options: &ResolveOptions) -> Resolution {
    let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let (mut mapping, preset) = match &options.mode {
        ResolutionMode::Auto => {
            let mut mapping = auto_detect(&headers);
            let preset = PRESETS.iter().find(|p| p.matches(&headers));
            if let Some(preset) = preset {
                tracing::debug!(preset = preset.name, "detected column preset");
                for (field, header) in preset.mapping().iter() {
                    mapping.insert(field, header);
                }
            }
            (mapping, preset.map(|p| p.name.to_string()))
        }
        ResolutionMode::Preset(name) => match find_preset(name) {
            Some(preset) if preset.matches(&headers) => {
                let mut mapping = auto_detect(&headers);
                for (field, header) in preset.mapping().iter() {
                    mapping.insert(field, header);
                }
                (mapping, Some(preset.name.to_string()))
            }
            Some(preset) => {
                tracing::warn!(
                    preset = preset.name,
                    "preset headers not all present, falling back to auto-detect"
                );
                (auto_detect(&headers), None)
            }
            None => {
                tracing::warn!(preset = %name, "unknown preset, falling back to auto-detect");
                (auto_detect(&headers), None)
            }
        },
        ResolutionMode::Manual => (ColumnMapping::new(), None),
    };

    for (field, header) in options.overrides.iter() {
        let header = header.trim();
        if headers.iter().any(|h| h == header) {
            mapping.insert(field, header);
        } else {
            tracing::warn!(%field, header, "override names a column that is not present");
        }
    }

    Resolution { mapping, preset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_auto_detect_salesforce_style() {
        let hs = headers(&[
            "Account Name",
            "Total Investment",
            "Share of Valuation",
            "Valuation Date",
            "Parent Account",
        ]);
        let mapping = auto_detect(&hs);

        assert_eq!(mapping.get(CanonicalField::InvestmentName), Some("Account Name"));
        assert_eq!(mapping.get(CanonicalField::Cost), Some("Total Investment"));
        assert_eq!(mapping.get(CanonicalField::FairValue), Some("Share of Valuation"));
        assert_eq!(mapping.get(CanonicalField::Date), Some("Valuation Date"));
        assert_eq!(mapping.get(CanonicalField::FundName), Some("Parent Account"));
        assert!(mapping.is_complete());
    }

    #[test]
    fn test_auto_detect_first_match_wins() {
        let hs = headers(&["Close Date", "Investment Date", "Name"]);
        let mapping = auto_detect(&hs);
        assert_eq!(mapping.get(CanonicalField::Date), Some("Close Date"));
    }

    #[test]
    fn test_auto_detect_strips_whitespace_and_case() {
        let hs = headers(&["  FAIR VALUE  ", "amount invested"]);
        let mapping = auto_detect(&hs);
        assert_eq!(mapping.get(CanonicalField::FairValue), Some("FAIR VALUE"));
        assert_eq!(mapping.get(CanonicalField::Cost), Some("amount invested"));
    }

    #[test]
    fn test_auto_detect_partial() {
        let hs = headers(&["Company", "Fund"]);
        let mapping = auto_detect(&hs);
        assert_eq!(mapping.get(CanonicalField::FundName), Some("Fund"));
        assert_eq!(
            mapping.missing_required(),
            vec![
                CanonicalField::InvestmentName,
                CanonicalField::Cost,
                CanonicalField::FairValue,
                CanonicalField::Date
            ]
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let hs = headers(&["Investment Name", "Invested", "Valuation", "Date", "Fund"]);
        let a = resolve_columns(&hs, &ResolveOptions::default());
        let b = resolve_columns(&hs, &ResolveOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_preset_beats_auto_detect_when_present() {
        let hs = headers(&[
            "Investment Name",
            "Uninvested Capital",
            "Total Invested Amount",
            "Fair Value",
            "Date",
            "Fund Name",
        ]);
        let auto = auto_detect(&hs);
        assert_eq!(auto.get(CanonicalField::Cost), Some("Uninvested Capital"));

        let resolved = resolve_columns(&hs, &ResolveOptions::default());
        assert_eq!(resolved.preset.as_deref(), Some("Aduro"));
        assert_eq!(resolved.mapping.get(CanonicalField::Cost), Some("Total Invested Amount"));
        assert_eq!(resolved.mapping.get(CanonicalField::InvestmentName), Some("Investment Name"));
    }

    #[test]
    fn test_named_preset_ignored_when_incomplete() {
        let hs = headers(&["Account Name", "Total Investment", "Valuation Date"]);
        let options = ResolveOptions {
            mode: ResolutionMode::Preset("Salesforce".to_string()),
            ..Default::default()
        };
        let resolved = resolve_columns(&hs, &options);
        assert_eq!(resolved.preset, None);
        assert_eq!(resolved.mapping, auto_detect(&hs));
    }

    #[test]
    fn test_overrides_beat_presets() {
        let hs = headers(&[
            "Account Name",
            "Total Investment",
            "Share of Valuation",
            "Valuation Date",
            "Parent Account",
            "Close Date",
        ]);
        let mut overrides = ColumnMapping::new();
        overrides.insert(CanonicalField::Date, "Close Date");
        let options = ResolveOptions {
            mode: ResolutionMode::Preset("salesforce".to_string()),
            overrides,
        };

        let resolved = resolve_columns(&hs, &options);
        assert_eq!(resolved.preset.as_deref(), Some("Salesforce"));
        assert_eq!(resolved.mapping.get(CanonicalField::Date), Some("Close Date"));
        assert_eq!(resolved.mapping.get(CanonicalField::Cost), Some("Total Investment"));
    }

    #[test]
    fn test_override_for_absent_header_is_skipped() {
        let hs = headers(&["Investment Name", "Cost"]);
        let mut overrides = ColumnMapping::new();
        overrides.insert(CanonicalField::Cost, "Nope");
        let options = ResolveOptions { mode: ResolutionMode::Manual, overrides };

        let resolved = resolve_columns(&hs, &options);
        assert!(resolved.mapping.is_empty());
    }

    #[test]
    fn test_manual_mode_uses_only_overrides() {
        let hs = headers(&["Investment Name", "Paid", "NAV", "When", "Vehicle"]);
        let overrides: ColumnMapping = [
            (CanonicalField::InvestmentName, "Investment Name".to_string()),
            (CanonicalField::Cost, " Paid ".to_string()),
        ]
        .into_iter()
        .collect();
        let options = ResolveOptions { mode: ResolutionMode::Manual, overrides };

        let resolved = resolve_columns(&hs, &options);
        assert_eq!(resolved.mapping.len(), 2);
        assert_eq!(resolved.mapping.get(CanonicalField::Cost), Some("Paid"));
    }

    #[rstest]
    #[case("Investment Name", CanonicalField::InvestmentName)]
    #[case("fair_value", CanonicalField::FairValue)]
    #[case(" FUND ", CanonicalField::FundName)]
    #[case("status", CanonicalField::Realized)]
    fn test_field_from_str(#[case] input: &str, #[case] expected: CanonicalField) {
        assert_eq!(input.parse::<CanonicalField>().unwrap(), expected);
    }

    #[rstest]
    #[case("auto", ResolutionMode::Auto)]
    #[case("Custom", ResolutionMode::Manual)]
    #[case("ADURO", ResolutionMode::Preset("Aduro".to_string()))]
    fn test_mode_from_str(#[case] input: &str, #[case] expected: ResolutionMode) {
        assert_eq!(input.parse::<ResolutionMode>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_preset_name() {
        assert!(matches!(
            "Carta".parse::<ResolutionMode>(),
            Err(DataError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_parse_binding() {
        let (field, header) = ColumnMapping::parse_binding("cost= Paid In ").unwrap();
        assert_eq!(field, CanonicalField::Cost);
        assert_eq!(header, "Paid In");
        assert!(ColumnMapping::parse_binding("cost").is_err());
    }

    #[test]
    fn test_display_matches_label() {
        for field in CanonicalField::all() {
            assert_eq!(field.to_string(), field.label());
        }
    }
}
