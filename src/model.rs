use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::PipelineConfig;

pub const NOT_AVAILABLE: &str = "Not Available";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub area_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inspection_observations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub thermal_findings: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub temperature_readings: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visible_damage: Vec<String>,
    #[serde(default)]
    pub moisture_presence: Option<String>,
    #[serde(default)]
    pub other_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub areas: Vec<AreaRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub global_notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    InspectionReport,
    ThermalReport,
}

impl SourceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InspectionReport => "inspection_report",
            Self::ThermalReport => "thermal_report",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub area_name: String,
    pub inspection_observations: Vec<String>,
    pub thermal_findings: Vec<String>,
    pub temperature_readings: Vec<String>,
    pub visible_damage: Vec<String>,
    pub moisture_presence: String,
    pub other_notes: String,
    pub conflict_detected: bool,
    pub conflict_description: Option<String>,
    pub sources: BTreeSet<SourceTag>,
}

impl MergedRecord {
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.inspection_observations
            .iter()
            .chain(self.thermal_findings.iter())
            .chain(self.temperature_readings.iter())
            .chain(self.visible_damage.iter())
            .map(String::as_str)
            .chain([self.moisture_presence.as_str(), self.other_notes.as_str()])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedDataset {
    pub areas: Vec<MergedRecord>,
    pub global_notes: Vec<String>,
    pub duplicate_warnings: Vec<String>,
}

impl MergedDataset {
    pub fn conflicting_areas(&self) -> impl Iterator<Item = &MergedRecord> {
        self.areas.iter().filter(|area| area.conflict_detected)
    }

    pub fn matched_area_count(&self) -> usize {
        self.areas
            .iter()
            .filter(|area| area.sources.len() > 1)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    UnknownArea,
    UngroundedNumber,
    Hallucination,
}

impl WarningCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownArea => "unknown_area",
            Self::UngroundedNumber => "ungrounded_number",
            Self::Hallucination => "hallucination",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub category: WarningCategory,
    pub detail: String,
    #[serde(default)]
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub warnings: Vec<ValidationWarning>,
    pub summary: String,
}

impl ValidationResult {
    pub fn count_category(&self, category: WarningCategory) -> usize {
        self.warnings
            .iter()
            .filter(|warning| warning.category == category)
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputFile {
    pub role: String,
    pub path: String,
    pub sha256: String,
    pub repaired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutputs {
    pub merged_data_path: String,
    pub validation_result_path: Option<String>,
    pub report_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunCounts {
    pub inspection_area_count: usize,
    pub thermal_area_count: usize,
    pub merged_area_count: usize,
    pub matched_area_count: usize,
    pub conflict_count: usize,
    pub duplicate_warning_count: usize,
    pub validation_warning_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub config: PipelineConfig,
    pub inputs: Vec<InputFile>,
    pub outputs: RunOutputs,
    pub counts: RunCounts,
    pub validation_passed: Option<bool>,
    pub warnings: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
