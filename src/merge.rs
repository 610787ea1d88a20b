use std::collections::BTreeSet;

use tracing::warn;

use crate::config::ReconcileConfig;
use crate::dedupe::{Deduplicated, dedupe};
use crate::model::{AreaRecord, MergedRecord, NOT_AVAILABLE, SourceTag};
use crate::similarity::similarity;

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarMerge {
    pub value: String,
    pub conflict: bool,
}

pub fn merge_scalar(left: Option<&str>, right: Option<&str>, config: &ReconcileConfig) -> ScalarMerge {
    let left = left.map(str::trim).unwrap_or_default();
    let right = right.map(str::trim).unwrap_or_default();

    let agreed = |value: &str| ScalarMerge {
        value: value.to_string(),
        conflict: false,
    };

    match (left.is_empty(), right.is_empty()) {
        (true, true) => agreed(NOT_AVAILABLE),
        (true, false) => agreed(right),
        (false, true) => agreed(left),
        (false, false) => {
            if similarity(left, right) >= config.scalar_agreement_threshold {
                if right.chars().count() > left.chars().count() {
                    agreed(right)
                } else {
                    agreed(left)
                }
            } else {
                ScalarMerge {
                    value: format!(
                        "[CONFLICT] {}: {left} | {}: {right}",
                        config.left_label, config.right_label
                    ),
                    conflict: true,
                }
            }
        }
    }
}

pub fn merge_lists(left: &[String], right: &[String], threshold: f64) -> Deduplicated {
    let combined = left.iter().chain(right.iter()).collect::<Vec<&String>>();
    dedupe(&combined, threshold)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaMerge {
    pub record: MergedRecord,
    pub duplicate_warnings: Vec<String>,
}

pub fn merge_area_pair(left: &AreaRecord, right: &AreaRecord, config: &ReconcileConfig) -> AreaMerge {
    let mut duplicate_warnings = Vec::<String>::new();
    let mut merge_list = |left_items: &[String], right_items: &[String]| {
        let merged = merge_lists(left_items, right_items, config.dedup_threshold);
        duplicate_warnings.extend(merged.warnings);
        merged.unique
    };

    let inspection_observations =
        merge_list(&left.inspection_observations, &right.inspection_observations);
    let thermal_findings = merge_list(&left.thermal_findings, &right.thermal_findings);
    let temperature_readings = merge_list(&left.temperature_readings, &right.temperature_readings);
    let visible_damage = merge_list(&left.visible_damage, &right.visible_damage);

    let moisture = merge_scalar(
        left.moisture_presence.as_deref(),
        right.moisture_presence.as_deref(),
        config,
    );
    let notes = merge_scalar(left.other_notes.as_deref(), right.other_notes.as_deref(), config);

    let mut conflict_parts = Vec::<String>::new();
    if moisture.conflict {
        warn!(
            area = %left.area_name,
            field = "moisture_presence",
            "conflicting values between sources"
        );
        conflict_parts.push(describe_conflict(
            "Moisture data conflict",
            left.moisture_presence.as_deref(),
            right.moisture_presence.as_deref(),
            config,
        ));
    }
    if notes.conflict {
        warn!(
            area = %left.area_name,
            field = "other_notes",
            "conflicting values between sources"
        );
        conflict_parts.push(describe_conflict(
            "Notes conflict",
            left.other_notes.as_deref(),
            right.other_notes.as_deref(),
            config,
        ));
    }

    let conflict_description = (!conflict_parts.is_empty()).then(|| conflict_parts.join("; "));

    AreaMerge {
        record: MergedRecord {
            area_name: left.area_name.clone(),
            inspection_observations,
            thermal_findings,
            temperature_readings,
            visible_damage,
            moisture_presence: moisture.value,
            other_notes: notes.value,
            conflict_detected: conflict_description.is_some(),
            conflict_description,
            sources: BTreeSet::from([SourceTag::InspectionReport, SourceTag::ThermalReport]),
        },
        duplicate_warnings,
    }
}

pub fn standalone_record(record: &AreaRecord, source: SourceTag) -> MergedRecord {
    MergedRecord {
        area_name: record.area_name.clone(),
        inspection_observations: record.inspection_observations.clone(),
        thermal_findings: record.thermal_findings.clone(),
        temperature_readings: record.temperature_readings.clone(),
        visible_damage: record.visible_damage.clone(),
        moisture_presence: scalar_or_not_available(record.moisture_presence.as_deref()),
        other_notes: scalar_or_not_available(record.other_notes.as_deref()),
        conflict_detected: false,
        conflict_description: None,
        sources: BTreeSet::from([source]),
    }
}

fn scalar_or_not_available(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn describe_conflict(
    heading: &str,
    left: Option<&str>,
    right: Option<&str>,
    config: &ReconcileConfig,
) -> String {
    format!(
        "{heading} - {}: '{}' vs {}: '{}'",
        config.left_label,
        left.map(str::trim).unwrap_or_default(),
        config.right_label,
        right.map(str::trim).unwrap_or_default()
    )
}
