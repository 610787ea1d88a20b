use std::collections::HashSet;

use tracing::info;

use crate::config::ReconcileConfig;
use crate::dedupe::dedupe;
use crate::merge::{merge_area_pair, standalone_record};
use crate::model::{AreaRecord, Extraction, MergedDataset, SourceTag};
use crate::similarity::similarity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaMatch {
    pub index: usize,
    pub score: f64,
}

pub fn find_best_match(name: &str, candidates: &[AreaRecord], threshold: f64) -> Option<AreaMatch> {
    let mut best: Option<AreaMatch> = None;
    let mut best_score = 0.0_f64;

    for (index, candidate) in candidates.iter().enumerate() {
        let score = similarity(name, &candidate.area_name);
        if score > best_score {
            best_score = score;
            best = Some(AreaMatch { index, score });
        }
    }

    best.filter(|found| found.score >= threshold)
}

pub fn reconcile(left: &Extraction, right: &Extraction, config: &ReconcileConfig) -> MergedDataset {
    info!(
        inspection_areas = left.areas.len(),
        thermal_areas = right.areas.len(),
        "merging extractions"
    );

    let mut areas = Vec::with_capacity(left.areas.len() + right.areas.len());
    let mut duplicate_warnings = Vec::<String>::new();
    // Consumption only gates the unmatched pass below; a consumed candidate
    // stays eligible as best match for later left records.
    let mut consumed = HashSet::<usize>::new();

    for left_area in &left.areas {
        match find_best_match(&left_area.area_name, &right.areas, config.match_threshold) {
            Some(found) => {
                let right_area = &right.areas[found.index];
                consumed.insert(found.index);
                info!(
                    inspection = %left_area.area_name,
                    thermal = %right_area.area_name,
                    score = found.score,
                    "matched areas"
                );

                let merged = merge_area_pair(left_area, right_area, config);
                duplicate_warnings.extend(merged.duplicate_warnings);
                areas.push(merged.record);
            }
            None => areas.push(standalone_record(left_area, SourceTag::InspectionReport)),
        }
    }

    for (index, right_area) in right.areas.iter().enumerate() {
        if consumed.contains(&index) {
            continue;
        }
        info!(
            thermal = %right_area.area_name,
            "thermal area has no inspection match, adding standalone"
        );
        areas.push(standalone_record(right_area, SourceTag::ThermalReport));
    }

    let notes = left
        .global_notes
        .iter()
        .chain(right.global_notes.iter())
        .collect::<Vec<&String>>();
    let global_notes = dedupe(&notes, config.dedup_threshold);
    duplicate_warnings.extend(global_notes.warnings);

    let dataset = MergedDataset {
        areas,
        global_notes: global_notes.unique,
        duplicate_warnings,
    };

    info!(
        areas = dataset.areas.len(),
        matched = dataset.matched_area_count(),
        conflicts = dataset.conflicting_areas().count(),
        duplicate_warnings = dataset.duplicate_warnings.len(),
        "merge complete"
    );

    dataset
}
