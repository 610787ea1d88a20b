use crate::model::{MergedDataset, ValidationResult};

const SEPARATOR_WIDTH: usize = 60;

#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub generated_at: String,
    pub inspection_source: String,
    pub thermal_source: String,
}

pub fn render_report(
    narrative: &str,
    dataset: &MergedDataset,
    validation: Option<&ValidationResult>,
    meta: &ReportMeta,
) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let thin_separator = "-".repeat(SEPARATOR_WIDTH);
    let mut lines = Vec::<String>::new();

    lines.push(separator.clone());
    lines.push(centered("DETAILED DIAGNOSTIC REPORT (DDR)"));
    lines.push(separator.clone());
    lines.push(String::new());
    lines.push(format!("Generated : {}", meta.generated_at));
    lines.push(format!("Source 1  : {}", meta.inspection_source));
    lines.push(format!("Source 2  : {}", meta.thermal_source));
    lines.push(String::new());
    lines.push(separator.clone());
    lines.push(String::new());

    lines.push(narrative.trim_end().to_string());
    lines.push(String::new());

    let mut push_section = |title: &str, body: Vec<String>| {
        lines.push(thin_separator.clone());
        lines.push(title.to_string());
        lines.push(thin_separator.clone());
        lines.extend(body);
        lines.push(String::new());
    };

    let conflicts = dataset.conflicting_areas().collect::<Vec<_>>();
    if !conflicts.is_empty() {
        let body = conflicts
            .iter()
            .flat_map(|area| {
                [
                    format!("  Area: {}", area.area_name),
                    format!("    {}", area.conflict_description.as_deref().unwrap_or_default()),
                    String::new(),
                ]
            })
            .collect();
        push_section("APPENDIX A: CONFLICT SUMMARY", body);
    }

    if !dataset.duplicate_warnings.is_empty() {
        let body = dataset
            .duplicate_warnings
            .iter()
            .map(|warning| format!("  - {warning}"))
            .collect();
        push_section("APPENDIX B: DUPLICATE DATA WARNINGS", body);
    }

    if let Some(validation) = validation.filter(|result| !result.warnings.is_empty()) {
        let mut body = vec![format!("  {}", validation.summary)];
        body.extend(
            validation
                .warnings
                .iter()
                .map(|warning| format!("  - [{}] {}", warning.category.as_str(), warning.detail)),
        );
        push_section("APPENDIX C: VALIDATION WARNINGS", body);
    }

    lines.push(separator.clone());
    lines.push(centered("END OF REPORT"));
    lines.push(separator);

    lines.join("\n")
}

fn centered(title: &str) -> String {
    let padding = SEPARATOR_WIDTH.saturating_sub(title.chars().count()) / 2;
    format!("{}{title}", " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{ReportMeta, render_report};
    use crate::model::{
        MergedDataset, MergedRecord, Severity, SourceTag, ValidationResult, ValidationWarning,
        WarningCategory,
    };

    fn meta() -> ReportMeta {
        ReportMeta {
            generated_at: "2026-03-04T05:06:07Z".to_string(),
            inspection_source: "inspection.json".to_string(),
            thermal_source: "thermal.json".to_string(),
        }
    }

    fn conflicting_dataset() -> MergedDataset {
        MergedDataset {
            areas: vec![MergedRecord {
                area_name: "Bathroom".to_string(),
                inspection_observations: Vec::new(),
                thermal_findings: Vec::new(),
                temperature_readings: Vec::new(),
                visible_damage: Vec::new(),
                moisture_presence: "[CONFLICT] Inspection: Yes | Thermal: No".to_string(),
                other_notes: "Not Available".to_string(),
                conflict_detected: true,
                conflict_description: Some(
                    "Moisture data conflict - Inspection: 'Yes' vs Thermal: 'No'".to_string(),
                ),
                sources: BTreeSet::from([SourceTag::InspectionReport, SourceTag::ThermalReport]),
            }],
            global_notes: Vec::new(),
            duplicate_warnings: vec!["Duplicate removed (sim=1.00): 'a' \u{2248} 'A'".to_string()],
        }
    }

    #[test]
    fn report_without_findings_has_no_appendices() {
        let report = render_report("Body text.", &MergedDataset::default(), None, &meta());
        assert!(report.contains("DETAILED DIAGNOSTIC REPORT (DDR)"));
        assert!(report.contains("Source 1  : inspection.json"));
        assert!(report.contains("Body text."));
        assert!(!report.contains("APPENDIX"));
        assert!(report.ends_with(&"=".repeat(60)));
    }

    #[test]
    fn report_lists_conflicts_duplicates_and_validation_warnings() {
        let validation = ValidationResult {
            passed: true,
            warnings: vec![ValidationWarning {
                category: WarningCategory::UnknownArea,
                detail: "Area name 'attic' appears in the narrative but was not found in merged data."
                    .to_string(),
                severity: Severity::Warning,
            }],
            summary: "Validation complete: 1 warning(s) found.".to_string(),
        };

        let report = render_report("Body.", &conflicting_dataset(), Some(&validation), &meta());
        assert!(report.contains("APPENDIX A: CONFLICT SUMMARY"));
        assert!(report.contains("  Area: Bathroom"));
        assert!(report.contains("    Moisture data conflict - Inspection: 'Yes' vs Thermal: 'No'"));
        assert!(report.contains("APPENDIX B: DUPLICATE DATA WARNINGS"));
        assert!(report.contains("APPENDIX C: VALIDATION WARNINGS"));
        assert!(report.contains("  - [unknown_area] Area name 'attic'"));

        let conflict_at = report.find("APPENDIX A").expect("appendix a");
        let duplicate_at = report.find("APPENDIX B").expect("appendix b");
        assert!(conflict_at < duplicate_at);
    }
}
