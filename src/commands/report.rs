use anyhow::Result;
use tracing::info;

use crate::cli::ReportArgs;
use crate::model::{MergedDataset, ValidationResult};
use crate::report::{ReportMeta, render_report};
use crate::util::{now_utc_string, read_json, read_text, write_text};

pub fn run(args: ReportArgs) -> Result<()> {
    let dataset: MergedDataset = read_json(&args.merged)?;
    let narrative = read_text(&args.narrative)?;
    let validation = args
        .validation
        .as_deref()
        .map(read_json::<ValidationResult>)
        .transpose()?;

    let meta = ReportMeta {
        generated_at: now_utc_string(),
        inspection_source: args.inspection_label,
        thermal_source: args.thermal_label,
    };
    let report = render_report(&narrative, &dataset, validation.as_ref(), &meta);

    write_text(&args.output, &report)?;
    info!(
        path = %args.output.display(),
        chars = report.len(),
        "wrote final report"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::cli::ReportArgs;
    use crate::model::{MergedDataset, ValidationResult};
    use crate::util::{read_text, write_json_pretty, write_text};

    #[test]
    fn report_command_renders_labels_and_validation_appendix() {
        let dir = tempfile::tempdir().expect("temp dir");
        let merged = dir.path().join("merged_data.json");
        let narrative = dir.path().join("narrative.txt");
        let validation = dir.path().join("validation_result.json");
        let output = dir.path().join("out").join("ddr_report.txt");

        write_json_pretty(&merged, &MergedDataset::default()).expect("write merged");
        write_text(&narrative, "Summary of findings.").expect("write narrative");
        let result: ValidationResult = serde_json::from_str(
            r#"{"passed": true, "warnings": [{"category": "ungrounded_number", "detail": "Number '9' in the narrative not found in source data, possible hallucination."}], "summary": "Validation complete: 1 warning(s) found."}"#,
        )
        .expect("validation fixture");
        write_json_pretty(&validation, &result).expect("write validation");

        run(ReportArgs {
            merged,
            narrative,
            validation: Some(validation),
            inspection_label: "site_visit.pdf".to_string(),
            thermal_label: "flir_scan.pdf".to_string(),
            output: output.clone(),
        })
        .expect("report succeeds");

        let report = read_text(&output).expect("report text");
        assert!(report.contains("Source 1  : site_visit.pdf"));
        assert!(report.contains("Source 2  : flir_scan.pdf"));
        assert!(report.contains("Summary of findings."));
        assert!(report.contains("  - [ungrounded_number] Number '9'"));
        assert!(!report.contains("APPENDIX A"));
    }
}
