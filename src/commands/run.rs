use std::path::Path;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::cli::RunArgs;
use crate::commands::merge::load_extraction;
use crate::commands::validate::log_warnings;
use crate::config::load_config;
use crate::grounding::validate_narrative;
use crate::model::{InputFile, RunCounts, RunManifest, RunOutputs, SourceTag};
use crate::reconcile::reconcile;
use crate::report::{ReportMeta, render_report};
use crate::util::{
    ensure_directory, now_utc_string, read_text, sha256_file, utc_compact_string,
    write_json_pretty, write_text,
};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: RunArgs) -> Result<()> {
    let started = Utc::now();
    let run_id = format!("ddr-{}", utc_compact_string(started));
    let config = load_config(args.config.as_deref())?;

    ensure_directory(&args.out_dir)?;
    info!(run_id = %run_id, out_dir = %args.out_dir.display(), "pipeline run started");

    let inspection = load_extraction(&args.inspection, SourceTag::InspectionReport)?;
    let thermal = load_extraction(&args.thermal, SourceTag::ThermalReport)?;

    let mut warnings = Vec::<String>::new();
    for (source, parsed) in [
        (SourceTag::InspectionReport, &inspection),
        (SourceTag::ThermalReport, &thermal),
    ] {
        if parsed.repaired {
            warnings.push(format!("{} payload was truncated and repaired", source.as_str()));
        }
        if parsed.dropped_unnamed_areas > 0 {
            warnings.push(format!(
                "{} payload had {} unnamed area(s) dropped",
                source.as_str(),
                parsed.dropped_unnamed_areas
            ));
        }
    }

    let mut inputs = vec![
        input_file("inspection", &args.inspection, inspection.repaired)?,
        input_file("thermal", &args.thermal, thermal.repaired)?,
    ];

    let dataset = reconcile(&inspection.extraction, &thermal.extraction, &config.reconcile);
    let merged_path = args.out_dir.join("merged_data.json");
    write_json_pretty(&merged_path, &dataset)?;
    info!(path = %merged_path.display(), "wrote merged data");

    let mut counts = RunCounts {
        inspection_area_count: inspection.extraction.areas.len(),
        thermal_area_count: thermal.extraction.areas.len(),
        merged_area_count: dataset.areas.len(),
        matched_area_count: dataset.matched_area_count(),
        conflict_count: dataset.conflicting_areas().count(),
        duplicate_warning_count: dataset.duplicate_warnings.len(),
        validation_warning_count: 0,
    };
    let mut outputs = RunOutputs {
        merged_data_path: merged_path.display().to_string(),
        validation_result_path: None,
        report_path: None,
    };
    let mut validation_passed = None;

    match &args.narrative {
        Some(narrative_path) => {
            let narrative = read_text(narrative_path)?;
            inputs.push(input_file("narrative", narrative_path, false)?);

            let validation = validate_narrative(&narrative, &dataset, &config.grounding)?;
            log_warnings(&validation);

            let validation_path = args.out_dir.join("validation_result.json");
            write_json_pretty(&validation_path, &validation)?;

            let meta = ReportMeta {
                generated_at: now_utc_string(),
                inspection_source: args.inspection.display().to_string(),
                thermal_source: args.thermal.display().to_string(),
            };
            let report = render_report(&narrative, &dataset, Some(&validation), &meta);
            let report_path = args.out_dir.join("ddr_report.txt");
            write_text(&report_path, &report)?;
            info!(path = %report_path.display(), "wrote final report");

            counts.validation_warning_count = validation.warnings.len();
            validation_passed = Some(validation.passed);
            outputs.validation_result_path = Some(validation_path.display().to_string());
            outputs.report_path = Some(report_path.display().to_string());
        }
        None => {
            info!("no narrative supplied, skipping validation and report");
        }
    }

    let manifest = RunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        status: "completed".to_string(),
        started_at: started.to_rfc3339_opts(SecondsFormat::Secs, true),
        updated_at: now_utc_string(),
        command: std::env::args().collect::<Vec<String>>().join(" "),
        config,
        inputs,
        outputs,
        counts,
        validation_passed,
        warnings,
    };

    let manifest_path = args.out_dir.join("manifests").join("run_manifest.json");
    write_json_pretty(&manifest_path, &manifest)?;
    info!(
        path = %manifest_path.display(),
        merged_areas = manifest.counts.merged_area_count,
        conflicts = manifest.counts.conflict_count,
        validation_warnings = manifest.counts.validation_warning_count,
        "pipeline run completed"
    );

    Ok(())
}

fn input_file(role: &str, path: &Path, repaired: bool) -> Result<InputFile> {
    Ok(InputFile {
        role: role.to_string(),
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
        repaired,
    })
}
