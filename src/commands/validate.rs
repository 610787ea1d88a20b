use anyhow::Result;
use tracing::{info, warn};

use crate::cli::ValidateArgs;
use crate::config::load_config;
use crate::grounding::validate_narrative;
use crate::model::{MergedDataset, ValidationResult};
use crate::util::{read_json, read_text, write_json_pretty};

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let dataset: MergedDataset = read_json(&args.merged)?;
    let narrative = read_text(&args.narrative)?;

    let result = validate_narrative(&narrative, &dataset, &config.grounding)?;
    log_warnings(&result);

    let output = args
        .output
        .unwrap_or_else(|| args.merged.with_file_name("validation_result.json"));
    write_json_pretty(&output, &result)?;
    info!(path = %output.display(), passed = result.passed, "wrote validation result");

    Ok(())
}

pub fn log_warnings(result: &ValidationResult) {
    for warning in &result.warnings {
        warn!(
            category = warning.category.as_str(),
            detail = %warning.detail,
            "validation warning"
        );
    }
}
