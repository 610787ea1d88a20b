use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::MergeArgs;
use crate::config::load_config;
use crate::model::SourceTag;
use crate::reconcile::reconcile;
use crate::repair::{ParsedExtraction, parse_extraction};
use crate::util::{read_text, write_json_pretty};

pub fn run(args: MergeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let inspection = load_extraction(&args.inspection, SourceTag::InspectionReport)?;
    let thermal = load_extraction(&args.thermal, SourceTag::ThermalReport)?;

    let dataset = reconcile(&inspection.extraction, &thermal.extraction, &config.reconcile);

    write_json_pretty(&args.output, &dataset)?;
    info!(
        path = %args.output.display(),
        areas = dataset.areas.len(),
        "wrote merged data"
    );

    Ok(())
}

pub fn load_extraction(path: &Path, source: SourceTag) -> Result<ParsedExtraction> {
    let raw = read_text(path)?;
    let parsed = parse_extraction(&raw).with_context(|| {
        format!(
            "failed to parse {} extraction: {}",
            source.as_str(),
            path.display()
        )
    })?;

    if parsed.repaired {
        warn!(source = source.as_str(), path = %path.display(), "extraction payload was repaired");
    }
    if parsed.dropped_unnamed_areas > 0 {
        warn!(
            source = source.as_str(),
            dropped = parsed.dropped_unnamed_areas,
            "dropped extracted areas without a name"
        );
    }

    Ok(parsed)
}
