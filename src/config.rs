use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_STOPWORDS: &str = include_str!("../config/stopwords.txt");
const DEFAULT_EXEMPT_NUMBERS: &str = include_str!("../config/exempt_numbers.txt");

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.65;
pub const DEFAULT_DEDUP_THRESHOLD: f64 = 0.85;
pub const DEFAULT_SCALAR_AGREEMENT_THRESHOLD: f64 = 0.75;
pub const DEFAULT_AREA_MATCH_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MIN_GROUNDED_RATIO: f64 = 0.4;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub reconcile: ReconcileConfig,
    pub grounding: GroundingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub match_threshold: f64,
    pub dedup_threshold: f64,
    pub scalar_agreement_threshold: f64,
    pub left_label: String,
    pub right_label: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            dedup_threshold: DEFAULT_DEDUP_THRESHOLD,
            scalar_agreement_threshold: DEFAULT_SCALAR_AGREEMENT_THRESHOLD,
            left_label: "Inspection".to_string(),
            right_label: "Thermal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    pub area_match_threshold: f64,
    pub min_grounded_ratio: f64,
    pub min_ungrounded_words: usize,
    pub max_hallucination_findings: usize,
    pub min_sentence_chars: usize,
    pub snippet_chars: usize,
    pub stopwords: Vec<String>,
    pub exempt_numbers: Vec<String>,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            area_match_threshold: DEFAULT_AREA_MATCH_THRESHOLD,
            min_grounded_ratio: DEFAULT_MIN_GROUNDED_RATIO,
            min_ungrounded_words: 3,
            max_hallucination_findings: 5,
            min_sentence_chars: 20,
            snippet_chars: 120,
            stopwords: parse_word_list(DEFAULT_STOPWORDS),
            exempt_numbers: parse_word_list(DEFAULT_EXEMPT_NUMBERS),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("reconcile.match_threshold", self.reconcile.match_threshold),
            ("reconcile.dedup_threshold", self.reconcile.dedup_threshold),
            (
                "reconcile.scalar_agreement_threshold",
                self.reconcile.scalar_agreement_threshold,
            ),
            (
                "grounding.area_match_threshold",
                self.grounding.area_match_threshold,
            ),
            ("grounding.min_grounded_ratio", self.grounding.min_grounded_ratio),
        ];

        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1], got {value}");
            }
        }

        if self.reconcile.left_label.trim().is_empty() || self.reconcile.right_label.trim().is_empty()
        {
            bail!("source labels must not be empty");
        }

        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };

    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config: PipelineConfig = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;

    info!(
        path = %path.display(),
        match_threshold = config.reconcile.match_threshold,
        dedup_threshold = config.reconcile.dedup_threshold,
        stopwords = config.grounding.stopwords.len(),
        "loaded pipeline config"
    );

    Ok(config)
}

pub fn parse_word_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_lowercase())
        .collect()
}
