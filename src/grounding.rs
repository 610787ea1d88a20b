use std::collections::{BTreeSet, HashSet};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::config::GroundingConfig;
use crate::model::{
    MergedDataset, Severity, ValidationResult, ValidationWarning, WarningCategory,
};
use crate::similarity::similarity;

const NUMBER_PATTERN: &str = r"\d+\.?\d*";
const WORD_PATTERN: &str = r"[a-zA-Z]{4,}";
const AREA_LABEL_PATTERN: &str = r"(?i)area(?:\s+name)?\s*:\s*(.+)";
const SENTENCE_BREAK_PATTERN: &str = r"[.!?\n]";
const DIGIT_PATTERN: &str = r"\d";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSets {
    pub area_names: BTreeSet<String>,
    pub numbers: HashSet<String>,
    pub tokens: HashSet<String>,
}

#[derive(Debug)]
pub struct GroundingValidator {
    config: GroundingConfig,
    stopwords: HashSet<String>,
    exempt_numbers: HashSet<String>,
    number: Regex,
    word: Regex,
    area_label: Regex,
    sentence_break: Regex,
    digit: Regex,
}

impl GroundingValidator {
    pub fn new(config: GroundingConfig) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).with_context(|| format!("failed to compile regex: {pattern}"))
        };

        Ok(Self {
            stopwords: config.stopwords.iter().map(|word| word.to_lowercase()).collect(),
            exempt_numbers: config.exempt_numbers.iter().cloned().collect(),
            number: compile(NUMBER_PATTERN)?,
            word: compile(WORD_PATTERN)?,
            area_label: compile(AREA_LABEL_PATTERN)?,
            sentence_break: compile(SENTENCE_BREAK_PATTERN)?,
            digit: compile(DIGIT_PATTERN)?,
            config,
        })
    }

    pub fn collect_references(&self, dataset: &MergedDataset) -> ReferenceSets {
        let mut references = ReferenceSets::default();

        for area in &dataset.areas {
            references
                .area_names
                .insert(area.area_name.trim().to_lowercase());
            self.collect_words(&area.area_name, &mut references.tokens);

            for text in area.text_fields() {
                self.collect_numbers(text, &mut references.numbers);
                self.collect_words(text, &mut references.tokens);
            }
        }

        for note in &dataset.global_notes {
            self.collect_numbers(note, &mut references.numbers);
            self.collect_words(note, &mut references.tokens);
        }

        references
    }

    pub fn validate(&self, narrative: &str, dataset: &MergedDataset) -> ValidationResult {
        let references = self.collect_references(dataset);
        info!(
            areas = references.area_names.len(),
            numbers = references.numbers.len(),
            tokens = references.tokens.len(),
            "built grounding reference"
        );

        let mut warnings = Vec::<ValidationWarning>::new();

        for name in self.extract_area_labels(narrative) {
            if !self.is_grounded_area(&name, &references.area_names) {
                warnings.push(ValidationWarning {
                    category: WarningCategory::UnknownArea,
                    detail: format!(
                        "Area name '{name}' appears in the narrative but was not found in merged data."
                    ),
                    severity: Severity::Warning,
                });
            }
        }

        for number in self.extract_numbers(narrative) {
            if !references.numbers.contains(&number) && !self.exempt_numbers.contains(&number) {
                warnings.push(ValidationWarning {
                    category: WarningCategory::UngroundedNumber,
                    detail: format!(
                        "Number '{number}' in the narrative not found in source data, possible hallucination."
                    ),
                    severity: Severity::Warning,
                });
            }
        }

        for snippet in self.spot_check_sentences(narrative, &references.tokens) {
            warnings.push(ValidationWarning {
                category: WarningCategory::Hallucination,
                detail: format!("Phrase may not be grounded in source data: '{snippet}'"),
                severity: Severity::Warning,
            });
        }

        let passed = !warnings
            .iter()
            .any(|warning| warning.severity == Severity::Error);
        let summary = if warnings.is_empty() {
            "Validation complete: no issues detected.".to_string()
        } else {
            format!("Validation complete: {} warning(s) found.", warnings.len())
        };

        info!(passed, warnings = warnings.len(), "{summary}");

        ValidationResult {
            passed,
            warnings,
            summary,
        }
    }

    pub fn extract_area_labels(&self, narrative: &str) -> Vec<String> {
        let mut seen = HashSet::<String>::new();
        let mut names = Vec::<String>::new();

        for captures in self.area_label.captures_iter(narrative) {
            let Some(value) = captures.get(1) else {
                continue;
            };
            let name = value
                .as_str()
                .trim()
                .trim_end_matches('.')
                .trim()
                .to_lowercase();
            if !name.is_empty() && seen.insert(name.clone()) {
                names.push(name);
            }
        }

        names
    }

    pub fn extract_numbers(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::<&str>::new();
        self.number
            .find_iter(text)
            .map(|found| trim_trailing_point(found.as_str()))
            .filter(|number| seen.insert(*number))
            .map(ToOwned::to_owned)
            .collect()
    }

    fn is_grounded_area(&self, name: &str, area_names: &BTreeSet<String>) -> bool {
        let name = name.trim().to_lowercase();
        area_names.iter().any(|known| {
            name.contains(known.as_str())
                || known.contains(name.as_str())
                || similarity(&name, known) >= self.config.area_match_threshold
        })
    }

    fn spot_check_sentences(&self, narrative: &str, tokens: &HashSet<String>) -> Vec<String> {
        let mut suspicious = Vec::<String>::new();

        for raw_sentence in self.sentence_break.split(narrative) {
            if suspicious.len() >= self.config.max_hallucination_findings {
                break;
            }

            let sentence = raw_sentence.trim();
            if sentence.chars().count() < self.config.min_sentence_chars {
                continue;
            }
            if !self.digit.is_match(sentence) {
                continue;
            }

            let lowered = sentence.to_lowercase();
            let key_words = self
                .word
                .find_iter(&lowered)
                .map(|found| found.as_str())
                .filter(|word| !self.stopwords.contains(*word))
                .collect::<BTreeSet<&str>>();
            if key_words.is_empty() {
                continue;
            }

            let ungrounded = key_words
                .iter()
                .filter(|word| !tokens.contains(**word))
                .count();
            let grounded_ratio = 1.0 - ungrounded as f64 / key_words.len() as f64;

            if grounded_ratio < self.config.min_grounded_ratio
                && ungrounded >= self.config.min_ungrounded_words
            {
                suspicious.push(sentence.chars().take(self.config.snippet_chars).collect());
            }
        }

        suspicious
    }

    fn collect_numbers(&self, text: &str, numbers: &mut HashSet<String>) {
        numbers.extend(
            self.number
                .find_iter(text)
                .map(|found| trim_trailing_point(found.as_str()).to_string()),
        );
    }

    fn collect_words(&self, text: &str, tokens: &mut HashSet<String>) {
        let lowered = text.to_lowercase();
        tokens.extend(
            self.word
                .find_iter(&lowered)
                .map(|found| found.as_str().to_string()),
        );
    }
}

pub fn validate_narrative(
    narrative: &str,
    dataset: &MergedDataset,
    config: &GroundingConfig,
) -> Result<ValidationResult> {
    let validator = GroundingValidator::new(config.clone())?;
    Ok(validator.validate(narrative, dataset))
}

fn trim_trailing_point(number: &str) -> &str {
    number.strip_suffix('.').unwrap_or(number)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{GroundingValidator, validate_narrative};
    use crate::config::GroundingConfig;
    use crate::model::{MergedDataset, MergedRecord, SourceTag, WarningCategory};

    fn record(name: &str) -> MergedRecord {
        MergedRecord {
            area_name: name.to_string(),
            inspection_observations: Vec::new(),
            thermal_findings: Vec::new(),
            temperature_readings: Vec::new(),
            visible_damage: Vec::new(),
            moisture_presence: "Not Available".to_string(),
            other_notes: "Not Available".to_string(),
            conflict_detected: false,
            conflict_description: None,
            sources: BTreeSet::from([SourceTag::InspectionReport]),
        }
    }

    fn kitchen_dataset() -> MergedDataset {
        let mut kitchen = record("Kitchen");
        kitchen.temperature_readings = vec!["Ceiling surface 72.5 F".to_string()];
        kitchen.inspection_observations = vec!["Water stain on ceiling near light fitting".to_string()];
        MergedDataset {
            areas: vec![kitchen],
            global_notes: vec!["Inspection carried out on 12 March".to_string()],
            duplicate_warnings: Vec::new(),
        }
    }

    fn validator() -> GroundingValidator {
        GroundingValidator::new(GroundingConfig::default()).expect("patterns compile")
    }

    #[test]
    fn sentence_final_numbers_drop_the_full_stop() {
        let validator = validator();
        assert_eq!(validator.extract_numbers("Counted 7. Then 7.5 and 85."), vec!["7", "7.5", "85"]);

        let result = validator.validate("The inspector counted 7.", &MergedDataset::default());
        assert_eq!(result.count_category(WarningCategory::UngroundedNumber), 0);

        let mut roof = record("Roof");
        roof.thermal_findings = vec!["hot spot 85F".to_string()];
        let dataset = MergedDataset {
            areas: vec![roof],
            global_notes: Vec::new(),
            duplicate_warnings: Vec::new(),
        };
        let result = validator.validate("Roof surface peaked at 85.", &dataset);
        assert_eq!(result.count_category(WarningCategory::UngroundedNumber), 0);

        let references = validator.collect_references(&MergedDataset {
            areas: Vec::new(),
            global_notes: vec!["Reading was 64.".to_string()],
            duplicate_warnings: Vec::new(),
        });
        assert!(references.numbers.contains("64"));
        assert!(!references.numbers.contains("64."));
    }

    #[test]
    fn known_area_label_is_grounded() {
        let result = validator().validate("Area: Kitchen shows no issues.", &kitchen_dataset());
        assert_eq!(result.count_category(WarningCategory::UnknownArea), 0);
    }

    #[test]
    fn unknown_area_label_is_flagged_once() {
        let result = validator().validate("Area: Attic\nArea: attic.", &kitchen_dataset());
        assert_eq!(result.count_category(WarningCategory::UnknownArea), 1);
        assert!(result.warnings[0].detail.contains("'attic'"));
        assert!(result.passed);
    }

    #[test]
    fn area_name_label_variant_and_fuzzy_match_are_grounded() {
        let result = validator().validate("AREA NAME: Kitchn", &kitchen_dataset());
        assert_eq!(result.count_category(WarningCategory::UnknownArea), 0);
    }

    #[test]
    fn number_present_in_readings_is_grounded() {
        let result = validator().validate("Peak reading 72.5 recorded.", &kitchen_dataset());
        assert_eq!(result.count_category(WarningCategory::UngroundedNumber), 0);
    }

    #[test]
    fn exempt_numbers_are_never_flagged() {
        let empty = MergedDataset::default();
        let result = validator().validate("Found 7 cracks and 100 tiles.", &empty);
        assert_eq!(result.count_category(WarningCategory::UngroundedNumber), 0);
    }

    #[test]
    fn invented_number_is_flagged_once() {
        let result = validator().validate(
            "Surface hit 91 degrees. It stayed at 91 for an hour.",
            &kitchen_dataset(),
        );
        assert_eq!(result.count_category(WarningCategory::UngroundedNumber), 1);
        assert!(result.warnings.iter().any(|warning| warning.detail.contains("'91'")));
    }

    #[test]
    fn detail_heavy_sentence_without_support_is_flagged() {
        let narrative = "Structural engineer recommended replacing joists urgently within 14 days";
        let result = validator().validate(narrative, &kitchen_dataset());
        assert_eq!(result.count_category(WarningCategory::Hallucination), 1);
        let finding = result
            .warnings
            .iter()
            .find(|warning| warning.category == WarningCategory::Hallucination)
            .expect("hallucination finding");
        assert!(finding.detail.contains("Structural engineer recommended"));
        assert!(result.passed);
    }

    #[test]
    fn grounded_sentence_is_not_flagged() {
        let narrative = "Water stain on the kitchen ceiling near light fitting measured 72.5";
        let result = validator().validate(narrative, &kitchen_dataset());
        assert_eq!(result.count_category(WarningCategory::Hallucination), 0);
    }

    #[test]
    fn hallucination_findings_are_capped() {
        let narrative = (0..8)
            .map(|index| format!("Contractor replaced gutters twice during winter {index}1 times."))
            .collect::<Vec<String>>()
            .join("\n");
        let result = validator().validate(&narrative, &MergedDataset::default());
        assert_eq!(result.count_category(WarningCategory::Hallucination), 5);
    }

    #[test]
    fn snippet_is_truncated_to_configured_length() {
        let config = GroundingConfig {
            snippet_chars: 12,
            ..GroundingConfig::default()
        };
        let result = validate_narrative(
            "Contractor replaced gutters twice during winter 2021",
            &MergedDataset::default(),
            &config,
        )
        .expect("validation runs");
        let finding = result
            .warnings
            .iter()
            .find(|warning| warning.category == WarningCategory::Hallucination)
            .expect("hallucination finding");
        assert_eq!(
            finding.detail,
            "Phrase may not be grounded in source data: 'Contractor r'"
        );
    }

    #[test]
    fn clean_narrative_reports_no_issues() {
        let result = validator().validate("Area: Kitchen", &kitchen_dataset());
        assert!(result.passed);
        assert!(result.warnings.is_empty());
        assert_eq!(result.summary, "Validation complete: no issues detected.");
    }

    #[test]
    fn summary_counts_warnings() {
        let result = validator().validate("Area: Garage", &kitchen_dataset());
        assert_eq!(result.summary, "Validation complete: 1 warning(s) found.");
    }

    #[test]
    fn references_cover_notes_and_scalar_fields() {
        let mut dataset = kitchen_dataset();
        dataset.areas[0].moisture_presence = "Reading of 18% on meter".to_string();
        let references = validator().collect_references(&dataset);
        assert!(references.numbers.contains("18"));
        assert!(references.numbers.contains("12"));
        assert!(references.tokens.contains("meter"));
        assert!(references.tokens.contains("kitchen"));
        assert!(references.area_names.contains("kitchen"));
    }
}
