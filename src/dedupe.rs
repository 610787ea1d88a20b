use crate::similarity::similarity;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deduplicated {
    pub unique: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn dedupe<S: AsRef<str>>(items: &[S], threshold: f64) -> Deduplicated {
    let mut unique = Vec::<String>::new();
    let mut warnings = Vec::<String>::new();

    for raw_item in items {
        let item = raw_item.as_ref().trim();
        if item.is_empty() {
            continue;
        }

        let duplicate_of = unique.iter().find_map(|existing| {
            let score = similarity(item, existing);
            (score >= threshold).then_some((existing, score))
        });

        match duplicate_of {
            Some((existing, score)) => {
                warnings.push(format!(
                    "Duplicate removed (sim={score:.2}): '{item}' \u{2248} '{existing}'"
                ));
            }
            None => unique.push(item.to_string()),
        }
    }

    Deduplicated { unique, warnings }
}
