use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RepairArgs;
use crate::repair::{is_valid_json, repair, strip_code_fences};
use crate::util::{read_text, write_text};

pub fn run(args: RepairArgs) -> Result<()> {
    let raw = read_text(&args.input)?;
    let body = strip_code_fences(&raw);
    let repaired = repair(body);

    if is_valid_json(&repaired) {
        info!(
            path = %args.input.display(),
            changed = repaired != body,
            "payload is valid JSON"
        );
    } else {
        warn!(
            path = %args.input.display(),
            "payload is still not valid JSON after repair"
        );
    }

    match args.output {
        Some(path) => {
            write_text(&path, &repaired)?;
            info!(path = %path.display(), "wrote repaired payload");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{repaired}").context("failed to write repaired payload")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::cli::RepairArgs;
    use crate::util::{read_text, write_text};

    #[test]
    fn repair_command_writes_closed_payload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("raw.txt");
        let output = dir.path().join("repaired.json");
        write_text(&input, "```json\n{\"areas\": [{\"area_name\": \"Loft\"").expect("write input");

        run(RepairArgs {
            input,
            output: Some(output.clone()),
        })
        .expect("repair command succeeds");

        assert_eq!(
            read_text(&output).expect("read output"),
            "{\"areas\": [{\"area_name\": \"Loft\"}]}"
        );
    }
}
