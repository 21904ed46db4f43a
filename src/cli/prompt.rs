//! Interactive confirmation

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Asks a yes/no question on stderr and blocks for an answer on stdin
///
/// Stdout stays reserved for command output, so `--format json` output is
/// never interleaved with prompts.
///
/// Only `y` and `yes` confirm. End of input counts as "no".
pub fn confirm(question: &str) -> Result<bool> {
    let stdin = io::stdin();
    confirm_with(question, &mut stdin.lock(), &mut io::stderr())
}

/// Same as [`confirm`], with explicit input and output
pub fn confirm_with(question: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "{} (y/N): ", question).context("Failed to write prompt")?;
    out.flush().context("Failed to flush prompt")?;

    let mut answer = String::new();
    let read = input
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    if read == 0 {
        writeln!(out).context("Failed to write prompt")?;
        return Ok(false);
    }

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
