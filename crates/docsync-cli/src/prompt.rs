//! Interactive prompts on stdin

use std::io::{self, Write};

use anyhow::{bail, Result};

/// Fail unless stdin is a terminal and output is meant for a human
pub fn require_interactive(output: &crate::output::Output, hint: &str) -> Result<()> {
    if !output.should_prompt() || !atty::is(atty::Stream::Stdin) {
        bail!("This command needs an interactive terminal. {}", hint);
    }
    Ok(())
}

/// Print `label` and read one trimmed line
pub fn line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
