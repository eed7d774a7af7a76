use super::EXIT_SUCCESS;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

/// Completion script for `shell`, registered under the command's own name.
fn script(shell: Shell, mut cmd: clap::Command) -> Vec<u8> {
    let bin = cmd.get_name().to_owned();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, bin, &mut buf);
    buf
}

pub fn run<C: CommandFactory>(shell: Shell) -> Result<u8, String> {
    std::io::stdout()
        .write_all(&script(shell, C::command()))
        .map_err(|e| format!("failed to write completions: {e}"))?;
    Ok(EXIT_SUCCESS)
}
