pub mod completions;
pub mod generate;
pub mod inspect;
pub mod man_pages;
pub mod merge_store;
pub mod trim;

use depsgen_schema::LibraryType;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INPUT_ERROR: u8 = 2;
pub const EXIT_OUTPUT_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn finish(pb: &ProgressBar, msg: String) {
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        pb.set_style(style);
    }
    pb.finish_with_message(msg);
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    finish(pb, format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    finish(pb, format!("✗ {msg}"));
}

pub fn colorize_type(library_type: LibraryType) -> String {
    use console::Style;
    let label = library_type.to_string();
    match library_type {
        LibraryType::Package => Style::new().green().apply_to(label).to_string(),
        LibraryType::Project => Style::new().cyan().bold().apply_to(label).to_string(),
        LibraryType::Reference => Style::new().yellow().apply_to(label).to_string(),
        LibraryType::ReferenceAssembly => Style::new().dim().apply_to(label).to_string(),
    }
}

/// Exit code for an error message produced by one of the commands.
pub fn exit_code_for(msg: &str) -> u8 {
    const INPUT_PREFIXES: &[&str] = &[
        "closure error:",
        "store descriptor error:",
        "failed to read request file",
        "failed to parse request file",
        "input error:",
    ];
    if INPUT_PREFIXES.iter().any(|p| msg.starts_with(p)) {
        EXIT_INPUT_ERROR
    } else if msg.starts_with("output error:") {
        EXIT_OUTPUT_ERROR
    } else {
        EXIT_FAILURE
    }
}
