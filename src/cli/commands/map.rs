//! Map Command
//!
//! Generate a structure map for one source file.
//!
//! Usage:
//!   minimap map [FILE|-] [--mode M] [--no-redact] [--no-todo] [--copy]
//!               [--format text|json] [--name NAME] [--entry-first]

use std::path::PathBuf;

use crate::cli::clipboard::copy_text;
use crate::cli::input::read_source;
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader, OutputFormat};
use crate::types::{MapMode, MapResult, Result};
use crate::{MapOptions, generate_map_with};

/// Options for `minimap map`; unset fields come from configuration
#[derive(Debug, Clone, Default)]
pub struct MapRunOptions {
    pub path: Option<PathBuf>,
    pub mode: Option<MapMode>,
    pub no_redact: bool,
    pub no_todo: bool,
    pub copy: bool,
    pub format: Option<OutputFormat>,
    /// Overrides the file name used for sniffing and the `File:` line
    pub name: Option<String>,
    pub entry_first: bool,
}

pub fn run(options: MapRunOptions) -> Result<()> {
    let config = ConfigLoader::discover().load()?;
    let input = read_source(options.path.as_deref())?;

    let map_options = resolve_options(&config, &options, input.filename);
    let result = generate_map_with(&input.text, &map_options)?;

    let format = options.format.unwrap_or(config.output.format);
    let text = format_result(&result, format)?;
    print!("{}", text);

    if options.copy || config.output.auto_copy {
        let output = Output::new();
        match copy_text(&text) {
            Ok(()) => output.success("Copied map to clipboard"),
            Err(e) => output.warning(&e.to_string()),
        }
    }

    Ok(())
}

/// Layer CLI flags over the configured map options
fn resolve_options(
    config: &Config,
    options: &MapRunOptions,
    input_name: Option<String>,
) -> MapOptions {
    let mut map_options = config.map_options();
    if let Some(mode) = options.mode {
        map_options.mode = mode;
    }
    if options.no_redact {
        map_options.redaction_enabled = false;
    }
    if options.no_todo {
        map_options.todo_warnings_enabled = false;
    }
    if options.entry_first {
        map_options.render.entry_points_first = true;
    }
    map_options.filename = options.name.clone().or(input_name);
    map_options
}

fn format_result(result: &MapResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(result.rendered_text.clone()),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(result)?)),
    }
}
