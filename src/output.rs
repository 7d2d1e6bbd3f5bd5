//! Output formatting utilities
//!
//! Handles JSON, YAML, and table output formats.

use std::io::IsTerminal;

use anyhow::Result;
use serde::Serialize;
use tabled::settings::object::Rows;
use tabled::settings::{Remove, Style};
use tabled::{Table, Tabled};

use crate::cli::OutputFormat;
use crate::config::RuntimeContext;

/// Format and print data according to the configured output format
pub fn print_output<T: Serialize>(ctx: &RuntimeContext, data: &T) -> Result<()> {
    let output = format_output(ctx, data)?;
    println!("{output}");
    Ok(())
}

/// Format data according to the configured output format
pub fn format_output<T: Serialize>(ctx: &RuntimeContext, data: &T) -> Result<String> {
    render(ctx.output_format(), std::io::stdout().is_terminal(), data)
}

fn render<T: Serialize>(format: OutputFormat, is_tty: bool, data: &T) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        // Compact JSON when piped
        _ if !is_tty => Ok(serde_json::to_string(data)?),
        _ => Ok(serde_json::to_string_pretty(data)?),
    }
}

/// Whether human-readable output is wanted
pub fn is_human(ctx: &RuntimeContext) -> bool {
    match ctx.output_format() {
        OutputFormat::Table => true,
        OutputFormat::Auto => std::io::stdout().is_terminal(),
        _ => false,
    }
}

/// Print `data` in the structured format, or run `human` for terminals
pub fn output_for_format<T: Serialize>(
    ctx: &RuntimeContext,
    data: &T,
    human: impl FnOnce() -> Result<()>,
) -> Result<()> {
    if is_human(ctx) {
        human()
    } else {
        print_output(ctx, data)
    }
}

/// Print a table from items that implement Tabled
pub fn print_table<T: Tabled>(ctx: &RuntimeContext, items: &[T]) -> Result<()> {
    println!("{}", build_table(ctx, items));
    Ok(())
}

fn build_table<T: Tabled>(ctx: &RuntimeContext, items: &[T]) -> Table {
    let mut table = Table::new(items);
    table.with(Style::sharp());

    if ctx.global.no_headers || ctx.config.output.no_headers {
        table.with(Remove::row(Rows::first()));
    }

    table
}

/// Shorten text to `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json() {
        let data = json!({"name": "Hotel Mar", "stars": 4});

        let piped = render(OutputFormat::Json, false, &data).unwrap();
        assert_eq!(piped, r#"{"name":"Hotel Mar","stars":4}"#);

        let pretty = render(OutputFormat::Json, true, &data).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_render_yaml() {
        let data = json!({"name": "Casa Luna"});
        let yaml = render(OutputFormat::Yaml, true, &data).unwrap();
        assert_eq!(yaml.trim(), "name: Casa Luna");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("piscina", 10), "piscina");
        assert_eq!(truncate("piscina, wifi, spa", 8), "piscina…");
        assert_eq!(truncate("  económico  ", 9), "económico");
    }
}
