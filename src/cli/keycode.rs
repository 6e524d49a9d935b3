//! Keycode search command.

use crate::cli::common::{load_db, print_json, CliError, CliResult};
use crate::keycode_db::display::KeyDisplayMetadata;
use crate::keycode_db::KeycodeEntry;
use clap::Args;
use serde::Serialize;

/// Search the keycode database, or explain a keycode expression
#[derive(Debug, Clone, Args)]
pub struct KeycodeArgs {
    /// Name, alias, description text or expression (e.g. "LT(_NUM, KC_TAB)")
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Only list keycodes in this category (basic, modifier, keypad, accent, ...)
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Maximum number of matches to list
    #[arg(long, value_name = "N", default_value_t = 20)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ParsedExpression {
    expression: String,
    #[serde(flatten)]
    metadata: KeyDisplayMetadata,
}

#[derive(Debug, Serialize)]
struct SearchResult<'a> {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parsed: Option<ParsedExpression>,
    matches: Vec<&'a KeycodeEntry>,
}

impl KeycodeArgs {
    /// Execute the keycode search command
    pub fn execute(&self) -> CliResult<()> {
        let db = load_db()?;

        let parsed = db.parse(&self.query).map(|action| ParsedExpression {
            expression: action.to_string(),
            metadata: db.display_metadata(&action),
        });

        let matches: Vec<&KeycodeEntry> = db
            .search(&self.query)
            .into_iter()
            .filter(|entry| {
                self.category
                    .as_deref()
                    .map_or(true, |category| entry.category == category)
            })
            .take(self.limit)
            .collect();

        if parsed.is_none() && matches.is_empty() {
            return Err(CliError::validation(format!(
                "No keycodes match '{}'",
                self.query
            )));
        }

        let result = SearchResult {
            query: self.query.clone(),
            parsed,
            matches,
        };

        if self.json {
            return print_json(&result);
        }

        if let Some(parsed) = &result.parsed {
            println!("Expression: {}", parsed.expression);
            println!("Label:      {}", parsed.metadata.display.compact());
            for detail in &parsed.metadata.details {
                println!("  {:<10} {}", detail.code, detail.description);
            }
            println!();
        }

        if !result.matches.is_empty() {
            println!("Matches:");
            for entry in &result.matches {
                let aliases = if entry.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", entry.aliases.join(", "))
                };
                println!(
                    "  {:<12} [{}] {}{}",
                    entry.code, entry.category, entry.description, aliases
                );
            }
        }
        Ok(())
    }
}
