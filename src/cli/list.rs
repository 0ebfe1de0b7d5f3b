use std::path::PathBuf;

use serde::Serialize;

use super::Format;

/// One row of `tokencast list --format json`.
#[derive(Serialize)]
struct Entry<'a> {
    id: &'a str,
    #[serde(rename = "$type")]
    kind: &'static str,
    modes: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

pub(crate) fn run(tokens_path: PathBuf, format: Format) {
    let tokens = super::load_tokens("list", &tokens_path);
    let entries: Vec<Entry<'_>> = tokens
        .iter()
        .map(|t| Entry {
            id: &t.id,
            kind: t.kind().as_str(),
            modes: t.modes.keys().filter(|m| t.has_mode(m)).map(String::as_str).collect(),
            description: t.description.as_deref(),
        })
        .collect();

    match format {
        Format::Text => {
            let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
            for e in &entries {
                let mut line = format!("{:<width$}  {}", e.id, e.kind);
                if !e.modes.is_empty() {
                    line.push_str(&format!("  [{}]", e.modes.join(", ")));
                }
                println!("{}", line.trim_end());
            }
            eprintln!("{} tokens", entries.len());
        }
        Format::Json => match serde_json::to_string_pretty(&entries) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("tokencast list: {e}");
                std::process::exit(1);
            }
        },
    }
}
