use console::style;
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Output format mode
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json { OutputFormat::Json } else { OutputFormat::Human },
        }
    }

    pub fn success(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                println!("{} {}", style("✓").green().bold(), message);
            }
            OutputFormat::Json => print_json(&status_message("success", message)),
        }
    }

    pub fn info(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                println!("{} {}", style("ℹ").blue().bold(), message);
            }
            OutputFormat::Json => print_json(&status_message("info", message)),
        }
    }

    pub fn warning(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", style("⚠").yellow().bold(), message);
            }
            OutputFormat::Json => eprint_json(&status_message("warning", message)),
        }
    }

    /// Rounded table for humans; JSON output goes through [`OutputWriter::result`] instead
    pub fn table<T: Tabled>(&self, data: Vec<T>) {
        if let OutputFormat::Human = self.format {
            if data.is_empty() {
                println!("{}", style("(no data)").dim());
            } else {
                let mut table = Table::new(data);
                table.with(Style::rounded());
                println!("{}", table);
            }
        }
    }

    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let output = serde_json::json!({
            "status": "success",
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        match self.format {
            OutputFormat::Human => {
                println!("{}: {}", style(key).bold(), value);
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                key.to_string(): value.to_string(),
            })),
        }
    }

    pub fn section(&self, title: impl Display) {
        match self.format {
            OutputFormat::Human => {
                println!("\n{}", style(title).bold().underlined());
            }
            OutputFormat::Json => {}
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

fn status_message(status: &str, message: impl Display) -> serde_json::Value {
    serde_json::json!({
        "status": status,
        "message": message.to_string(),
    })
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!("Failed to render JSON output: {}", e),
    }
}

fn eprint_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => eprintln!("{}", text),
        Err(e) => tracing::error!("Failed to render JSON output: {}", e),
    }
}
