//! Prompts command handler.

use arag_core::{config::AppConfig, AppResult};
use arag_prompt::{loader::prompts_dir, PromptSet};
use clap::Args;

/// List the active prompt templates
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Print each template's full text
    #[arg(long)]
    pub show: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        let set = PromptSet::load(&config.workspace)?;

        if self.json {
            let prompts: Vec<_> = set
                .iter()
                .map(|prompt| {
                    serde_json::json!({
                        "id": prompt.kind.id(),
                        "overridden": prompt.overridden,
                        "variables": prompt.kind.variables(),
                        "system": prompt.system,
                        "template": prompt.template,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&prompts)?);
            return Ok(());
        }

        println!("Overrides: {}", prompts_dir(&config.workspace).display());
        for prompt in set.iter() {
            let origin = if prompt.overridden { "workspace" } else { "built-in" };
            println!(
                "  {:<22} {:<10} vars: {}",
                prompt.kind.id(),
                origin,
                prompt.kind.variables().join(", ")
            );
            if self.show {
                if let Some(system) = &prompt.system {
                    println!("{}\n", system.trim());
                }
                println!("{}\n", prompt.template.trim());
            }
        }

        Ok(())
    }
}
