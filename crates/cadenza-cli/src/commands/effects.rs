//! Effect listing and information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use cadenza_config::EngineConfig;
use cadenza_effects::{EffectKind, catalog, effect_info};
use clap::Args;

#[derive(Args)]
pub struct EffectsArgs {
    /// Show details for a specific effect
    #[arg(value_name = "EFFECT")]
    effect: Option<String>,

    /// Print the catalog as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: EffectsArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let Some(name) = &args.effect else {
        let effects = catalog(&config.effects);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&effects)?);
            return Ok(());
        }

        println!("Available Effects");
        println!("=================");
        println!();
        for effect in &effects {
            println!("  {:12} - {}", effect.kind.name(), effect.description);
        }
        println!();
        println!("Use 'cadenza effects <name>' for detailed parameter info.");
        return Ok(());
    };

    let kind: EffectKind = name.parse()?;
    let effect = effect_info(kind, &config.effects);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&effect)?);
        return Ok(());
    }

    let title = kind.to_string();
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!();
    println!("{}", effect.description);
    println!();

    println!("Parameters:");
    println!();
    println!(
        "  {:14}  {:36}  {:10}  {}",
        "Name", "Description", "Default", "Range"
    );
    println!(
        "  {:14}  {:36}  {:10}  {}",
        "----", "-----------", "-------", "-----"
    );
    for param in &effect.params {
        let default = if param.unit.is_empty() {
            format!("{}", param.default)
        } else {
            format!("{} {}", param.default, param.unit)
        };
        println!(
            "  {:14}  {:36}  {:10}  {}",
            param.name, param.description, default, param.range
        );
    }
    if kind == EffectKind::Filter {
        println!(
            "  {:14}  {:36}  {:10}  {}",
            "filter_type", "Response shape", "lowpass", "lowpass|highpass|bandpass|notch"
        );
    }

    let params: Vec<String> = effect
        .params
        .iter()
        .take(2)
        .map(|p| format!("{}={}", p.name, p.default))
        .collect();
    println!();
    println!("Example usage:");
    println!();
    println!(
        "  cadenza process input.wav output.wav --effect {} --param {}",
        kind,
        params.join(" --param ")
    );
    println!(
        "  cadenza process input.wav output.wav --chain \"{}:{}\"",
        kind,
        params.join(",")
    );

    Ok(())
}
