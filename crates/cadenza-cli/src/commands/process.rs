//! File-based effect processing command.

use super::common::{db, load_preset, parse_key_val};
use anyhow::Context;
use cadenza_analysis::AudioAnalysis;
use cadenza_config::EngineConfig;
use cadenza_effects::{EffectKind, EffectSpec, parse_chain, validate_chain};
use cadenza_io::{WavSpec, read_wav, write_wav};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Single effect to apply
    #[arg(short, long)]
    effect: Option<String>,

    /// Effect chain specification (e.g., "filter:cutoff=2kHz|normalize:target_level=-3dB")
    #[arg(short, long)]
    chain: Option<String>,

    /// Preset name or file (TOML)
    #[arg(short, long)]
    preset: Option<String>,

    /// Effect parameters for --effect (e.g., "drive=0.7")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

fn build_chain(args: &ProcessArgs, config: &EngineConfig) -> anyhow::Result<Vec<EffectSpec>> {
    if !args.param.is_empty() && args.effect.is_none() {
        anyhow::bail!("--param only applies to --effect");
    }

    if let Some(name) = &args.preset {
        let preset = load_preset(name)?;
        println!("Loading preset: {}", preset.name);
        Ok(preset.effects)
    } else if let Some(chain) = &args.chain {
        Ok(parse_chain(chain, &config.effects)?)
    } else if let Some(effect) = &args.effect {
        let kind: EffectKind = effect.parse()?;
        let spec = EffectSpec::from_params(kind, args.param.iter().cloned(), &config.effects)?;
        Ok(vec![spec])
    } else {
        anyhow::bail!("No effect specified. Use --effect, --chain, or --preset")
    }
}

pub fn run(args: ProcessArgs, config: &EngineConfig) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Unsupported bit depth {} (use 16, 24, or 32)", args.bit_depth);
    }

    println!("Reading {}...", args.input.display());
    let (samples, spec) =
        read_wav(&args.input).with_context(|| format!("failed to read {}", args.input.display()))?;
    let sample_rate = spec.sample_rate as f32;

    println!(
        "  {} samples, {} Hz, {:.2}s",
        samples.len(),
        spec.sample_rate,
        samples.len() as f32 / sample_rate
    );

    let chain = build_chain(&args, config)?;
    validate_chain(&chain, sample_rate, config.max_chain_len)?;

    println!("Processing with {} effect(s):", chain.len());
    for effect in &chain {
        println!("  {}", effect);
    }

    let pb = ProgressBar::new(chain.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut output = samples.clone();
    for effect in &chain {
        pb.set_message(effect.kind().to_string());
        output = effect.render(&output, sample_rate);
        pb.inc(1);
    }
    pb.finish_with_message("done");

    let before = AudioAnalysis::of(&samples, spec.sample_rate);
    let after = AudioAnalysis::of(&output, spec.sample_rate);

    println!("\nStats:");
    println!("  Input:  RMS {}, Peak {}", db(before.rms), db(before.peak));
    println!("  Output: RMS {}, Peak {}", db(after.rms), db(after.peak));

    let out_spec = WavSpec {
        channels: 1,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &output, out_spec)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Done!");

    Ok(())
}
