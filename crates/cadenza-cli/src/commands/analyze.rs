//! Level, spectral and frame-feature analysis of a WAV file.

use super::common::db;
use anyhow::Context;
use cadenza_analysis::chroma::PITCH_NAMES;
use cadenza_analysis::{AudioAnalysis, FeatureKind, FeatureSet, extract_features};
use cadenza_io::{read_wav, read_wav_info};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Print the measurements as JSON
    #[arg(long)]
    json: bool,

    /// Extract frame features instead: all, mfcc, spectral, rhythm or chroma
    #[arg(long, value_name = "KIND")]
    features: Option<FeatureKind>,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let (samples, spec) = read_wav(&args.input)?;

    if let Some(kind) = args.features {
        if samples.is_empty() {
            anyhow::bail!("{} has no samples", args.input.display());
        }
        let features = extract_features(&samples, spec.sample_rate, kind);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&features)?);
        } else {
            print_features(&args, &features);
        }
        return Ok(());
    }

    let analysis = AudioAnalysis::of(&samples, spec.sample_rate);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("{}", args.input.display());
    println!(
        "  Format:             {} Hz, {} ch, {}-bit {:?}",
        info.sample_rate, info.channels, info.bits_per_sample, info.format
    );
    println!("  Duration:           {:.3} s", analysis.duration_seconds);
    println!("  RMS:                {}", db(analysis.rms));
    println!("  Peak:               {}", db(analysis.peak));
    println!("  Crest factor:       {:.2}", analysis.crest_factor);
    println!("  Zero crossing rate: {:.4}", analysis.zero_crossing_rate);
    println!("  Spectral centroid:  {:.1} Hz", analysis.spectral_centroid);
    println!("  Spectral rolloff:   {:.1} Hz", analysis.spectral_rolloff);

    Ok(())
}

fn print_features(args: &AnalyzeArgs, features: &FeatureSet) {
    println!("{}", args.input.display());
    println!(
        "  Features:           {} ({} frames, {:.3} s)",
        features.kind, features.frames, features.duration_seconds
    );

    if let Some(mfcc) = &features.mfcc {
        let means: Vec<String> = mfcc.mean.iter().map(|c| format!("{:.2}", c)).collect();
        println!("  MFCC mean:          [{}]", means.join(", "));
    }
    if let Some(spectral) = &features.spectral {
        println!(
            "  Spectral centroid:  {:.1} Hz (std {:.1})",
            spectral.centroid.mean, spectral.centroid.std
        );
        println!("  Spectral rolloff:   {:.1} Hz", spectral.rolloff.mean);
        println!("  Spectral bandwidth: {:.1} Hz", spectral.bandwidth.mean);
    }
    if let Some(rhythm) = &features.rhythm {
        println!("  Tempo:              {:.1} BPM ({} beats)", rhythm.bpm, rhythm.beat_times.len());
    }
    if let Some(chroma) = &features.chroma {
        let profile: Vec<String> = PITCH_NAMES
            .iter()
            .zip(chroma.mean.iter())
            .map(|(name, v)| format!("{}={:.2}", name, v))
            .collect();
        println!("  Chroma:             {}", profile.join(" "));
    }
}
