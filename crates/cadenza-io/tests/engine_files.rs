//! The engine wired to the filesystem collaborators.

use cadenza_config::EngineConfig;
use cadenza_effects::{EffectSpec, NormalizeParams};
use cadenza_engine::Engine;
use cadenza_index::FileId;
use cadenza_io::{
    FsBlobStore, JsonMetadataStore, WavDecoder, WavSpec, WavStore, read_wav, wav_metadata,
    write_wav,
};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn upload_process_and_persist() {
    let dir = tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    std::fs::create_dir_all(&uploads).unwrap();
    let source = uploads.join("take1.wav");
    let input: Vec<f32> = (0..4410).map(|i| 0.1 * ((i % 50) as f32 / 50.0 - 0.5)).collect();
    write_wav(&source, &input, WavSpec::mono(44100)).unwrap();

    let config = EngineConfig {
        persist_processed: true,
        ..EngineConfig::default()
    };
    let meta_path = dir.path().join("files.json");
    let engine = Engine::new(config)
        .unwrap()
        .with_decoder(Arc::new(WavDecoder))
        .with_blob_store(Arc::new(FsBlobStore::new()))
        .with_processed_store(Arc::new(WavStore::new(dir.path().join("processed"))))
        .with_metadata_store(Arc::new(JsonMetadataStore::open(&meta_path).unwrap()));

    let meta = wav_metadata("take1", &source).unwrap();
    assert_eq!(meta.channels, 1);
    engine.register_file(meta).unwrap();

    let session = engine.create_session();
    let file = FileId::from("take1");
    assert_eq!(engine.load_file_into_session(session, &file).unwrap(), 4410);
    assert!(engine.index().is_cached(&file));

    let summary = engine
        .apply_effect(session, &EffectSpec::from(NormalizeParams { target_level: -3.0 }))
        .unwrap();
    let location = summary.output.expect("output persisted");
    assert!(location.ends_with(&format!("processed_{}_normalize.wav", session)));

    let (processed, _) = read_wav(&location).unwrap();
    assert_eq!(processed.len(), 4410);
    let peak = processed.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!((peak - 0.708).abs() < 0.01, "peak {}", peak);

    // a fresh engine rebuilds its index from the same metadata file
    let restarted = Engine::new(EngineConfig::default())
        .unwrap()
        .with_metadata_store(Arc::new(JsonMetadataStore::open(&meta_path).unwrap()));
    assert_eq!(restarted.load_index().unwrap(), 1);
    assert_eq!(restarted.find_file(&file).unwrap().filename, "take1.wav");
}
