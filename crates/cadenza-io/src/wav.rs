//! WAV decoding and encoding on top of `hound`.
//!
//! The engine is mono throughout, so everything read here is mixed down to
//! one channel and everything written is a single channel.

use crate::{Error, Result};
use cadenza_index::{FileId, FileMetadata};
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::{Cursor, Read};
use std::path::Path;

/// Sample encoding stored in the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Integer PCM.
    Pcm,
    /// 32-bit float.
    IeeeFloat,
}

/// Header fields of a WAV file.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Channel count as stored.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Stored bit depth.
    pub bits_per_sample: u16,
    /// Frames in the data chunk.
    pub num_frames: u64,
    /// `num_frames / sample_rate`.
    pub duration_secs: f64,
    /// PCM or float.
    pub format: WavFormat,
}

/// Reads only the header, leaving the sample data untouched.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate.max(1));

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// Builds an index record for a WAV file from its header and size on disk.
pub fn wav_metadata<P: AsRef<Path>>(id: impl Into<FileId>, path: P) -> Result<FileMetadata> {
    let path = path.as_ref();
    let info = read_wav_info(path)?;
    let size_bytes = std::fs::metadata(path)
        .map_err(|source| Error::io(path, source))?
        .len();

    let mut meta = FileMetadata::new(id, path.to_string_lossy());
    meta.size_bytes = size_bytes;
    meta.duration_seconds = info.duration_secs;
    meta.sample_rate = info.sample_rate;
    meta.channels = info.channels;
    meta.bit_depth = info.bits_per_sample;
    Ok(meta)
}

/// Format used when reading or writing sample data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Channel count (source count on read, always 1 on write).
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32; 32 is written as float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
        }
    }
}

impl WavSpec {
    /// Mono spec at `sample_rate` with the default bit depth.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Loads a WAV file as mono `f32` samples in [-1, 1].
///
/// Multi-channel files are mixed down to mono by averaging channels; the
/// returned spec still reports the source channel count.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    decode_reader(WavReader::open(path)?)
}

/// Like [`read_wav`], but parses an in-memory WAV image.
pub fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, WavSpec)> {
    decode_reader(WavReader::new(Cursor::new(bytes))?)
}

fn decode_reader<R: Read>(reader: WavReader<R>) -> Result<(Vec<f32>, WavSpec)> {
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            if !(1..=32).contains(&bits) {
                return Err(Error::Unsupported(format!("{}-bit integer wav", bits)));
            }
            let max_val = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    // Mix down to mono if multi-channel
    let mono_samples = if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono_samples, spec))
}

/// Write mono samples to a WAV file.
///
/// `spec.channels` is ignored; the file is always mono.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let hound_spec = hound::WavSpec::from(WavSpec { channels: 1, ..spec });
    let mut writer = WavWriter::create(path, hound_spec)?;
    write_samples(&mut writer, samples, spec.bits_per_sample)?;
    writer.finalize()?;
    Ok(())
}

/// Like [`write_wav`], but returns the WAV image as bytes.
pub fn encode_wav(samples: &[f32], spec: WavSpec) -> Result<Vec<u8>> {
    let hound_spec = hound::WavSpec::from(WavSpec { channels: 1, ..spec });
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, hound_spec)?;
        write_samples(&mut writer, samples, spec.bits_per_sample)?;
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

fn write_samples<W>(writer: &mut WavWriter<W>, samples: &[f32], bits_per_sample: u16) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    if bits_per_sample == 32 {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (bits_per_sample - 1)) as f32;
        for &sample in samples {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_float_file_is_lossless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let samples = vec![0.0, 0.5, -0.25, 0.125];
        let spec = WavSpec {
            bits_per_sample: 32,
            ..WavSpec::mono(48000)
        };

        write_wav(&path, &samples, spec).unwrap();
        let (loaded, loaded_spec) = read_wav(&path).unwrap();
        assert_eq!(loaded, samples);
        assert_eq!(loaded_spec, spec);
    }

    #[test]
    fn test_pcm16_in_memory() {
        let samples = vec![0.0, 0.5, -0.5, 0.999];
        let bytes = encode_wav(&samples, WavSpec::default()).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");

        let (decoded, spec) = decode_wav(&bytes).unwrap();
        assert_eq!(spec.bits_per_sample, 16);
        for (a, b) in decoded.iter().zip(&samples) {
            assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_stereo_mixdown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(1.0f32, 0.0f32), (0.5, 0.5), (-1.0, 0.0)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let (mono, spec) = read_wav(&path).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(mono, vec![0.5, 0.5, -0.5]);
    }

    #[test]
    fn test_info_and_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, &vec![0.1; 22050], WavSpec::default()).unwrap();

        let info = read_wav_info(&path).unwrap();
        assert_eq!(info.num_frames, 22050);
        assert_eq!(info.format, WavFormat::Pcm);
        assert!((info.duration_secs - 0.5).abs() < 1e-9);

        let meta = wav_metadata("tone", &path).unwrap();
        assert_eq!(meta.filename, "tone.wav");
        assert_eq!(meta.format, "wav");
        assert_eq!(meta.bit_depth, 16);
        assert!(meta.size_bytes > 44_100);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(decode_wav(b"not a wav file"), Err(Error::Wav(_))));
    }
}
