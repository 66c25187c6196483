//! WAV decoding for the file index.

use crate::{Error, decode_wav};
use cadenza_index::{DecodeError, DecodedAudio, Decoder};

/// [`Decoder`] for WAV images, mixing multi-channel audio down to mono.
///
/// Only the `"wav"` and `"wave"` hints are accepted; an empty hint is tried
/// as WAV.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl WavDecoder {
    /// Returns `true` if `format_hint` names a container this decoder reads.
    pub fn supports(format_hint: &str) -> bool {
        matches!(
            format_hint.to_ascii_lowercase().as_str(),
            "" | "wav" | "wave"
        )
    }
}

impl Decoder for WavDecoder {
    fn decode(&self, raw: &[u8], format_hint: &str) -> Result<DecodedAudio, DecodeError> {
        if !Self::supports(format_hint) {
            return Err(DecodeError::Unsupported(format_hint.to_string()));
        }
        let (samples, spec) = decode_wav(raw).map_err(|e| match e {
            Error::Unsupported(what) => DecodeError::Unsupported(what),
            other => DecodeError::Malformed(other.to_string()),
        })?;
        tracing::debug!(
            samples = samples.len(),
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            "decoded wav"
        );
        Ok(DecodedAudio {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WavSpec, encode_wav};

    #[test]
    fn test_decodes_wav_bytes() {
        let bytes = encode_wav(&[0.25, -0.25], WavSpec::mono(22050)).unwrap();
        let audio = WavDecoder.decode(&bytes, "WAV").unwrap();
        assert_eq!(audio.samples.len(), 2);
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.channels, 1);
    }

    #[test]
    fn test_rejects_other_formats() {
        assert!(matches!(
            WavDecoder.decode(&[], "mp3"),
            Err(DecodeError::Unsupported(hint)) if hint == "mp3"
        ));
        assert!(matches!(
            WavDecoder.decode(b"junk", "wav"),
            Err(DecodeError::Malformed(_))
        ));
    }
}
