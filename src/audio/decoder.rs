use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::error::DecodeError;
use super::model::DecodedAudio;

/// Sample width assumed when the codec does not report one (lossy formats).
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Decode the whole file into memory.
///
/// The extension is only used as a probe hint; the container is detected
/// from the content. Individual corrupt packets are skipped, but a stream
/// where no packet decodes at all is a [`DecodeError`]. A stream with no
/// packets yields zero frames.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, DecodeError> {
    let mut format = open_format(path)?;
    let track = format.default_track().ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;

    let sample_rate = track.codec_params.sample_rate;
    let channel_count = track.codec_params.channels.map(|c| c.count());
    let bits = track
        .codec_params
        .bits_per_sample
        .unwrap_or(DEFAULT_BITS_PER_SAMPLE);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let pcm = decode_packets(format.as_mut(), decoder.as_mut(), track_id, path)?;

    let sample_rate = sample_rate
        .or(pcm.spec.map(|s| s.rate))
        .ok_or(DecodeError::UnknownSampleRate)?;
    let channels = if pcm.channels.is_empty() {
        vec![Vec::new(); channel_count.unwrap_or(1)]
    } else {
        pcm.channels
    };

    log::debug!(
        "decoded {}: {} ch, {} Hz, {} frames",
        path.display(),
        channels.len(),
        sample_rate,
        channels.first().map(Vec::len).unwrap_or(0)
    );

    Ok(DecodedAudio {
        channels,
        sample_rate,
        sample_width: bits.div_ceil(8) as u16,
    })
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>, DecodeError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;
    Ok(probed.format)
}

// ---------------------------------------------------------------------------
// Packet loop
// ---------------------------------------------------------------------------

/// Planar samples plus the spec of the decoded buffers.
struct Pcm {
    channels: Vec<Vec<f32>>,
    spec: Option<SignalSpec>,
}

fn decode_packets(
    format: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
    track_id: u32,
    path: &Path,
) -> Result<Pcm, DecodeError> {
    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut first_spec: Option<SignalSpec> = None;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut packets_read = 0usize;
    let mut packets_decoded = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }
        packets_read += 1;

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("{}: skipping corrupt packet: {msg}", path.display());
                continue;
            }
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };
        packets_decoded += 1;

        let spec = *decoded.spec();
        let n_ch = spec.channels.count();
        first_spec.get_or_insert(spec);
        if channels.is_empty() {
            channels = vec![Vec::new(); n_ch];
        }

        let needed = decoded.capacity() * n_ch;
        if sample_buf.as_ref().map_or(true, |b| b.capacity() < needed) {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        for frame in buf.samples().chunks_exact(n_ch) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
    }

    if packets_read > 0 && packets_decoded == 0 {
        return Err(DecodeError::NoDecodablePackets(packets_read));
    }

    Ok(Pcm {
        channels,
        spec: first_spec,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::path::PathBuf;
    use symphonia::core::audio::AudioBufferRef;
    use symphonia::core::codecs::{CodecDescriptor, CodecParameters, FinalizeResult};
    use symphonia::core::formats::Packet;

    /// Write a 16-bit sine WAV and return its path.
    pub(crate) fn write_sine_wav(
        dir: &Path,
        name: &str,
        channels: u16,
        sample_rate: u32,
        frames: usize,
        amplitude: f32,
    ) -> PathBuf {
        let path = dir.join(name);
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let v = amplitude * (2.0 * std::f32::consts::PI * 1000.0 * t).sin();
            for _ in 0..channels {
                writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn decodes_stereo_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sine_wav(dir.path(), "tone.wav", 2, 44_100, 44_100, 0.5);

        let audio = decode_file(&path).unwrap();
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.sample_rate, 44_100);
        assert_eq!(audio.sample_width, 2);
        assert_eq!(audio.frames(), 44_100);
        assert_abs_diff_eq!(audio.duration_secs(), 1.0, epsilon = 1e-9);
        // Sine at half scale: 20*log10(0.5/sqrt(2)) ≈ -9.03 dBFS
        assert_abs_diff_eq!(audio.dbfs(), -9.03, epsilon = 0.05);
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not an mpeg stream").unwrap();

        assert!(decode_file(&path).is_err());
    }

    /// Decoder that rejects every packet as corrupt.
    struct CorruptDecoder {
        params: CodecParameters,
    }

    impl Decoder for CorruptDecoder {
        fn try_new(params: &CodecParameters, _: &DecoderOptions) -> symphonia::core::errors::Result<Self> {
            Ok(Self {
                params: params.clone(),
            })
        }

        fn supported_codecs() -> &'static [CodecDescriptor] {
            &[]
        }

        fn reset(&mut self) {}

        fn codec_params(&self) -> &CodecParameters {
            &self.params
        }

        fn decode(&mut self, _: &Packet) -> symphonia::core::errors::Result<AudioBufferRef<'_>> {
            Err(SymphoniaError::DecodeError("bad frame"))
        }

        fn finalize(&mut self) -> FinalizeResult {
            FinalizeResult::default()
        }

        fn last_decoded(&self) -> AudioBufferRef<'_> {
            unreachable!("nothing is ever decoded")
        }
    }

    #[test]
    fn every_packet_corrupt_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sine_wav(dir.path(), "tone.wav", 2, 44_100, 44_100, 0.5);

        let mut format = open_format(&path).unwrap();
        let track = format.default_track().unwrap();
        let track_id = track.id;
        let mut decoder =
            CorruptDecoder::try_new(&track.codec_params, &DecoderOptions::default()).unwrap();

        let err = decode_packets(format.as_mut(), &mut decoder, track_id, &path)
            .err()
            .unwrap();
        assert!(matches!(err, DecodeError::NoDecodablePackets(n) if n > 0), "{err}");
    }

    #[test]
    fn stream_without_packets_decodes_to_zero_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sine_wav(dir.path(), "empty.wav", 2, 44_100, 0, 0.5);

        let audio = decode_file(&path).unwrap();
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.frames(), 0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = decode_file(Path::new("/nonexistent/track.flac")).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
