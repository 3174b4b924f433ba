use std::f32::consts::PI;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rodio::buffer::SamplesBuffer;
use rodio::source::Source;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

const SYNTH_SAMPLE_RATE: u32 = 44_100;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SoundSourceKind {
    Auto,
    Clip,
    Synth,
    Mute,
}

/// Loop/stop seam between the ring state and the audio device. The app only
/// ever plays one looping clip at a time.
pub trait SoundBackend {
    fn start_loop(&mut self) -> Result<()>;
    fn stop(&mut self);
    fn is_ringing(&self) -> bool;
}

pub struct SelectedSound {
    pub backend: Box<dyn SoundBackend>,
    pub label: &'static str,
    pub fallback_reason: Option<String>,
}

impl std::fmt::Debug for SelectedSound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedSound")
            .field("label", &self.label)
            .field("fallback_reason", &self.fallback_reason)
            .finish_non_exhaustive()
    }
}

pub fn select_backend(
    kind: SoundSourceKind,
    clip_path: &Path,
    volume: f32,
) -> Result<SelectedSound> {
    match kind {
        SoundSourceKind::Clip => Ok(SelectedSound {
            backend: Box::new(ClipBackend::try_new(clip_path, volume)?),
            label: "CLIP_LOOP",
            fallback_reason: None,
        }),
        SoundSourceKind::Synth => Ok(SelectedSound {
            backend: Box::new(SynthBackend::try_new(volume)?),
            label: "SYNTH_CHIME",
            fallback_reason: None,
        }),
        SoundSourceKind::Mute => Ok(SelectedSound {
            backend: Box::new(MuteBackend::default()),
            label: "MUTED",
            fallback_reason: None,
        }),
        SoundSourceKind::Auto => match ClipBackend::try_new(clip_path, volume) {
            Ok(clip) => Ok(SelectedSound {
                backend: Box::new(clip),
                label: "CLIP_LOOP",
                fallback_reason: None,
            }),
            Err(clip_err) => match SynthBackend::try_new(volume) {
                Ok(synth) => {
                    log::warn!("sound clip unavailable, using synthesized chime: {clip_err:#}");
                    Ok(SelectedSound {
                        backend: Box::new(synth),
                        label: "SYNTH_CHIME",
                        fallback_reason: Some(format!(
                            "Clip unavailable, using synthesized chime: {clip_err}"
                        )),
                    })
                }
                Err(synth_err) => {
                    log::warn!("audio output unavailable, alarms will be silent: {synth_err:#}");
                    Ok(SelectedSound {
                        backend: Box::new(MuteBackend::default()),
                        label: "MUTED",
                        fallback_reason: Some(format!(
                            "Audio output unavailable, alarms will be silent: {synth_err}"
                        )),
                    })
                }
            },
        },
    }
}

/// Loops the configured clip file. The file is re-opened per ring so a clip
/// swapped on disk between rings is picked up.
struct ClipBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    path: PathBuf,
    volume: f32,
}

impl ClipBackend {
    fn try_new(path: &Path, volume: f32) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("unable to read sound clip {}", path.display()))?;
        Decoder::new(BufReader::new(file))
            .map_err(|err| anyhow!("unable to decode sound clip {}: {err}", path.display()))?;

        let (stream, handle) = OutputStream::try_default()
            .map_err(|err| anyhow!("no audio output device: {err}"))?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
            path: path.to_path_buf(),
            volume,
        })
    }
}

impl SoundBackend for ClipBackend {
    fn start_loop(&mut self) -> Result<()> {
        if self.sink.is_some() {
            return Ok(());
        }
        let file = File::open(&self.path)
            .with_context(|| format!("unable to read sound clip {}", self.path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|err| anyhow!("unable to decode sound clip {}: {err}", self.path.display()))?;
        let sink = Sink::try_new(&self.handle)
            .map_err(|err| anyhow!("failed to open audio sink: {err}"))?;
        sink.set_volume(self.volume);
        sink.append(source.repeat_infinite());
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_ringing(&self) -> bool {
        self.sink.is_some()
    }
}

/// Loops a synthesized two-tone chime when no clip file is available.
struct SynthBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    volume: f32,
}

impl SynthBackend {
    fn try_new(volume: f32) -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|err| anyhow!("no audio output device: {err}"))?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
            volume,
        })
    }
}

impl SoundBackend for SynthBackend {
    fn start_loop(&mut self) -> Result<()> {
        if self.sink.is_some() {
            return Ok(());
        }
        let sink = Sink::try_new(&self.handle)
            .map_err(|err| anyhow!("failed to open audio sink: {err}"))?;
        sink.set_volume(self.volume);
        let chime = SamplesBuffer::new(1, SYNTH_SAMPLE_RATE, synth_chime_samples());
        sink.append(chime.repeat_infinite());
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_ringing(&self) -> bool {
        self.sink.is_some()
    }
}

/// Ring-state bookkeeping without a device. Used under `--check`, in tests,
/// and when audio output cannot be opened at all.
#[derive(Default)]
pub struct MuteBackend {
    ringing: bool,
}

impl SoundBackend for MuteBackend {
    fn start_loop(&mut self) -> Result<()> {
        self.ringing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.ringing = false;
    }

    fn is_ringing(&self) -> bool {
        self.ringing
    }
}

/// 880 Hz then 660 Hz, 300 ms each with a linear decay, then a beat of
/// silence. Looped by the sink.
fn synth_chime_samples() -> Vec<f32> {
    let tone_len = SYNTH_SAMPLE_RATE as usize * 3 / 10;
    let gap_len = SYNTH_SAMPLE_RATE as usize / 10;
    let tail_len = SYNTH_SAMPLE_RATE as usize / 2;

    let mut samples = Vec::with_capacity(tone_len * 2 + gap_len + tail_len);
    for &freq in &[880.0_f32, 660.0_f32] {
        for n in 0..tone_len {
            let t = n as f32 / SYNTH_SAMPLE_RATE as f32;
            let envelope = 1.0 - n as f32 / tone_len as f32;
            samples.push((2.0 * PI * freq * t).sin() * envelope * 0.6);
        }
        samples.extend(std::iter::repeat_n(0.0, gap_len));
    }
    samples.extend(std::iter::repeat_n(0.0, tail_len));
    samples
}
