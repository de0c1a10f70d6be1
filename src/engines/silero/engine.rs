use std::path::Path;

use crate::config::SynthConfig;
use crate::error::{Result, VoiceSynthError};
use crate::playback::{Backend, PlaybackDispatcher};
use crate::{has_extension, AcousticModel, AUDIO_EXTENSION, SAMPLE_RATE};

use super::handle::ModelHandle;
use super::worker::{TorchModelParams, TorchPackageModel};

/// Wrap `text` in prosody markup carrying `rate_percent` as a relative rate.
///
/// The text is inserted verbatim, so callers may embed their own markup.
pub fn prosody_markup(text: &str, rate_percent: u32) -> String {
    format!("<speak><prosody rate='{rate_percent}%'>{text}</prosody></speak>")
}

/// Silero text-to-speech engine.
///
/// Owns one [`ModelHandle`] and the acoustic model loaded from it. The
/// thread count and the 48 kHz output rate are fixed for the engine's
/// lifetime. Rendering takes `&mut self`; share an engine across threads
/// only behind your own lock.
///
/// # Quick Start
///
/// ```rust,no_run
/// use voicesynth::engines::silero::{ModelHandle, Synthesizer};
/// use voicesynth::SynthConfig;
///
/// let config = SynthConfig::default();
/// let handle = ModelHandle::new("v3_en", "models/v3_en.pt", &config)?;
/// let mut synth = Synthesizer::new(handle, &config)?;
/// synth.set_speaker("en_21")?;
/// synth.render("Hello, world!", "hello.wav", 120)?;
/// # Ok::<(), voicesynth::VoiceSynthError>(())
/// ```
pub struct Synthesizer<M: AcousticModel = TorchPackageModel> {
    handle: ModelHandle,
    model: M,
    log_enabled: bool,
}

impl Synthesizer<TorchPackageModel> {
    /// Load the handle's model package into a torch worker.
    pub fn new(handle: ModelHandle, config: &SynthConfig) -> Result<Self> {
        let params = TorchModelParams {
            python: config.python.clone(),
            num_threads: config.num_threads,
        };
        let model = TorchPackageModel::load(handle.local_path(), &params)?;
        info_if!(
            config.log_enabled,
            "Synthesizer configured: cpu, {} threads, {} Hz",
            config.num_threads,
            SAMPLE_RATE
        );
        Ok(Self::with_model(handle, model, config))
    }
}

impl<M: AcousticModel> Synthesizer<M> {
    /// Pair a handle with an already loaded model.
    pub fn with_model(handle: ModelHandle, model: M, config: &SynthConfig) -> Self {
        Self {
            handle,
            model,
            log_enabled: config.log_enabled,
        }
    }

    /// Synthesize `text` at `rate_percent` (100 = normal speed) into a WAV file.
    ///
    /// `output_path` must end in `.wav`; otherwise the model is not invoked.
    /// Any model failure is reported as [`VoiceSynthError::SynthesisFailure`].
    pub fn render(
        &mut self,
        text: &str,
        output_path: impl AsRef<Path>,
        rate_percent: u32,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        check_audio_path(output_path)?;

        let markup = prosody_markup(text, rate_percent);
        log::debug!(
            "Rendering {} chars as '{}' at {}%",
            text.chars().count(),
            self.handle.speaker(),
            rate_percent
        );

        self.model
            .render_to_file(&markup, self.handle.speaker(), SAMPLE_RATE, output_path)
            .map_err(VoiceSynthError::SynthesisFailure)?;

        probe_output(output_path);
        info_if!(self.log_enabled, "Audio synthesized to {}", output_path.display());
        Ok(())
    }

    /// Render `text` and play the result on `backend`.
    pub fn say(
        &mut self,
        text: &str,
        output_path: impl AsRef<Path>,
        rate_percent: u32,
        dispatcher: &PlaybackDispatcher,
        backend: Backend,
        delete_after: bool,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        self.render(text, output_path, rate_percent)?;
        dispatcher.play(output_path, backend, delete_after)
    }

    /// Switch the active speaker of the underlying handle.
    pub fn set_speaker(&mut self, name: &str) -> Result<()> {
        self.handle.set_speaker(name)
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

fn check_audio_path(path: &Path) -> Result<()> {
    if has_extension(path, AUDIO_EXTENSION) {
        Ok(())
    } else {
        Err(VoiceSynthError::InvalidAudioFormat(path.to_path_buf()))
    }
}

/// Log what the model wrote. Mismatches are reported, never enforced.
fn probe_output(path: &Path) {
    match hound::WavReader::open(path) {
        Ok(reader) => {
            let spec = reader.spec();
            if spec.sample_rate != SAMPLE_RATE {
                log::warn!(
                    "{} was written at {} Hz, expected {} Hz",
                    path.display(),
                    spec.sample_rate,
                    SAMPLE_RATE
                );
            }
            log::debug!(
                "{}: {:.2}s, {} channel(s), {} bits",
                path.display(),
                reader.duration() as f64 / spec.sample_rate.max(1) as f64,
                spec.channels,
                spec.bits_per_sample
            );
        }
        Err(e) => log::warn!("Could not read WAV header of {}: {e}", path.display()),
    }
}
