//! # voicesynth
//!
//! A Rust library for speech synthesis with pretrained Silero TTS models.
//!
//! ## Features
//!
//! - **Model Catalog**: Named models with their download URL, language and speakers
//! - **Lazy Acquisition**: Model weights are downloaded once and reused from disk
//! - **Speech Rate Control**: Text is wrapped in prosody markup before synthesis
//! - **Pluggable Playback**: `ffplay`, PipeWire `pw-play`, or in-process `cpal`
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! voicesynth = { version = "0.3", features = ["cpal"] }
//! ```
//!
//! ```ignore
//! use voicesynth::{
//!     engines::silero::{ModelHandle, Synthesizer},
//!     playback::{Backend, PlaybackDispatcher},
//!     SynthConfig,
//! };
//!
//! let config = SynthConfig::default();
//! let handle = ModelHandle::new("v4_ru", "models/v4_ru.pt", &config)?;
//! let mut synth = Synthesizer::new(handle, &config)?;
//! synth.set_speaker("baya")?;
//! synth.render("Привет, мир!", "hello.wav", 100)?;
//!
//! let dispatcher = PlaybackDispatcher::new(config);
//! dispatcher.play("hello.wav", Backend::Ffplay, true)?;
//! # Ok::<(), voicesynth::VoiceSynthError>(())
//! ```

/// `log::info!` gated on a [`SynthConfig::log_enabled`] value.
macro_rules! info_if {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            log::info!($($arg)+);
        }
    };
}

pub mod config;
pub mod engines;
pub mod error;
pub mod playback;

use std::path::Path;

pub use config::SynthConfig;
pub use error::{BoxError, Result, VoiceSynthError};

/// Output sample rate requested from every model.
pub const SAMPLE_RATE: u32 = 48000;

/// Extension required for model weight files.
pub const MODEL_EXTENSION: &str = "pt";

/// Extension required for synthesized audio files.
pub const AUDIO_EXTENSION: &str = "wav";

/// Common interface for a loaded acoustic model.
///
/// The model is an opaque collaborator: it receives markup text and a speaker
/// identifier and writes a waveform file itself. Implementations report
/// failures as boxed errors; callers collapse them into
/// [`VoiceSynthError::SynthesisFailure`].
pub trait AcousticModel {
    /// Render `markup` with `speaker` at `sample_rate` into `output_path`.
    fn render_to_file(
        &mut self,
        markup: &str,
        speaker: &str,
        sample_rate: u32,
        output_path: &Path,
    ) -> std::result::Result<(), BoxError>;
}

/// True when `path` carries `extension` (case-sensitive, without the dot).
pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

#[cfg(test)]
mod tests {
    use super::has_extension;
    use std::path::Path;

    #[test]
    fn extension_check_ignores_lookalike_names() {
        assert!(has_extension(Path::new("out.wav"), "wav"));
        assert!(has_extension(Path::new("dir.d/model.pt"), "pt"));
        assert!(!has_extension(Path::new("out.wav.mp3"), "wav"));
        assert!(!has_extension(Path::new("wav"), "wav"));
        assert!(!has_extension(Path::new("model.pth"), "pt"));
    }
}
