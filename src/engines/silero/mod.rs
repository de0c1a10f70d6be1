//! Silero text-to-speech engine implementation.
//!
//! This module resolves Silero model packages from a catalog, downloads them
//! on first use, and synthesizes speech through a Python worker that hosts
//! the `torch.package` file.
//!
//! # System Requirements
//!
//! A Python interpreter with **torch** importable:
//! - `pip install torch`
//! - point [`SynthConfig::python`](crate::SynthConfig::python) at a virtualenv
//!   interpreter if torch is not in the system Python
//!
//! # Models
//!
//! | Model | Language | Speakers |
//! |---|---|---|
//! | `v4_ru` | Russian | `aidar`, `baya`, `kseniya`, `xenia`, `eugene` |
//! | `v4_ua` | Ukrainian | `mykyta` |
//! | `v3_en` | English | `en_0` … `en_117` |
//! | `v3_de` | German | `eva_k`, `karlsson` |
//! | `v3_es` | Spanish | `es_0` … `es_2` |
//! | `v3_fr` | French | `fr_0` … `fr_5` |
//!
//! The first speaker of each model is the default. Print
//! [`Catalog::builtin`] for the full table with URLs.
//!
//! # Caching
//!
//! A file already present at the model path is used as-is, without any
//! integrity or freshness check. Delete it to download again.
//!
//! # Examples
//!
//! ```rust,no_run
//! use voicesynth::engines::silero::{ModelHandle, Synthesizer};
//! use voicesynth::playback::{Backend, PlaybackDispatcher};
//! use voicesynth::SynthConfig;
//!
//! let config = SynthConfig::default();
//! let handle = ModelHandle::new("v3_de", "models/v3_de.pt", &config)?;
//! let mut synth = Synthesizer::new(handle, &config)?;
//!
//! let dispatcher = PlaybackDispatcher::new(config);
//! dispatcher.provision(Backend::Ffplay)?;
//! synth.say("Guten Tag!", "tag.wav", 90, &dispatcher, Backend::Ffplay, true)?;
//! # Ok::<(), voicesynth::VoiceSynthError>(())
//! ```

pub mod catalog;
pub mod engine;
pub mod handle;
pub mod worker;

pub use catalog::{Catalog, CatalogEntry};
pub use engine::{prosody_markup, Synthesizer};
pub use handle::ModelHandle;
pub use worker::{TorchModelParams, TorchPackageModel};
