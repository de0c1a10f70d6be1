//! Audio playback backends.
//!
//! A [`Backend`] names one interchangeable way to play a WAV file. Each
//! backend is implemented by a [`Player`], which declares the external
//! packages it needs and starts playback. [`PlaybackDispatcher`] checks or
//! provisions those packages, verifies the file, and blocks until playback
//! has finished.
//!
//! # Available Backends
//!
//! | Backend | Needs | Waits by |
//! |---|---|---|
//! | `Ffplay` | `ffplay` (package `ffmpeg`) | blocking process |
//! | `PwPlay` | `pw-play` (package `pipewire`), optionally `wireplumber` | polling process exit |
//! | `Cpal` | `cpal` cargo feature | polling stream completion |
//!
//! # Adding a Backend
//!
//! Add a variant to [`Backend`], implement [`Player`] for it, and return it
//! from [`Backend::default_player`]. The dispatcher contract does not change.

pub mod dispatcher;
pub mod external;
pub mod provision;

#[cfg(feature = "cpal")]
pub mod cpal_output;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::BoxError;

pub use dispatcher::PlaybackDispatcher;
pub use provision::{Provisioner, SystemProvisioner};

/// The closed set of playback backends.
///
/// `Cpal` only exists when the crate is built with the `cpal` cargo feature,
/// which pulls in the system audio libraries. A default build has the two
/// external-process backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// FFmpeg's `ffplay`, run to completion.
    Ffplay,
    /// PipeWire's `pw-play`, polled until the process exits.
    PwPlay,
    /// In-process output through the default `cpal` device. Requires the
    /// `cpal` feature.
    #[cfg(feature = "cpal")]
    Cpal,
}

impl Backend {
    /// Every backend compiled into this build.
    pub fn all() -> &'static [Backend] {
        &[
            Backend::Ffplay,
            Backend::PwPlay,
            #[cfg(feature = "cpal")]
            Backend::Cpal,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Ffplay => "ffplay",
            Backend::PwPlay => "pw-play",
            #[cfg(feature = "cpal")]
            Backend::Cpal => "cpal",
        }
    }

    /// The built-in player for this backend.
    pub fn default_player(self) -> Box<dyn Player> {
        match self {
            Backend::Ffplay => Box::new(external::FfplayPlayer),
            Backend::PwPlay => Box::new(external::PwPlayPlayer),
            #[cfg(feature = "cpal")]
            Backend::Cpal => Box::new(cpal_output::CpalPlayer),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Backend::all()
            .iter()
            .copied()
            .find(|b| b.name() == wanted || b.name().replace('-', "") == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Backend::all().iter().map(|b| b.name()).collect();
                format!("Unknown backend '{s}'. Ensure it's one of: {}", names.join(", "))
            })
    }
}

/// An external package a player depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    /// Executable looked up on `PATH` to decide whether it is installed.
    pub binary: &'static str,
    /// Package that provides `binary`.
    pub package: &'static str,
}

/// One playback capability.
pub trait Player {
    /// Packages that must be present for playback to work.
    fn requirements(&self) -> &[Requirement];

    /// Packages that improve playback but are not essential.
    fn optional_helpers(&self) -> &[Requirement] {
        &[]
    }

    /// Start playing `path`.
    ///
    /// Blocking players return once audio has finished and hand back
    /// [`Finished`]; others return a handle the dispatcher polls.
    fn start(&self, path: &Path) -> Result<Box<dyn Playback>, BoxError>;
}

/// A playback in progress.
pub trait Playback {
    /// Whether audio is still playing. An error means playback failed.
    fn is_busy(&mut self) -> Result<bool, BoxError>;
}

/// Playback that already ran to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Finished;

impl Playback for Finished {
    fn is_busy(&mut self) -> Result<bool, BoxError> {
        Ok(false)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_round_trip() {
        for backend in Backend::all() {
            assert_eq!(backend.name().parse::<Backend>().unwrap(), *backend);
        }
        assert_eq!("PwPlay".parse::<Backend>().unwrap(), Backend::PwPlay);
        let err = "pygame".parse::<Backend>().unwrap_err();
        assert!(err.contains("ffplay") && err.contains("pw-play"));
    }

    #[test]
    fn cpal_backend_follows_the_feature() {
        let expected = if cfg!(feature = "cpal") { 3 } else { 2 };
        assert_eq!(Backend::all().len(), expected);
        assert_eq!("cpal".parse::<Backend>().is_ok(), cfg!(feature = "cpal"));
    }

    #[test]
    fn builtin_players_declare_their_packages() {
        let ffplay = Backend::Ffplay.default_player();
        assert_eq!(ffplay.requirements()[0].binary, "ffplay");
        assert_eq!(ffplay.requirements()[0].package, "ffmpeg");

        let pw = Backend::PwPlay.default_player();
        assert_eq!(pw.requirements()[0].binary, "pw-play");
        assert_eq!(pw.optional_helpers()[0].binary, "wireplumber");
    }
}
