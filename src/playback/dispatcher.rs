use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::thread;

use crate::config::SynthConfig;
use crate::error::{Result, VoiceSynthError};

use super::provision::{Provisioner, SystemProvisioner};
use super::{Backend, Player, Requirement};

/// Plays WAV files on a chosen [`Backend`], blocking until playback ends.
///
/// Backend packages are only installed by [`provision`](Self::provision), or
/// by `play` itself when [`SynthConfig::auto_provision`] is set.
pub struct PlaybackDispatcher {
    config: SynthConfig,
    provisioner: Box<dyn Provisioner>,
    players: HashMap<Backend, Box<dyn Player>>,
}

impl PlaybackDispatcher {
    /// Dispatcher with the built-in players and the system provisioner.
    pub fn new(config: SynthConfig) -> Self {
        let players = Backend::all()
            .iter()
            .map(|&backend| (backend, backend.default_player()))
            .collect();
        Self {
            config,
            provisioner: Box::new(SystemProvisioner),
            players,
        }
    }

    /// Replace the package provisioner.
    pub fn with_provisioner(mut self, provisioner: impl Provisioner + 'static) -> Self {
        self.provisioner = Box::new(provisioner);
        self
    }

    /// Replace the player used for `backend`.
    pub fn with_player(mut self, backend: Backend, player: impl Player + 'static) -> Self {
        self.players.insert(backend, Box::new(player));
        self
    }

    /// Install whatever `backend` is missing.
    ///
    /// Fails with [`VoiceSynthError::PackageInstallationFailure`] when a
    /// required package cannot be installed. Missing optional helpers are
    /// logged and skipped.
    pub fn provision(&self, backend: Backend) -> Result<()> {
        let player = self.player(backend);

        for requirement in player.requirements() {
            if self.provisioner.is_installed(requirement) {
                continue;
            }
            info_if!(
                self.config.log_enabled,
                "{} is not installed, attempting to install {}",
                requirement.binary,
                requirement.package
            );
            match self.provisioner.install(requirement) {
                Ok(true) => info_if!(
                    self.config.log_enabled,
                    "{} installation succeeded",
                    requirement.package
                ),
                Ok(false) => {
                    return Err(VoiceSynthError::PackageInstallationFailure {
                        package: requirement.package.to_string(),
                        source: None,
                    })
                }
                Err(e) => {
                    return Err(VoiceSynthError::PackageInstallationFailure {
                        package: requirement.package.to_string(),
                        source: Some(e),
                    })
                }
            }
        }

        for helper in player.optional_helpers() {
            if self.provisioner.is_installed(helper) {
                continue;
            }
            match self.provisioner.install(helper) {
                Ok(true) => info_if!(
                    self.config.log_enabled,
                    "{} installation succeeded",
                    helper.package
                ),
                Ok(false) => log::warn!(
                    "Optional package {} for {backend} could not be installed",
                    helper.package
                ),
                Err(e) => log::warn!(
                    "Optional package {} for {backend} could not be installed: {e}",
                    helper.package
                ),
            }
        }
        Ok(())
    }

    /// Whether every required package of `backend` is present.
    pub fn is_available(&self, backend: Backend) -> bool {
        self.missing_requirement(backend).is_none()
    }

    /// Play `path` on `backend` and return once audio has finished.
    ///
    /// A missing file fails with [`VoiceSynthError::AudioPathNotFound`] and
    /// invokes no backend. Without `auto_provision` that check comes before
    /// the backend's packages are checked; with it, the file is checked after
    /// provisioning, right before playback starts. With `delete_after`, the
    /// file is removed only after playback succeeded.
    pub fn play(&self, path: impl AsRef<Path>, backend: Backend, delete_after: bool) -> Result<()> {
        let path = path.as_ref();

        if self.config.auto_provision {
            self.provision(backend)?;
            if !path.exists() {
                return Err(VoiceSynthError::AudioPathNotFound(path.to_path_buf()));
            }
        } else {
            if !path.exists() {
                return Err(VoiceSynthError::AudioPathNotFound(path.to_path_buf()));
            }
            if let Some(missing) = self.missing_requirement(backend) {
                return Err(VoiceSynthError::BackendUnavailable {
                    backend: backend.to_string(),
                    binary: missing.binary.to_string(),
                });
            }
            for helper in self.player(backend).optional_helpers() {
                if !self.provisioner.is_installed(helper) {
                    log::warn!(
                        "Optional package {} for {backend} is not installed",
                        helper.package
                    );
                }
            }
        }

        let failed = |e: crate::BoxError| VoiceSynthError::PlaybackFailure(format!("{backend}: {e}"));
        let mut playback = self.player(backend).start(path).map_err(failed)?;
        while playback.is_busy().map_err(failed)? {
            thread::sleep(self.config.poll_interval);
        }
        info_if!(self.config.log_enabled, "File {} played", path.display());

        if delete_after {
            fs::remove_file(path)?;
            log::debug!("Removed {}", path.display());
        }
        Ok(())
    }

    fn player(&self, backend: Backend) -> &dyn Player {
        // `new` registers every compiled-in backend and players are only replaced.
        self.players[&backend].as_ref()
    }

    fn missing_requirement(&self, backend: Backend) -> Option<&Requirement> {
        self.player(backend)
            .requirements()
            .iter()
            .find(|r| !self.provisioner.is_installed(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::testing::{FakePlayer, FakeProvisioner, FAKE_HELPER, FAKE_TOOL};
    use std::time::Duration;

    fn config(auto_provision: bool) -> SynthConfig {
        SynthConfig::builder()
            .log_enabled(false)
            .auto_provision(auto_provision)
            .poll_interval(Duration::from_millis(1))
            .build()
            .unwrap()
    }

    fn wav_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("out.wav");
        fs::write(&path, b"RIFF").unwrap();
        path
    }

    #[test]
    fn plays_and_keeps_file_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_file(dir.path());
        let player = FakePlayer::default();
        let played = player.played();
        let dispatcher = PlaybackDispatcher::new(config(false))
            .with_provisioner(FakeProvisioner::everything_installed())
            .with_player(Backend::Ffplay, player);

        dispatcher.play(&path, Backend::Ffplay, false).unwrap();
        assert_eq!(played.borrow().len(), 1);
        assert!(path.exists());
    }

    #[test]
    fn polls_until_done_then_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_file(dir.path());
        let dispatcher = PlaybackDispatcher::new(config(false))
            .with_provisioner(FakeProvisioner::everything_installed())
            .with_player(Backend::PwPlay, FakePlayer::busy_for(5));

        dispatcher.play(&path, Backend::PwPlay, true).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_invokes_no_backend_and_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wav");
        let player = FakePlayer::default();
        let played = player.played();
        let dispatcher = PlaybackDispatcher::new(config(false))
            .with_provisioner(FakeProvisioner::everything_installed())
            .with_player(Backend::Ffplay, player);

        let err = dispatcher.play(&path, Backend::Ffplay, true).unwrap_err();
        assert!(matches!(err, VoiceSynthError::AudioPathNotFound(_)));
        assert!(played.borrow().is_empty());
    }

    #[test]
    fn missing_file_reported_before_missing_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wav");
        let provisioner = FakeProvisioner::empty(&[]);
        let installs = provisioner.installs.clone();
        let player = FakePlayer::default();
        let played = player.played();
        let dispatcher = PlaybackDispatcher::new(config(false))
            .with_provisioner(provisioner)
            .with_player(Backend::Ffplay, player);

        let err = dispatcher.play(&path, Backend::Ffplay, true).unwrap_err();
        assert!(matches!(err, VoiceSynthError::AudioPathNotFound(ref p) if *p == path));
        assert!(played.borrow().is_empty());
        assert!(installs.borrow().is_empty());
    }

    #[test]
    fn failed_playback_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_file(dir.path());
        let dispatcher = PlaybackDispatcher::new(config(false))
            .with_provisioner(FakeProvisioner::everything_installed())
            .with_player(Backend::Ffplay, FakePlayer::failing());

        let err = dispatcher.play(&path, Backend::Ffplay, true).unwrap_err();
        assert!(matches!(err, VoiceSynthError::PlaybackFailure(_)));
        assert!(path.exists());
    }

    #[test]
    fn missing_backend_without_auto_provision_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_file(dir.path());
        let provisioner = FakeProvisioner::empty(&[FAKE_TOOL.package]);
        let installs = provisioner.installs.clone();
        let dispatcher = PlaybackDispatcher::new(config(false))
            .with_provisioner(provisioner)
            .with_player(Backend::Ffplay, FakePlayer::default());

        assert!(!dispatcher.is_available(Backend::Ffplay));
        let err = dispatcher.play(&path, Backend::Ffplay, false).unwrap_err();
        assert!(matches!(err, VoiceSynthError::BackendUnavailable { .. }));
        assert!(installs.borrow().is_empty());
    }

    #[test]
    fn auto_provision_installs_then_plays() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_file(dir.path());
        let provisioner = FakeProvisioner::empty(&[FAKE_TOOL.package]);
        let installs = provisioner.installs.clone();
        let player = FakePlayer::default();
        let played = player.played();
        let dispatcher = PlaybackDispatcher::new(config(true))
            .with_provisioner(provisioner)
            .with_player(Backend::Ffplay, player);

        dispatcher.play(&path, Backend::Ffplay, false).unwrap();
        assert_eq!(installs.borrow().as_slice(), [FAKE_TOOL.package]);
        assert_eq!(played.borrow().len(), 1);
        assert!(dispatcher.is_available(Backend::Ffplay));
    }

    #[test]
    fn failed_install_stops_playback() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav_file(dir.path());
        let player = FakePlayer::default();
        let played = player.played();
        let dispatcher = PlaybackDispatcher::new(config(true))
            .with_provisioner(FakeProvisioner::empty(&[]))
            .with_player(Backend::Ffplay, player);

        let err = dispatcher.play(&path, Backend::Ffplay, true).unwrap_err();
        assert!(matches!(
            err,
            VoiceSynthError::PackageInstallationFailure { ref package, .. } if package == "fake-audio"
        ));
        assert!(played.borrow().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn missing_optional_helper_only_warns() {
        let provisioner = FakeProvisioner::empty(&[FAKE_TOOL.package]);
        let installs = provisioner.installs.clone();
        let dispatcher = PlaybackDispatcher::new(config(false))
            .with_provisioner(provisioner)
            .with_player(Backend::PwPlay, FakePlayer::with_helper());

        dispatcher.provision(Backend::PwPlay).unwrap();
        assert_eq!(
            installs.borrow().as_slice(),
            [FAKE_TOOL.package, FAKE_HELPER.package]
        );
        assert!(dispatcher.is_available(Backend::PwPlay));
    }

    #[test]
    fn every_backend_has_a_player() {
        let dispatcher = PlaybackDispatcher::new(config(false));
        assert_eq!(dispatcher.players.len(), Backend::all().len());
        assert_eq!(
            dispatcher.player(Backend::Ffplay).requirements()[0].binary,
            "ffplay"
        );
    }
}
