use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::BoxError;

use super::{Finished, Playback, Player, Requirement};

const FFPLAY: Requirement = Requirement {
    binary: "ffplay",
    package: "ffmpeg",
};

const PW_PLAY: Requirement = Requirement {
    binary: "pw-play",
    package: "pipewire",
};

/// Session manager that routes PipeWire streams to a device.
const WIREPLUMBER: Requirement = Requirement {
    binary: "wireplumber",
    package: "wireplumber",
};

/// Plays through `ffplay` without a window, blocking until it exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfplayPlayer;

impl Player for FfplayPlayer {
    fn requirements(&self) -> &[Requirement] {
        &[FFPLAY]
    }

    fn start(&self, path: &Path) -> Result<Box<dyn Playback>, BoxError> {
        let status = Command::new(FFPLAY.binary)
            .args(["-autoexit", "-nodisp", "-loglevel", "error"])
            .arg(path)
            .stdin(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(format!("ffplay exited with failure status: {status}").into());
        }
        Ok(Box::new(Finished))
    }
}

/// Plays through PipeWire's `pw-play`; the dispatcher polls the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct PwPlayPlayer;

impl Player for PwPlayPlayer {
    fn requirements(&self) -> &[Requirement] {
        &[PW_PLAY]
    }

    fn optional_helpers(&self) -> &[Requirement] {
        &[WIREPLUMBER]
    }

    fn start(&self, path: &Path) -> Result<Box<dyn Playback>, BoxError> {
        let child = Command::new(PW_PLAY.binary)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()?;
        Ok(Box::new(ChildPlayback {
            child,
            name: PW_PLAY.binary,
        }))
    }
}

/// A player process still running in the background.
///
/// Killed on drop if it has not exited yet.
pub struct ChildPlayback {
    child: Child,
    name: &'static str,
}

impl Playback for ChildPlayback {
    fn is_busy(&mut self) -> Result<bool, BoxError> {
        match self.child.try_wait()? {
            None => Ok(true),
            Some(status) if status.success() => Ok(false),
            Some(status) => Err(format!("{} exited with failure status: {status}", self.name).into()),
        }
    }
}

impl Drop for ChildPlayback {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
