use std::process::{Command, Stdio};

use crate::error::BoxError;

use super::Requirement;

/// Package managers tried in order, with their non-interactive install arguments.
const PACKAGE_MANAGERS: &[(&str, &[&str])] = &[
    ("apt-get", &["install", "-y"]),
    ("dnf", &["install", "-y"]),
    ("pacman", &["-S", "--noconfirm"]),
    ("zypper", &["--non-interactive", "install"]),
    ("brew", &["install"]),
];

/// Checks for and installs the external packages players depend on.
pub trait Provisioner {
    fn is_installed(&self, requirement: &Requirement) -> bool;

    /// Try to install `requirement.package`.
    ///
    /// `Ok(false)` means the attempt ran but the binary is still missing.
    fn install(&self, requirement: &Requirement) -> Result<bool, BoxError>;
}

/// Looks binaries up on `PATH` and installs through the system package manager.
#[derive(Debug, Clone, Default)]
pub struct SystemProvisioner;

impl SystemProvisioner {
    /// The first supported package manager found on `PATH`.
    pub fn package_manager() -> Option<(&'static str, &'static [&'static str])> {
        PACKAGE_MANAGERS
            .iter()
            .copied()
            .find(|(program, _)| executable_in_path(program))
    }
}

impl Provisioner for SystemProvisioner {
    fn is_installed(&self, requirement: &Requirement) -> bool {
        executable_in_path(requirement.binary)
    }

    fn install(&self, requirement: &Requirement) -> Result<bool, BoxError> {
        let (program, args) = Self::package_manager().ok_or_else(|| {
            format!(
                "no supported package manager found (tried {})",
                PACKAGE_MANAGERS
                    .iter()
                    .map(|(p, _)| *p)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?;

        log::debug!("Running {program} {} {}", args.join(" "), requirement.package);
        let status = Command::new(program)
            .args(args)
            .arg(requirement.package)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            log::debug!("{program} exited with {status}");
        }
        Ok(status.success() && self.is_installed(requirement))
    }
}

/// True when an executable named `command` exists in a `PATH` directory.
pub fn executable_in_path(command: &str) -> bool {
    let Some(path_var) = std::env::var_os("PATH") else {
        return false;
    };

    #[cfg(windows)]
    let exts: Vec<String> = std::env::var_os("PATHEXT")
        .map(|v| {
            v.to_string_lossy()
                .split(';')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| vec![".exe".to_string(), ".bat".to_string(), ".cmd".to_string()]);

    for dir in std::env::split_paths(&path_var) {
        if dir.join(command).is_file() {
            return true;
        }
        #[cfg(windows)]
        {
            for ext in &exts {
                if dir.join(format!("{command}{ext}")).is_file() {
                    return true;
                }
            }
        }
    }

    false
}
