use std::path::PathBuf;

/// Boxed error returned by the collaborator seams (model runtime, players,
/// provisioners).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum VoiceSynthError {
    #[error("Model '{requested}' invalid. Ensure it's one of: {valid}")]
    UnknownModel { requested: String, valid: String },
    #[error("Model file path should end with .pt: {0}")]
    InvalidModelPath(PathBuf),
    #[error("Speaker '{requested}' invalid. Ensure it's one of: {valid}")]
    InvalidSpeaker { requested: String, valid: String },
    #[error("Incorrect audio format, path must lead to a .wav file: {0}")]
    InvalidAudioFormat(PathBuf),
    #[error("There was an error synthesizing text. Ensure all parameters are correct")]
    SynthesisFailure(#[source] BoxError),
    #[error("Audio file to play does not exist: {0}")]
    AudioPathNotFound(PathBuf),
    #[error(
        "Failed to install package '{package}'. Install it with your system package manager"
    )]
    PackageInstallationFailure {
        package: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("Playback backend '{backend}' needs '{binary}', which is not installed")]
    BackendUnavailable { backend: String, binary: String },
    #[error("Playback failed: {0}")]
    PlaybackFailure(String),
    #[error("Failed to download model from {url}: {reason}")]
    DownloadFailure { url: String, reason: String },
    #[error("Failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VoiceSynthError>;
