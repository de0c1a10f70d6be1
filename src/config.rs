use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;

/// Default number of CPU threads handed to the model runtime.
pub const DEFAULT_NUM_THREADS: usize = 16;

/// Default interval between liveness polls of a running playback.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settings shared by model acquisition, synthesis and playback.
///
/// Every component receives its configuration explicitly; there is no
/// process-wide toggle.
///
/// ```rust
/// use voicesynth::SynthConfig;
///
/// let config = SynthConfig::builder()
///     .num_threads(4usize)
///     .log_enabled(false)
///     .build()?;
/// assert_eq!(config.num_threads, 4);
/// assert!(config.show_progress);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(default, setter(into))]
pub struct SynthConfig {
    /// Emit informational lifecycle messages (model configured, speaker set,
    /// file played). Warnings are always emitted.
    pub log_enabled: bool,
    /// Report download progress through the log while fetching weights.
    pub show_progress: bool,
    /// Number of CPU threads used by the model runtime.
    pub num_threads: usize,
    /// Python interpreter with `torch` installed, used to host the model.
    pub python: PathBuf,
    /// Let the playback dispatcher install missing backend packages on its own.
    ///
    /// Off by default: callers provision explicitly via
    /// [`PlaybackDispatcher::provision`](crate::playback::PlaybackDispatcher::provision).
    pub auto_provision: bool,
    /// How often a pollable backend is asked whether it is still playing.
    pub poll_interval: Duration,
    /// User agent sent with model downloads.
    pub user_agent: String,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            log_enabled: true,
            show_progress: true,
            num_threads: DEFAULT_NUM_THREADS,
            python: PathBuf::from("python3"),
            auto_provision: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            user_agent: concat!("voicesynth/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SynthConfig {
    /// Create a builder starting from the defaults.
    pub fn builder() -> SynthConfigBuilder {
        SynthConfigBuilder::default()
    }
}
