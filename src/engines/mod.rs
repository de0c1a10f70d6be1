//! Speech synthesis engines.
//!
//! This module contains the model management and synthesis front-ends.
//!
//! # Available Engines
//!
//! - `silero` - Silero TTS packages (`.pt`, hosted by a Python/torch worker)

pub mod silero;
