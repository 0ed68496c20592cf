//! # Audio Module
//!
//! Everything that touches audio files on disk.
//!
//! ## Key Components:
//! - **Normalizer**: rewrites an uploaded clip in place into the canonical
//!   format (mono, 16-bit signed PCM, 22050 Hz) via an external transcoder
//! - **Info**: file stat plus WAV header parameters for the metadata endpoint
//!
//! ## Canonical Format:
//! - **Sample Rate**: 22050 Hz
//! - **Bit Depth**: 16-bit signed PCM
//! - **Channels**: Mono (1 channel)
//! - **Container**: WAVE

pub mod info;      // File stat and WAV header inspection
pub mod normalize; // External-transcoder codec adapter

pub use normalize::{AudioNormalizer, FfmpegNormalizer};
