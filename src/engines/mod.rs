//! Speech synthesis engines.
//!
//! This module contains implementations of [`SynthesisEngine`](crate::SynthesisEngine).
//!
//! # Available Engines
//!
//! - `coqui` - Coqui TTS through its `tts` command line tool

pub mod coqui;
