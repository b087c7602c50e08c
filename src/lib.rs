//! Subtrans - windowed subtitle translation
//!
//! Translates SubRip-style subtitle files through an ollama chat model.
//! Entries are sent in fixed-size windows, each answer is checked
//! structurally (balanced emphasis tags, one segment per entry, no markdown
//! fencing) and retried when it fails, and progress is checkpointed after
//! every accepted window.

pub mod cli;
pub mod config;
pub mod error;
pub mod split;
pub mod subtitle;
pub mod translate;
pub mod workflow;
