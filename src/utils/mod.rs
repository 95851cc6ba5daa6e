//! Shared utility helpers

pub mod path;
