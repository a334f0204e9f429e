//! Per-format extraction strategies.
//!
//! Dispatch over formats is closed: the engine maps a lowercased extension to
//! exactly one of these modules. There is no runtime registry; adding a
//! format means adding a module and a match arm.

pub mod archive;
pub mod docx;
pub mod image;
pub mod legacy;
pub mod pdf;
pub mod text;
