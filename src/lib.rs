//! The `kiln` command line interface.
//!
//! Rendering lives in `kiln-template`, the configuration model in `kiln-recipe`.

pub mod commands;
