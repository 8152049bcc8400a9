//! Compiles builder step lists into WordPress Playground blueprints and
//! reads blueprints back into step lists.

pub mod blueprint;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod dsl;
