pub mod core;
pub mod decompiler;
pub mod loader;
pub mod resolver;
pub mod shell;

pub use self::core::Compiler;
pub use decompiler::{DecompileReport, MalformedStepError, decompile, decompile_with_report};
pub use resolver::{created_id_at, estimate_created_id};
