//! TOML settings loaded through `config`; the path can be overridden with `--settings`.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
