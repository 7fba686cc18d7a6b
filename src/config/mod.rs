//! Configuration loaded from `<data_dir>/passvault.toml`.

pub mod settings;

pub use settings::{KeySource, Settings};
