//! One module per subcommand, each exposing `execute`.

pub mod add;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod repair;
pub mod show;
