pub mod build;
pub mod config_cmd;
pub mod prompt;
