pub mod assemble;
pub mod clash;
pub mod cli;
pub mod config;
pub mod helpers;
pub mod parser;
pub mod pipeline;
pub mod settings;

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
