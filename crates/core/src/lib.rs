mod assets;
#[cfg(test)]
mod test_utils;

pub mod config;
pub mod conversation;
pub mod message;
pub mod mode;
pub mod prompt;
pub mod provider;
pub mod relay;

pub use crate::assets::get_data_dir;
