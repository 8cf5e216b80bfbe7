pub mod casing;
pub mod classifier;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod gate;
pub mod pattern;
pub mod walker;
pub mod watcher;

pub use casing::*;
pub use classifier::*;
pub use config::*;
pub use dictionary::*;
pub use engine::*;
pub use error::*;
pub use gate::*;
pub use pattern::*;
pub use walker::*;
pub use watcher::*;

#[cfg(test)]
mod tests;
