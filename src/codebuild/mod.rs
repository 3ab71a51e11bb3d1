pub mod client;
pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod resolver;
pub mod traits;

#[cfg(test)]
mod testing;
