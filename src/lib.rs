pub mod macros;

pub mod chain;
pub mod config;
pub mod deposit;
pub mod diagnostics;
pub mod error;
pub mod helpers;
pub mod loader;
pub mod logger;
pub mod pipeline;
pub mod rpc;
pub mod signer;
pub mod submit;
pub mod verify;

#[cfg(test)]
mod testing;
