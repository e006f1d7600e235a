//! Command implementations for the bspec CLI

pub mod decode;
pub mod encode;
pub mod run;

pub use decode::decode_command;
pub use encode::encode_command;
pub use run::run_command;
