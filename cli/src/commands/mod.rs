//! CLI commands for the bytepair tokenizer.

pub mod decode;
pub mod encode;
pub mod train;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use train::TrainCommand;
