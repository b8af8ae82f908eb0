pub mod clarinet;
pub mod command;
pub mod scripts;

pub use clarinet::ClarinetRunner;
pub use command::{run_command, CommandResult};
pub use scripts::ScriptRunner;
