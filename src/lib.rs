pub mod cli;
pub mod config;
pub mod context;
pub mod crews;
pub mod error;
pub mod exec;
pub mod guard;
pub mod report;
pub mod runtime;
pub mod tools;
pub mod validate;
