pub mod analyzers;
pub mod classify;
pub mod config;
pub mod names;
pub mod output;
pub mod parser;
