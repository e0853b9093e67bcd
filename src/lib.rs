pub mod cache;
pub mod cli;
pub mod combine;
pub mod config;
pub mod merge;
pub mod output;
pub mod range;
pub mod rlimit;
pub mod store;
pub mod template;
pub mod translate;
