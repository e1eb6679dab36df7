// src/lib.rs — Library root for mirrors

pub mod cli;
pub mod core;
pub mod credits;
pub mod infra;
pub mod prompt;
pub mod provider;
pub mod review;
