// src/lib.rs — Library root for DermBench

pub mod cli;
pub mod core;
pub mod infra;
pub mod judge;
pub mod report;
pub mod scoring;
