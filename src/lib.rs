pub mod app;
pub mod biosample;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod input;
pub mod ncbi;
pub mod output;
