pub mod config;
pub mod matrix;
pub mod output;
pub mod scoring;
pub mod stderr_buffer;
pub mod tui;
