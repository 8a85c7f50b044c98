pub mod cli;
pub mod compose;
pub mod config;
pub mod engine;
pub mod extract;
pub mod parser;
pub mod pipeline;
pub mod postprocess;
pub mod record;
pub mod report;
pub mod sheet;
pub mod style;
pub mod taxonomy;
pub mod util;
pub mod xlsx;
