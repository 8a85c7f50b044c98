pub mod pdf;
pub mod types;

use anyhow::Result;

pub use types::{ExtractIn, ExtractOut};

/// Turns one PDF into per-page text.
pub trait Engine {
    fn name(&self) -> &'static str;
    fn extract_pages(&self, req: &ExtractIn) -> Result<ExtractOut>;
}
