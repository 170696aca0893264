//! Text generation adapters.

pub mod gemini;

pub use gemini::GeminiGenerationProvider;
