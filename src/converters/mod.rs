pub mod gemini;
pub mod helpers;
