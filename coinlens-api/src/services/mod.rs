//! Service collaborators used by the coin pipeline

pub mod gemini_client;
pub mod image_store;
pub mod recognition;

pub use gemini_client::GeminiClient;
pub use image_store::ImageStore;
pub use recognition::{CoinRecognizer, RecognitionError};
