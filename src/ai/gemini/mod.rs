pub mod client;
pub mod image;
pub mod poses;
pub mod types;

pub use image::GeminiImageSynthesizer;
pub use poses::GeminiPosePlanner;
