pub mod dto;
pub mod service;

pub use dto::AudioClip;
pub use service::TtsService;
