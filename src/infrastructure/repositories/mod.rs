pub mod inline_audio_tts_repository;
pub mod openai_text_generation_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod text_generation_repository;
pub mod tts_repository;

pub use inline_audio_tts_repository::InlineAudioTtsRepository;
pub use openai_text_generation_repository::OpenAiTextGenerationRepository;
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use text_generation_repository::TextGenerationRepository;
pub use tts_repository::TtsRepository;
