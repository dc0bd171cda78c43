pub mod job;
pub mod tts;
pub mod work;
