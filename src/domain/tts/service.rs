use super::dto::AudioClip;
use crate::domain::work::parse::snippet;
use crate::infrastructure::repositories::TtsRepository;
use futures::stream::{self, StreamExt};
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct TtsService {
    tts_repo: Arc<dyn TtsRepository>,
    timeout: Duration,
    max_concurrency: usize,
    cache: Option<Cache<String, AudioClip>>,
}

impl TtsService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        timeout: Duration,
        max_concurrency: usize,
        cache_enabled: bool,
    ) -> Self {
        // Initialize cache if enabled
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(500)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        Self {
            tts_repo,
            timeout,
            max_concurrency: max_concurrency.max(1),
            cache,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.tts_repo.provider()
    }

    /// Synthesize every sentence independently.
    ///
    /// Calls run concurrently (up to `max_concurrency` at a time) and the
    /// output is index-aligned with `sentences`. A sentence whose synthesis
    /// fails or times out yields `None`; it never fails the others.
    pub async fn synthesize_all(&self, sentences: &[String]) -> Vec<Option<AudioClip>> {
        let start_time = Instant::now();

        let calls: Vec<_> = sentences
            .iter()
            .enumerate()
            .map(|(index, sentence)| self.synthesize_one(index, sentence))
            .collect();
        let clips: Vec<Option<AudioClip>> = stream::iter(calls)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let synthesized = clips.iter().filter(|clip| clip.is_some()).count();
        tracing::info!(
            provider = self.provider(),
            sentence_count = sentences.len(),
            synthesized,
            failed = sentences.len() - synthesized,
            latency_ms = start_time.elapsed().as_millis(),
            "Speech fan-out completed"
        );

        clips
    }

    async fn synthesize_one(&self, index: usize, sentence: &str) -> Option<AudioClip> {
        if let Some(cache) = &self.cache {
            if let Some(clip) = cache.get(sentence).await {
                tracing::debug!(sentence_index = index, "TTS cache hit");
                return Some(clip);
            }
        }

        match tokio::time::timeout(self.timeout, self.tts_repo.synthesize(sentence)).await {
            Ok(Ok(clip)) => {
                if let Some(cache) = &self.cache {
                    cache.insert(sentence.to_string(), clip.clone()).await;
                }
                Some(clip)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = self.provider(),
                    sentence_index = index,
                    sentence_preview = %snippet(sentence, 40),
                    error = %e,
                    "Speech synthesis failed; returning null audio"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.provider(),
                    sentence_index = index,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Speech synthesis timed out; returning null audio"
                );
                None
            }
        }
    }
}
