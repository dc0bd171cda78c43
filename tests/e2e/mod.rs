// End-to-end tests for the Diary Coach Backend API
//
// Each test starts the real router on an ephemeral port. The text generator
// and speech provider are in-process fakes whose behavior is driven by
// markers in the diary text:
// - "[slow]"  the generator answers after a short delay
// - "[hang]"  the generator never answers within the test timeouts
// - "[fail]"  the generator returns an upstream error
// - "[mute]"  one practice sentence fails speech synthesis

mod helpers;
mod test_health;
mod test_jobs;
mod test_sync;
