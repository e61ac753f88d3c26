//! Structured log events for the run lifecycle.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a committed round.
pub fn round_committed(seed: u64, round: usize, labeled: usize, unlabeled: usize) {
    tracing::info!(
        event = "round_committed",
        seed = seed,
        round = round,
        labeled = labeled,
        unlabeled = unlabeled,
        "round committed"
    );
}

/// Log a batch moved into the labeled set.
pub fn batch_acquired(seed: u64, round: usize, sampler: &str, size: usize) {
    tracing::info!(
        event = "batch_acquired",
        seed = seed,
        round = round,
        sampler = %sampler,
        size = size,
        "batch acquired"
    );
}

/// Log a batch request larger than the unlabeled pool.
pub fn batch_clamped(seed: u64, round: usize, requested: usize, available: usize) {
    tracing::warn!(
        event = "batch_clamped",
        seed = seed,
        round = round,
        requested = requested,
        available = available,
        "batch size clamped to unlabeled pool"
    );
}

/// Log a reporter that rejected a record. The run continues.
pub fn reporter_failed(seed: u64, round: usize, error: &str) {
    tracing::warn!(
        event = "reporter_failed",
        seed = seed,
        round = round,
        error = %error,
        "run reporter failed"
    );
}

/// Log a seed that finished every round.
pub fn seed_completed(seed: u64, rounds: usize) {
    tracing::info!(event = "seed_completed", seed = seed, rounds = rounds, "seed completed");
}

/// Log a seed stopped by cancellation.
pub fn seed_cancelled(seed: u64, at_round: usize) {
    tracing::warn!(
        event = "seed_cancelled",
        seed = seed,
        at_round = at_round,
        "seed cancelled"
    );
}

/// Log a seed aborted by an error.
pub fn seed_failed(seed: u64, code: &str, error: &str) {
    tracing::error!(
        event = "seed_failed",
        seed = seed,
        code = %code,
        error = %error,
        "seed failed"
    );
}
