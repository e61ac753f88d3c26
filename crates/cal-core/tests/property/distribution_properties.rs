//! Property tests for PredictiveDistribution construction.

use proptest::prelude::*;

use cal_core::models::PredictiveDistribution;
use cal_core::rng::seeded_stream;
use rand::Rng;

proptest! {
    #[test]
    fn prop_log_probs_yield_valid_distribution(
        logits in prop::collection::vec(-30.0f64..30.0, 1..20),
    ) {
        let d = PredictiveDistribution::from_log_probs(&logits).unwrap();
        prop_assert_eq!(d.num_classes(), logits.len());
        let sum: f64 = d.as_slice().iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
        prop_assert!(d.as_slice().iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn prop_argmax_follows_largest_logit(
        logits in prop::collection::vec(-10.0f64..10.0, 1..20),
    ) {
        let d = PredictiveDistribution::from_log_probs(&logits).unwrap();
        let best = d.as_slice()[d.argmax()];
        prop_assert!(d.as_slice().iter().all(|p| *p <= best));
    }

    #[test]
    fn prop_serde_accepts_only_valid_vectors(
        probs in prop::collection::vec(0.0f64..1.0, 1..10),
    ) {
        let json = serde_json::to_string(&probs).unwrap();
        let parsed: Result<PredictiveDistribution, _> = serde_json::from_str(&json);
        prop_assert_eq!(parsed.is_ok(), PredictiveDistribution::new(probs).is_ok());
    }

    #[test]
    fn prop_streams_are_reproducible(seed in any::<u64>(), stream in 0u64..4) {
        let a: u64 = seeded_stream(seed, stream).gen();
        let b: u64 = seeded_stream(seed, stream).gen();
        prop_assert_eq!(a, b);
    }
}
