use std::sync::Arc;
use std::thread;

use secrand::entropy::replay::ReplaySource;
use secrand::events::{EventLog, ProbeOutcome};
use secrand::{
    EntropySource, ErrorKind, FallbackChain, FallbackPolicy, PermissiveRandom, RandomConfig,
    RandomEvent, SecureRandom, SourceError, SourceErrorKind,
};

/// A primitive this system does not have.
struct Missing;

impl EntropySource for Missing {
    fn name(&self) -> &'static str {
        "Missing"
    }

    fn fill(&self, _dest: &mut [u8]) -> Result<(), SourceError> {
        Err(SourceError::not_supported())
    }
}

#[test]
fn test_ranges_hold_bounds() {
    let random = SecureRandom::create().unwrap();
    for _ in 0..10_000 {
        let v = random.next_int_range(-5, 5).unwrap();
        assert!((-5..5).contains(&v));

        let v = random.next_long_range(i64::MIN, i64::MIN + 3).unwrap();
        assert!((i64::MIN..i64::MIN + 3).contains(&v));

        let v = random.next_long_bounded(1 << 40).unwrap();
        assert!((0..1 << 40).contains(&v));
    }
}

#[test]
fn test_extreme_bounds() {
    let random = SecureRandom::create().unwrap();
    assert_eq!(random.next_int_bounded(1), Ok(0));
    assert_eq!(random.next_int_range(7, 8), Ok(7));

    let v = random.next_int_bounded(i32::MAX).unwrap();
    assert!((0..i32::MAX).contains(&v));
    let v = random.next_long_bounded(i64::MAX).unwrap();
    assert!((0..i64::MAX).contains(&v));

    // Span 2^31 does not fit in i32; one less does.
    assert!(random
        .next_int_range(i32::MIN, 0)
        .unwrap_err()
        .is_invalid_parameter());
    let v = random.next_int_range(i32::MIN, -1).unwrap();
    assert!(v < -1);
}

#[test]
fn test_invalid_parameters_leave_facade_usable() {
    let random = SecureRandom::create().unwrap();

    for err in [
        random.next_int_bounded(0).unwrap_err(),
        random.next_int_bounded(-1).unwrap_err(),
        random.next_int_range(10, 10).unwrap_err(),
        random.next_int_range(i32::MIN, i32::MAX).unwrap_err(),
        random.next_long_bounded(i64::MIN).unwrap_err(),
        random.next_long_range(0, -1).unwrap_err(),
    ] {
        assert!(err.is_invalid_parameter(), "{}", err);
        assert_eq!(err.kind().code(), 3);
    }

    assert!(random.next_int_bounded(10).is_ok());
}

#[test]
fn test_next_bytes_lengths() {
    let random = SecureRandom::create().unwrap();
    assert!(random.next_bytes(0).unwrap().is_empty());
    assert_eq!(random.next_bytes(1).unwrap().len(), 1);
    assert_eq!(random.next_bytes(4096).unwrap().len(), 4096);

    let mut empty = [0u8; 0];
    assert!(random.fill(&mut empty).is_ok());
}

#[test]
fn test_fill_overwrites_buffer() {
    let random = SecureRandom::create().unwrap();
    // 64 zero bytes surviving a fill has probability 2^-512.
    let mut buf = [0u8; 64];
    random.fill(&mut buf).unwrap();
    assert!(buf.iter().any(|&b| b != 0));
}

#[test]
fn test_request_ceiling_is_configurable() {
    let random = SecureRandom::builder()
        .config(RandomConfig {
            max_request_bytes: 32,
            ..RandomConfig::default()
        })
        .build()
        .unwrap();

    assert_eq!(random.max_request_bytes(), 32);
    let err = random.next_bytes(33).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::InvalidParameter {
            name: "size",
            value: "33".to_string()
        }
    );
}

#[test]
fn test_shared_across_threads() {
    let random = Arc::new(SecureRandom::create().unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let random = Arc::clone(&random);
            thread::spawn(move || {
                (0..1_000)
                    .map(|_| random.next_long().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let total = all.len();
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), total);
}

#[test]
fn test_custom_chain_advances_past_unsupported_candidates() {
    let log = Arc::new(EventLog::new());
    let random = SecureRandom::builder()
        .observer(log.clone())
        .chain(
            FallbackChain::new()
                .then(Missing)
                .then(ReplaySource::from_bytes(&[0, 0, 0, 0, 1]).named("Second")),
        )
        .build()
        .unwrap();

    assert_eq!(random.source_name(), "Second");
    assert_eq!(random.next_int(), Ok(1));

    let entries = log.entries();
    assert!(entries.iter().any(|e| matches!(
        e,
        RandomEvent::Probed { source: "Missing", outcome: ProbeOutcome::Rejected(_) }
    )));
    assert!(entries
        .iter()
        .any(|e| matches!(e, RandomEvent::Committed { source: "Second", .. })));
}

#[test]
fn test_failing_candidate_stops_the_chain() {
    let err = SecureRandom::builder()
        .chain(
            FallbackChain::new()
                .then(ReplaySource::new())
                .then(ReplaySource::from_bytes(&[0; 8]).named("Second")),
        )
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InitializationFailure);
    assert_eq!(err.cause().map(|c| c.kind()), Some(SourceErrorKind::Exhausted));
}

#[test]
fn test_empty_chain_is_unsupported_platform() {
    let err = SecureRandom::builder()
        .chain(FallbackChain::new())
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnsupportedPlatform);
}

#[test]
fn test_permissive_prefers_secure_source() {
    let random = PermissiveRandom::create(FallbackPolicy::CpuJitter).unwrap();
    assert!(random.is_secure());
    assert_ne!(random.source_name(), "CpuJitter");
}
