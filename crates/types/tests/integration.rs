//! Integration tests for types

#[cfg(test)]
mod tests {
    use ksync_types::*;
    use proptest::prelude::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_handle_sequence() {
        let first = SemHandle::FIRST;
        assert_eq!(first.as_raw(), 1);
        assert_eq!(first.next().as_raw(), 2);
        assert!(first < first.next());
        assert_eq!(SemHandle::from_raw(42).to_string(), "42");
    }

    #[test]
    fn test_timeout_conversions() {
        assert_eq!(Timeout::from(None), Timeout::Infinite);
        assert_eq!(
            Timeout::from(Some(Duration::from_secs(5))),
            Timeout::from_secs(5)
        );
        assert!(Timeout::IMMEDIATE.is_immediate());
        assert!(!Timeout::from_millis(1).is_immediate());
        assert!(!Timeout::Infinite.is_immediate());
        assert_eq!(Timeout::from_millis(250).to_string(), "250ms");
        assert_eq!(Timeout::Infinite.to_string(), "infinite");
    }

    #[test]
    fn test_timeout_deadline() {
        let now = Instant::now();
        assert_eq!(Timeout::Infinite.deadline_from(now), None);
        assert_eq!(Timeout::IMMEDIATE.deadline_from(now), Some(now));
        assert_eq!(
            Timeout::After(Duration::MAX).deadline_from(now),
            None,
            "unrepresentable deadlines degrade to waiting forever"
        );
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&SemHandle::from_raw(3)).unwrap();
        assert_eq!(json, "3");
        let json = serde_json::to_string(&Status::Failure).unwrap();
        assert_eq!(json, r#""failure""#);
        let flags: LockFlags = serde_json::from_str("5").unwrap();
        assert_eq!(flags.bits(), 5);
    }

    proptest! {
        #[test]
        fn handle_raw_round_trips_through_u64(raw in 1u64..u64::MAX) {
            let handle = SemHandle::from_raw(raw);
            prop_assert_eq!(u64::from(handle), raw);
            prop_assert!(handle.next() > handle);
        }
    }
}
