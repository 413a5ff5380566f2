//! Integration tests for the manager façade

#[cfg(test)]
mod tests {
    use ksync_errors::{Error, SemaphoreError};
    use ksync_events::{AppEvent, RegionEvent, SemaphoreEvent};
    use ksync_manager::*;
    use ksync_types::Timeout;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    const NO_FLAGS: LockFlags = LockFlags::NONE;

    fn tokens(manager: &Manager, h: SemHandle) -> u64 {
        manager.semaphore_snapshot(h).unwrap().token_count
    }

    fn wait_for_waiter(manager: &Manager, h: SemHandle) {
        while manager.semaphore_snapshot(h).unwrap().waiters == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_lock_timeout_unlock_scenario() {
        let manager = Manager::new();
        let h = manager.create_semaphore(1);

        assert!(manager.lock_semaphore(h, NO_FLAGS, Timeout::Infinite).is_ok());
        assert_eq!(tokens(&manager, h), 0);

        let err = manager
            .lock_semaphore(h, NO_FLAGS, Timeout::IMMEDIATE)
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(tokens(&manager, h), 0);

        manager.unlock_semaphore(h).unwrap();
        assert_eq!(tokens(&manager, h), 1);

        assert!(manager.lock_semaphore(h, NO_FLAGS, Timeout::Infinite).is_ok());
    }

    #[test]
    fn test_add_then_free_twice_scenario() {
        let mut manager = Manager::new();
        manager.add_resource(10, 20, 2);

        assert_eq!(Status::of(&manager.free_resource(10, 2)), Status::Success);
        assert!(manager.regions().is_empty());
        assert_eq!(Status::of(&manager.free_resource(10, 2)), Status::Failure);
    }

    #[test]
    fn test_lock_ex_takes_one_token_for_many_units() {
        let manager = Manager::new();
        let h = manager.create_semaphore(2);

        manager
            .lock_semaphore_ex(h, 5, NO_FLAGS, Timeout::IMMEDIATE)
            .unwrap();
        let snap = manager.semaphore_snapshot(h).unwrap();
        assert_eq!(snap.token_count, 1);
        assert_eq!(snap.logical_count, -3);

        manager.unlock_semaphore_ex(h, 5).unwrap();
        let snap = manager.semaphore_snapshot(h).unwrap();
        assert_eq!(snap.token_count, 6);
        assert_eq!(snap.logical_count, 2);
    }

    #[test]
    fn test_unknown_handle_is_rejected_everywhere() {
        let manager = Manager::new();
        let live = manager.create_semaphore(1);
        let gone = manager.create_semaphore(1);
        manager.delete_semaphore(gone).unwrap();
        let never = SemHandle::from_raw(99);
        let external = Mutex::new(());

        for bad in [gone, never] {
            let results = [
                manager.delete_semaphore(bad),
                manager.lock_semaphore_ex(bad, 2, NO_FLAGS, Timeout::IMMEDIATE),
                manager.lock_semaphore(bad, NO_FLAGS, Timeout::IMMEDIATE),
                manager.unlock_semaphore_ex(bad, 2),
                manager.unlock_semaphore(bad),
                manager.unlock_and_suspend(bad, live),
                manager.unlock_and_suspend(live, bad),
                manager.spinunlock_and_suspend(bad, &external, NO_FLAGS, Timeout::IMMEDIATE),
                manager.reset_semaphore(bad, 4),
                manager.sleep_on_sem(bad, Timeout::IMMEDIATE),
                manager.wakeup_sem(bad, true),
            ];
            for result in results {
                assert!(result.unwrap_err().is_invalid_handle());
            }
            assert!(manager.semaphore_snapshot(bad).is_err());
        }

        // The live semaphore was untouched by the failed pair operation
        let snap = manager.semaphore_snapshot(live).unwrap();
        assert_eq!(snap.token_count, 1);
        assert_eq!(snap.logical_count, 1);
        assert_eq!(snap.notifications, 0);
        assert_eq!(manager.semaphore_handles(), vec![live]);
    }

    #[test]
    fn test_unlock_and_suspend_notifies_then_releases() {
        let manager = Manager::new();
        let h = manager.create_semaphore(1);
        let wq = manager.create_semaphore(0);

        manager.unlock_and_suspend(wq, h).unwrap();

        let queue = manager.semaphore_snapshot(wq).unwrap();
        assert_eq!(queue.notifications, 1);
        assert_eq!(queue.token_count, 0);

        let sem = manager.semaphore_snapshot(h).unwrap();
        assert_eq!(sem.token_count, 2);
        assert_eq!(sem.logical_count, 2);
    }

    #[test]
    fn test_spinunlock_takes_and_drops_external_lock() {
        let manager = Manager::new();
        let wq = manager.create_semaphore(0);
        let external = Mutex::new(7u32);

        manager
            .spinunlock_and_suspend(wq, &external, NO_FLAGS, Timeout::from_secs(5))
            .unwrap();

        // Released again: a second lock succeeds immediately
        assert_eq!(*external.try_lock().unwrap(), 7);
        let snap = manager.semaphore_snapshot(wq).unwrap();
        assert_eq!(snap.notifications, 1);
        assert_eq!(snap.token_count, 0);
    }

    #[test]
    fn test_sleep_on_sem_passes_token_on() {
        let manager = Manager::new();
        let full = manager.create_semaphore(1);
        let empty = manager.create_semaphore(0);

        manager.sleep_on_sem(full, Timeout::IMMEDIATE).unwrap();
        assert_eq!(tokens(&manager, full), 1);

        let err = manager
            .sleep_on_sem(empty, Timeout::from_millis(10))
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_sleep_on_sem_wakes_on_unlock() {
        let manager = Arc::new(Manager::new());
        let h = manager.create_semaphore(0);

        let sleeper = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.sleep_on_sem(h, Timeout::from_secs(10)))
        };
        wait_for_waiter(&manager, h);
        manager.unlock_semaphore(h).unwrap();

        assert!(sleeper.join().unwrap().is_ok());
        assert_eq!(tokens(&manager, h), 1);
    }

    #[test]
    fn test_wakeup_sem_modes() {
        let manager = Manager::new();
        let h = manager.create_semaphore(0);

        manager.wakeup_sem(h, true).unwrap();
        assert_eq!(manager.semaphore_count(h), Ok(1));

        // Count already at one: wake-all does nothing more
        manager.wakeup_sem(h, true).unwrap();
        assert_eq!(manager.semaphore_count(h), Ok(1));
        assert_eq!(tokens(&manager, h), 1);

        manager.wakeup_sem(h, false).unwrap();
        assert_eq!(manager.semaphore_count(h), Ok(2));
        assert_eq!(tokens(&manager, h), 2);
    }

    #[test]
    fn test_reset_abandons_blocked_locker() {
        let manager = Arc::new(Manager::new());
        let h = manager.create_semaphore(0);

        let locker = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.lock_semaphore(h, NO_FLAGS, Timeout::from_secs(10)))
        };
        wait_for_waiter(&manager, h);
        manager.reset_semaphore(h, 3).unwrap();

        let err = locker.join().unwrap().unwrap_err();
        assert_eq!(err, Error::Semaphore(SemaphoreError::Abandoned { handle: h.as_raw() }));

        let snap = manager.semaphore_snapshot(h).unwrap();
        assert_eq!(snap.token_count, 3);
        assert_eq!(snap.logical_count, 3);
    }

    #[test]
    fn test_blocked_lock_completes_after_unlock_from_other_thread() {
        let manager = Arc::new(Manager::new());
        let h = manager.create_semaphore(0);

        let locker = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.lock_semaphore_ex(h, 2, NO_FLAGS, Timeout::Infinite))
        };
        wait_for_waiter(&manager, h);
        manager.unlock_semaphore(h).unwrap();

        locker.join().unwrap().unwrap();
        assert_eq!(manager.semaphore_count(h), Ok(-1));
        assert_eq!(tokens(&manager, h), 0);
    }

    #[test]
    fn test_zero_units_rejected_without_side_effects() {
        let manager = Manager::new();
        let h = manager.create_semaphore(1);
        assert!(manager
            .lock_semaphore_ex(h, 0, NO_FLAGS, Timeout::IMMEDIATE)
            .is_err());
        assert!(manager.unlock_semaphore_ex(h, 0).is_err());
        assert_eq!(tokens(&manager, h), 1);
        assert_eq!(manager.semaphore_count(h), Ok(1));
    }

    #[test]
    fn test_release_region_exact_match() {
        let mut manager = Manager::new();
        manager.add_resource(0, 100, 1);
        manager.add_region(ResourceRegion::unmasked(40, 30));

        assert!(manager.release_region(40, 31).unwrap_err().is_region_not_found());
        assert_eq!(manager.regions().len(), 2);

        let removed = manager.release_region(40, 30).unwrap();
        assert_eq!(removed.mask, 0);
        let listing: Vec<_> = manager.print_resources().collect();
        assert_eq!(listing, vec!["Resource: Start = 0, Size = 100, Mask = 1"]);
    }

    #[tokio::test]
    async fn test_events_report_each_operation() {
        let (tx, mut rx) = ksync_events::channel();
        let mut manager = Manager::new().with_events(tx);

        let h = manager.create_semaphore(1);
        manager.lock_semaphore(h, NO_FLAGS, Timeout::IMMEDIATE).unwrap();
        let _ = manager.lock_semaphore(h, NO_FLAGS, Timeout::IMMEDIATE);
        manager.add_resource(1, 2, 3);
        let _ = manager.release_region(9, 9);
        drop(manager);

        let mut events = Vec::new();
        while let Some(message) = rx.recv().await {
            events.push(message.event);
        }

        assert!(matches!(
            events[0],
            AppEvent::Semaphore(SemaphoreEvent::Created { initial_count: 1, .. })
        ));
        assert!(matches!(
            events[1],
            AppEvent::Semaphore(SemaphoreEvent::Locked { logical_count: 0, .. })
        ));
        match &events[2] {
            AppEvent::Semaphore(SemaphoreEvent::OperationFailed { failure, .. }) => {
                assert_eq!(failure.code.as_deref(), Some("semaphore.timeout_expired"));
                assert!(failure.retryable);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(
            events[3],
            AppEvent::Region(RegionEvent::Added { start: 1, size: 2, mask: 3 })
        ));
        assert!(matches!(
            events[4],
            AppEvent::Region(RegionEvent::LookupFailed { .. })
        ));
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn test_sleep_and_wake_report_once() {
        let (tx, mut rx) = ksync_events::channel();
        let manager = Manager::new().with_events(tx);
        let empty = manager.create_semaphore(0);
        let full = manager.create_semaphore(1);

        let _ = manager.sleep_on_sem(empty, Timeout::IMMEDIATE);
        manager.sleep_on_sem(full, Timeout::IMMEDIATE).unwrap();
        manager.wakeup_sem(empty, true).unwrap();
        drop(manager);

        let mut events = Vec::new();
        while let Some(message) = rx.recv().await {
            events.push(message.event);
        }
        let events = &events[2..];

        // The timed-out sleep reports only its failure
        match &events[0] {
            AppEvent::Semaphore(SemaphoreEvent::OperationFailed { operation, handle, .. }) => {
                assert_eq!(operation, "sleep_on_sem");
                assert_eq!(*handle, empty);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(
            events[1],
            AppEvent::Semaphore(SemaphoreEvent::SleepFinished { handle }) if handle == full
        ));
        assert!(matches!(
            events[2],
            AppEvent::Semaphore(SemaphoreEvent::Woken {
                releases: 1,
                logical_count: 1,
                wake_all: true,
                ..
            })
        ));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_concurrent_workers_balance() {
        let manager = Arc::new(Manager::new());
        let h = manager.create_semaphore(2);

        let workers: Vec<_> = (0..6)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for _ in 0..100 {
                        manager.lock_semaphore(h, NO_FLAGS, Timeout::Infinite).unwrap();
                        manager.unlock_semaphore(h).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(manager.semaphore_count(h), Ok(2));
        assert_eq!(tokens(&manager, h), 2);
    }

    proptest! {
        #[test]
        fn paired_lock_unlock_restores_logical_count(initial in 1u32..16, pairs in 0usize..32) {
            let manager = Manager::new();
            let h = manager.create_semaphore(initial);
            for _ in 0..pairs {
                prop_assert!(manager.lock_semaphore(h, NO_FLAGS, Timeout::IMMEDIATE).is_ok());
                prop_assert!(manager.unlock_semaphore(h).is_ok());
            }
            prop_assert_eq!(manager.semaphore_count(h), Ok(i64::from(initial)));
        }

        #[test]
        fn initial_count_allows_exactly_k_immediate_locks(k in 0u32..24) {
            let manager = Manager::new();
            let h = manager.create_semaphore(k);
            for _ in 0..k {
                prop_assert!(manager.lock_semaphore(h, NO_FLAGS, Timeout::IMMEDIATE).is_ok());
            }
            let last = manager.lock_semaphore(h, NO_FLAGS, Timeout::IMMEDIATE);
            prop_assert!(last.unwrap_err().is_timeout());
        }

        #[test]
        fn reset_sets_both_counts(initial in 0u32..8, units in 1u32..8, n in 0u32..32) {
            let manager = Manager::new();
            let h = manager.create_semaphore(initial);
            let _ = manager.lock_semaphore_ex(h, units, NO_FLAGS, Timeout::IMMEDIATE);
            manager.unlock_semaphore_ex(h, units).unwrap();
            manager.reset_semaphore(h, n).unwrap();
            let snap = manager.semaphore_snapshot(h).unwrap();
            prop_assert_eq!(snap.token_count, u64::from(n));
            prop_assert_eq!(snap.logical_count, i64::from(n));
        }
    }
}
