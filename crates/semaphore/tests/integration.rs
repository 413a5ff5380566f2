//! Integration tests for the semaphore table

#[cfg(test)]
mod tests {
    use ksync_errors::SemaphoreError;
    use ksync_semaphore::*;
    use ksync_types::Timeout;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_delete_abandons_blocked_acquirer() {
        let table = Arc::new(SemaphoreTable::new());
        let h = table.create(0);
        let sem = table.get(h).unwrap();

        let waiter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.lock_units(1, Timeout::from_secs(10)))
        };
        while sem.snapshot().waiters == 0 {
            thread::sleep(Duration::from_millis(1));
        }

        table.delete(h).unwrap();
        let result = waiter.join().unwrap();
        assert!(matches!(result, Err(SemaphoreError::Abandoned { .. })));
        assert_eq!(sem.logical_count(), 0);
    }

    #[test]
    fn test_delete_without_abandon_leaves_waiter_to_time_out() {
        let table = SemaphoreTable::new().with_abandon_on_delete(false);
        let h = table.create(0);
        let sem = table.get(h).unwrap();

        let waiter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.lock_units(1, Timeout::from_millis(50)))
        };
        while sem.snapshot().waiters == 0 {
            thread::sleep(Duration::from_millis(1));
        }

        table.delete(h).unwrap();
        let result = waiter.join().unwrap();
        assert!(matches!(result, Err(SemaphoreError::TimeoutExpired { .. })));
    }

    #[test]
    fn test_blocked_acquire_does_not_stall_table() {
        let table = Arc::new(SemaphoreTable::new());
        let h = table.create(0);
        let sem = table.get(h).unwrap();

        let waiter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.lock_units(1, Timeout::from_secs(10)))
        };
        while sem.snapshot().waiters == 0 {
            thread::sleep(Duration::from_millis(1));
        }

        // Table mutations proceed while a thread is parked on a token
        let other = table.create(3);
        table.delete(other).unwrap();

        sem.unlock_units(1).unwrap();
        assert_eq!(waiter.join().unwrap(), Ok(0));
    }

    #[test]
    fn test_concurrent_create_yields_unique_handles() {
        let table = Arc::new(SemaphoreTable::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || (0..50).map(|_| table.create(1)).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<_> = workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 400);
        assert_eq!(table.len(), 400);
    }

    #[test]
    fn test_paired_lock_unlock_across_threads() {
        let table = Arc::new(SemaphoreTable::new());
        let h = table.create(2);

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let sem = table.get(h).unwrap();
                thread::spawn(move || {
                    for _ in 0..200 {
                        sem.lock_units(1, Timeout::Infinite).unwrap();
                        sem.unlock_units(1).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        let snap = table.get(h).unwrap().snapshot();
        assert_eq!(snap.logical_count, 2);
        assert_eq!(snap.token_count, 2);
        assert_eq!(snap.waiters, 0);
    }

    #[test]
    fn test_reset_racing_sleep_never_inflates_tokens() {
        let sem = Arc::new(Semaphore::new(ksync_types::SemHandle::FIRST, 1));

        let sleepers: Vec<_> = (0..2)
            .map(|_| {
                let sem = Arc::clone(&sem);
                thread::spawn(move || {
                    let mut max_tokens = 0;
                    for _ in 0..2000 {
                        let _ = sem.sleep(Timeout::IMMEDIATE);
                        max_tokens = max_tokens.max(sem.token_count());
                    }
                    max_tokens
                })
            })
            .collect();
        let resetter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || {
                for _ in 0..2000 {
                    sem.reset(1);
                }
            })
        };

        resetter.join().unwrap();
        for sleeper in sleepers {
            assert!(sleeper.join().unwrap() <= 1);
        }
        let snap = sem.snapshot();
        assert_eq!(snap.token_count, 1);
        assert_eq!(snap.logical_count, 1);
    }

    #[test]
    fn test_reset_racing_lock_pairs_keeps_counts_together() {
        let sem = Arc::new(Semaphore::new(ksync_types::SemHandle::FIRST, 1));

        let lockers: Vec<_> = (0..3)
            .map(|_| {
                let sem = Arc::clone(&sem);
                thread::spawn(move || {
                    for _ in 0..2000 {
                        // Only a lock that counted gets its unlock
                        if sem.lock_units(1, Timeout::IMMEDIATE).is_ok() {
                            sem.unlock_units(1).unwrap();
                        }
                    }
                })
            })
            .collect();
        let resetter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || {
                for _ in 0..2000 {
                    sem.reset(1);
                }
            })
        };

        resetter.join().unwrap();
        for locker in lockers {
            locker.join().unwrap();
        }
        let snap = sem.snapshot();
        assert_eq!(i64::try_from(snap.token_count).unwrap(), snap.logical_count);
    }

    proptest! {
        #[test]
        fn initial_count_bounds_immediate_acquires(k in 0u32..32) {
            let table = SemaphoreTable::new();
            let sem = table.get(table.create(k)).unwrap();
            for _ in 0..k {
                prop_assert!(sem.lock_units(1, Timeout::IMMEDIATE).is_ok());
            }
            let next = sem.lock_units(1, Timeout::IMMEDIATE);
            let timed_out = matches!(next, Err(SemaphoreError::TimeoutExpired { .. }));
            prop_assert!(timed_out);
            prop_assert_eq!(sem.token_count(), 0);
        }

        #[test]
        fn reset_overrides_any_history(initial in 0u32..8, locks in 0u32..8, n in 0u32..16) {
            let sem = Semaphore::new(ksync_types::SemHandle::FIRST, initial);
            for _ in 0..locks {
                let _ = sem.lock_units(2, Timeout::IMMEDIATE);
            }
            sem.reset(n);
            prop_assert_eq!(sem.token_count(), u64::from(n));
            prop_assert_eq!(sem.logical_count(), i64::from(n));
        }
    }
}
