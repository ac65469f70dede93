#[cfg(test)]
mod tests {
    use anyhow::Result;
    use futures::future::join_all;
    use rate_gate::{MultiLimiter, Policy, Synchronized};
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering::SeqCst;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn throttle_same_key() -> Result<()> {
        let limiter = MultiLimiter::new(Policy::Throttle, Duration::from_secs(1000));
        static COUNT: AtomicUsize = AtomicUsize::new(0);

        for _ in 0..10 {
            limiter
                .run("key", || {
                    COUNT.fetch_add(1, SeqCst);
                })
                .await;
        }

        assert_eq!(COUNT.load(SeqCst), 1);
        assert_eq!(limiter.len(), 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn throttle_multi_key_once_each() -> Result<()> {
        let limiter = Arc::new(MultiLimiter::new(
            Policy::Throttle,
            Duration::from_secs(1000),
        ));
        let (max, radix): (u32, u32) = (1000, 100);
        static COUNT: AtomicUsize = AtomicUsize::new(0);

        let futs = (0..max).map(|x| {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter
                    .run(x % radix, || {
                        COUNT.fetch_add(1, SeqCst);
                    })
                    .await;
            })
        });

        for result in join_all(futs).await {
            result?;
        }

        assert_eq!(COUNT.load(SeqCst), radix as usize);
        assert_eq!(limiter.len(), radix as usize);
        Ok(())
    }

    #[tokio::test]
    async fn throttle_reset_single_key() -> Result<()> {
        let limiter = MultiLimiter::new(Policy::Throttle, Duration::from_secs(1000));
        let hits = Arc::new(Synchronized::new(Vec::new()));

        for key in ["a", "b", "a", "b"] {
            let hits = hits.clone();
            limiter
                .run(key, move || hits.with_lock(|hits| hits.push(key)))
                .await;
        }
        limiter.reset(&"a");
        limiter.reset(&"missing");
        for key in ["a", "b"] {
            let hits = hits.clone();
            limiter
                .run(key, move || hits.with_lock(|hits| hits.push(key)))
                .await;
        }

        assert_eq!(hits.with_lock(|hits| hits.clone()), ["a", "b", "a"]);
        Ok(())
    }

    #[tokio::test]
    async fn throttle_reset_all() -> Result<()> {
        let limiter = MultiLimiter::new(Policy::Throttle, Duration::from_secs(1000));
        static COUNT: AtomicUsize = AtomicUsize::new(0);
        assert!(limiter.is_empty());

        for _ in 0..2 {
            for key in 0..5 {
                limiter
                    .run(key, || {
                        COUNT.fetch_add(1, SeqCst);
                    })
                    .await;
            }
            limiter.reset_all();
        }

        assert_eq!(COUNT.load(SeqCst), 10);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_keys_independently() -> Result<()> {
        let limiter = MultiLimiter::new(Policy::Debounce, Duration::from_millis(100));
        let saves = Arc::new(Synchronized::new(Vec::new()));

        for (doc, version) in [("x", 1), ("y", 1), ("x", 2), ("y", 2), ("x", 3)] {
            let saves = saves.clone();
            limiter
                .run(doc, move || saves.with_lock(|saves| saves.push((doc, version))))
                .await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;

        let mut saves = saves.with_lock(|saves| saves.clone());
        saves.sort_unstable();
        assert_eq!(saves, [("x", 3), ("y", 2)]);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn throttle_keeps_submission_order_while_keys_are_inserted() -> Result<()> {
        let limiter = Arc::new(MultiLimiter::new(
            Policy::Throttle,
            Duration::from_secs(1000),
        ));
        let hits = Arc::new(Synchronized::new(Vec::new()));

        let churn = (0..4).map(|worker| {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                for key in 0..2_000u32 {
                    limiter.run(10_000 + worker * 2_000 + key, || {}).await;
                }
            })
        });
        let churn = tokio::spawn(join_all(churn));

        for key in 0..200u32 {
            let (first, second) = (hits.clone(), hits.clone());
            futures::join!(
                limiter.run(key, move || first.with_lock(|hits| hits.push((key, "first")))),
                limiter.run(key, move || second.with_lock(|hits| hits.push((key, "second")))),
            );
        }

        for result in churn.await? {
            result?;
        }

        let hits = hits.with_lock(|hits| hits.clone());
        assert_eq!(hits.len(), 200);
        assert!(hits.iter().all(|(_, which)| *which == "first"));
        Ok(())
    }

    #[tokio::test]
    async fn remove_forgets_key() -> Result<()> {
        let limiter = MultiLimiter::new(Policy::Throttle, Duration::from_secs(1000));
        static COUNT: AtomicUsize = AtomicUsize::new(0);

        for _ in 0..2 {
            limiter
                .run("doc", || {
                    COUNT.fetch_add(1, SeqCst);
                })
                .await;
        }
        assert_eq!(COUNT.load(SeqCst), 1);

        assert!(limiter.remove(&"doc"));
        assert!(!limiter.remove(&"doc"));
        assert!(limiter.is_empty());

        limiter
            .run("doc", || {
                COUNT.fetch_add(1, SeqCst);
            })
            .await;
        assert_eq!(COUNT.load(SeqCst), 2);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn remove_cancels_pending_debounce() -> Result<()> {
        let limiter = MultiLimiter::new(Policy::Debounce, Duration::from_millis(100));
        let saves = Arc::new(Synchronized::new(Vec::new()));

        for doc in ["x", "y"] {
            let saves = saves.clone();
            limiter
                .run(doc, move || saves.with_lock(|saves| saves.push(doc)))
                .await;
        }
        assert!(limiter.remove(&"x"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(saves.with_lock(|saves| saves.clone()), ["y"]);
        assert_eq!(limiter.len(), 1);
        Ok(())
    }
}
