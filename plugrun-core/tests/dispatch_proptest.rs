use std::time::Duration;

use plugrun_core::{collect, dispatch, Outcome, WorkItem};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_dispatch_returns_one_handle_per_item_in_order(
        delays in prop::collection::vec(0u64..20, 1..12)
    ) {
        let rt = runtime();
        let ids: Vec<String> = (0..delays.len()).map(|i| format!("item-{}", i)).collect();

        let (handle_ids, verdict) = rt.block_on(async {
            let items: Vec<WorkItem<u64>> = delays
                .iter()
                .enumerate()
                .map(|(i, &delay)| {
                    WorkItem::new(format!("item-{}", i), move || async move {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        Ok(delay)
                    })
                })
                .collect();

            let handles = dispatch(items);
            let handle_ids: Vec<String> = handles.iter().map(|h| h.id().to_string()).collect();
            (handle_ids, collect(handles, Duration::from_secs(10)).await)
        });

        prop_assert_eq!(&handle_ids, &ids);
        prop_assert_eq!(verdict.len(), delays.len());
        prop_assert!(!verdict.has_failures());
        for ((item, id), delay) in verdict.iter().zip(&ids).zip(&delays) {
            prop_assert_eq!(&item.id, id);
            prop_assert_eq!(&item.outcome, &Outcome::Succeeded(*delay));
        }
    }

    #[test]
    fn test_verdict_fails_iff_some_item_fails(
        failures in prop::collection::vec(any::<bool>(), 0..10)
    ) {
        let rt = runtime();
        let verdict = rt.block_on(async {
            let items: Vec<WorkItem<()>> = failures
                .iter()
                .enumerate()
                .map(|(i, &fail)| {
                    WorkItem::new(format!("item-{}", i), move || async move {
                        if fail {
                            Err(plugrun_core::Error::Operation {
                                item: format!("item-{}", i),
                                message: "failed".to_string(),
                            })
                        } else {
                            Ok(())
                        }
                    })
                })
                .collect();
            collect(dispatch(items), Duration::from_secs(10)).await
        });

        prop_assert_eq!(verdict.len(), failures.len());
        prop_assert_eq!(verdict.has_failures(), failures.iter().any(|f| *f));
        prop_assert_eq!(verdict.failure_count(), failures.iter().filter(|f| **f).count());
        for (item, fail) in verdict.iter().zip(&failures) {
            prop_assert_eq!(item.outcome.is_success(), !*fail);
        }
    }
}
