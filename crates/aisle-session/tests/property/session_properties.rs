use std::collections::HashSet;
use std::sync::Arc;

use aisle_core::config::SessionConfig;
use aisle_core::models::SessionExtra;
use aisle_session::{InMemorySessionStore, PaginationSessionManager};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The delivered set is the union of every page and never shrinks.
    #[test]
    fn delivered_ids_only_grow(
        batches in proptest::collection::vec(
            proptest::collection::vec("[a-f][0-9]", 0..6),
            1..8,
        )
    ) {
        let rt = runtime();
        rt.block_on(async {
            let m = PaginationSessionManager::new(
                Arc::new(InMemorySessionStore::new()),
                SessionConfig::default(),
            );
            let s = m.create_session(Vec::new(), 1, SessionExtra::default()).await.unwrap();

            let mut expected = HashSet::new();
            let mut previous = 0;
            for (i, batch) in batches.iter().enumerate() {
                let fresh: Vec<String> =
                    batch.iter().filter(|id| !expected.contains(*id)).cloned().collect();
                expected.extend(fresh.iter().cloned());
                let state = m
                    .append_delivered(&s.session_id, &fresh, i as u32 + 1)
                    .await
                    .unwrap();
                prop_assert!(state.delivered_ids.len() >= previous);
                previous = state.delivered_ids.len();
            }
            let state = m.get(&s.session_id).await.unwrap();
            prop_assert_eq!(state.delivered_ids, expected);
            Ok(())
        })?;
    }

    /// Every batch number up to the limit is accepted; the next is not.
    #[test]
    fn depth_limit_is_exact(max_depth in 1u32..12) {
        let rt = runtime();
        rt.block_on(async {
            let config = SessionConfig { max_depth, ..Default::default() };
            let m = PaginationSessionManager::new(Arc::new(InMemorySessionStore::new()), config);
            let s = m.create_session(Vec::new(), 1, SessionExtra::default()).await.unwrap();
            for read in 1..max_depth {
                prop_assert!(m.append_delivered(&s.session_id, &[], read).await.is_ok());
            }
            prop_assert!(m.append_delivered(&s.session_id, &[], max_depth).await.is_err());
            Ok(())
        })?;
    }
}
