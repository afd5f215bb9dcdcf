// GroupedMetadataStore property tests.
//
// Property 1: model equivalence.
//  - Model: BTreeMap<(group, key), value> plus a signal counter.
//  - Operations: add, set, remove, clear, clone-and-mutate-clone.
//  - Invariants after every step:
//      len() == model.len();
//      len() == Σ count_keys(g) over group_names();
//      every group present in the store is non-empty;
//      contains_key/try_get agree with the model for the touched pair;
//      the signal fired exactly when the model changed.
//
// Property 2: snapshots reproduce the model exactly.
use grouped_metadata::{GroupedMetadataStore, StoreError};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn names(g: usize, k: usize) -> (String, String) {
    (format!("g{}", g), format!("k{}", k))
}

proptest! {
    #[test]
    fn prop_store_matches_model(
        groups in 1usize..=4,
        keys in 1usize..=4,
        ops in proptest::collection::vec((0u8..=4u8, 0usize..16, 0usize..16, 0i32..8), 1..120)
    ) {
        let s: GroupedMetadataStore<i32> = GroupedMetadataStore::new();
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let f = fired.clone();
            s.subscribe(move || { f.fetch_add(1, Ordering::SeqCst); });
        }
        let mut model: BTreeMap<(String, String), i32> = BTreeMap::new();
        let mut expected_fires = 0usize;

        for (op, rg, rk, v) in ops {
            let (g, k) = names(rg % groups, rk % keys);
            match op {
                // Add: succeeds only on a fresh pair.
                0 => {
                    let res = s.add(&g, &k, v);
                    if model.contains_key(&(g.clone(), k.clone())) {
                        let is_dup = matches!(res, Err(StoreError::DuplicateKey { .. }));
                        prop_assert!(is_dup);
                    } else {
                        prop_assert!(res.is_ok());
                        model.insert((g.clone(), k.clone()), v);
                        expected_fires += 1;
                    }
                }
                // Set: always succeeds and always fires.
                1 => {
                    prop_assert!(s.set(&g, &k, v).is_ok());
                    model.insert((g.clone(), k.clone()), v);
                    expected_fires += 1;
                }
                // Remove: fires only on a hit.
                2 => {
                    let hit = model.remove(&(g.clone(), k.clone())).is_some();
                    prop_assert_eq!(s.remove(&g, &k), Ok(hit));
                    if hit { expected_fires += 1; }
                }
                // Clear: fires only if non-empty.
                3 => {
                    if !model.is_empty() { expected_fires += 1; }
                    model.clear();
                    s.clear();
                }
                // Clone and mutate the copy: source must not change.
                4 => {
                    let c = s.clone();
                    c.clear();
                    let _ = c.set(&g, &k, v + 100);
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(s.len(), model.len());
            let names = s.group_names();
            let mut total = 0;
            for name in &names {
                let n = s.count_keys(name).unwrap();
                prop_assert!(n >= 1);
                total += n;
            }
            prop_assert_eq!(total, s.len());
            let model_groups: BTreeSet<&String> = model.keys().map(|(g, _)| g).collect();
            prop_assert_eq!(names.len(), model_groups.len());

            let want = model.get(&(g.clone(), k.clone())).copied();
            prop_assert_eq!(s.try_get(&g, &k), want);
            prop_assert_eq!(s.contains_key(&g, &k), want.is_some());
            prop_assert_eq!(fired.load(Ordering::SeqCst), expected_fires);
        }
    }
}

proptest! {
    #[test]
    fn prop_snapshot_equals_contents(
        pairs in proptest::collection::vec((0usize..6, 0usize..6, any::<i32>()), 0..40)
    ) {
        let s = GroupedMetadataStore::new();
        let mut model = BTreeMap::new();
        for (g, k, v) in pairs {
            let (g, k) = names(g, k);
            s.set(&g, &k, v).unwrap();
            model.insert((g, k), v);
        }

        let snap: BTreeMap<(String, String), i32> = s
            .snapshot()
            .map(|e| {
                let (g, k, v) = e.into_parts();
                ((g, k), v)
            })
            .collect();
        prop_assert_eq!(&snap, &model);

        for g in s.group_names() {
            let from_group: BTreeMap<String, i32> = s
                .group(&g)
                .unwrap()
                .map(|e| (e.key().to_string(), *e.value()))
                .collect();
            let from_model: BTreeMap<String, i32> = model
                .iter()
                .filter(|((mg, _), _)| *mg == g)
                .map(|((_, k), v)| (k.clone(), *v))
                .collect();
            prop_assert_eq!(from_group, from_model);
        }
    }
}
