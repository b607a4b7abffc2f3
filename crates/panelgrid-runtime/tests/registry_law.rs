//! Property tests for attach-once subscriptions and reflow bookkeeping.

use panelgrid_runtime::{EventKind, ListenerRegistry, ListenerTarget, ReflowScheduler};
use proptest::prelude::*;

fn target() -> impl Strategy<Value = ListenerTarget> {
    prop_oneof![Just(ListenerTarget::Container), Just(ListenerTarget::Window)]
}

fn kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::PointerDown),
        Just(EventKind::PointerMove),
        Just(EventKind::PointerUp),
        Just(EventKind::PointerCancel),
        Just(EventKind::StorageChange),
    ]
}

#[derive(Debug, Clone, Copy)]
enum Tick {
    Frame,
    Timer,
    Mounted,
}

fn tick() -> impl Strategy<Value = Tick> {
    prop_oneof![Just(Tick::Frame), Just(Tick::Timer), Just(Tick::Mounted)]
}

proptest! {
    #[test]
    fn count_equals_distinct_target_key_pairs(
        attaches in prop::collection::vec((target(), kind(), 0u8..6), 0..40)
    ) {
        let mut registry = ListenerRegistry::new();
        let mut distinct = std::collections::BTreeSet::new();
        for (target, kind, key) in &attaches {
            let key = format!("route:{key}");
            let added = registry.attach_once(*target, *kind, (), &key);
            prop_assert_eq!(added, distinct.insert((*target, key)));
        }
        prop_assert_eq!(registry.listener_count(), distinct.len());
    }

    #[test]
    fn each_pass_fires_each_phase_at_most_once(
        passes in 1usize..4,
        ticks in prop::collection::vec(tick(), 0..24)
    ) {
        let mut scheduler = ReflowScheduler::new();
        let handles: Vec<_> = (0..passes).map(|i| scheduler.schedule(format!("pass {i}"))).collect();
        let mut frames = vec![0u32; passes];
        let mut timers = vec![0u32; passes];
        let mut mounts = vec![0u32; passes];
        for tick in ticks {
            let (fired, counts) = match tick {
                Tick::Frame => (scheduler.on_animation_frame(), &mut frames),
                Tick::Timer => (scheduler.on_timer(), &mut timers),
                Tick::Mounted => (scheduler.on_content_mounted(), &mut mounts),
            };
            for handle in fired {
                let slot = handles.iter().position(|h| *h == handle);
                prop_assert!(slot.is_some());
                if let Some(slot) = slot {
                    counts[slot] += 1;
                }
            }
        }
        for slot in 0..passes {
            prop_assert!(frames[slot] <= 1);
            prop_assert!(timers[slot] <= 1);
            prop_assert!(mounts[slot] <= 1);
        }
    }
}
