use proptest::prelude::*;
use spark_emitter::{Callback, Emitter, EmitterCapable, Observable, Target, Value, cloned};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..5).prop_map(Value::Int),
        "[a-c]{0,2}".prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn fire_visits_callbacks_in_order_with_same_args(
        listeners in 1usize..12,
        args in proptest::collection::vec(value_strategy(), 0..4),
    ) {
        let emitter = Emitter::new();
        let log: Rc<RefCell<Vec<(usize, Vec<Value>)>>> = Rc::new(RefCell::new(Vec::new()));
        for index in 0..listeners {
            emitter.on("evt", Callback::new(cloned!(log => move |_, received| {
                log.borrow_mut().push((index, received.to_vec()));
            })));
        }

        emitter.fire("evt", &args);

        let log = log.borrow();
        prop_assert_eq!(log.len(), listeners);
        for (position, (index, received)) in log.iter().enumerate() {
            prop_assert_eq!(*index, position);
            prop_assert_eq!(received, &args);
        }
    }

    #[test]
    fn change_count_matches_distinct_consecutive_writes(
        writes in proptest::collection::vec(value_strategy(), 0..20),
    ) {
        let obs = Observable::new();
        let fired = Rc::new(Cell::new(0usize));
        obs.on("change:p", Callback::new(cloned!(fired => move |_, _| fired.set(fired.get() + 1))));

        let mut current = Value::Undefined;
        let mut expected = 0usize;
        for value in writes {
            if value != current {
                expected += 1;
                current = value.clone();
            }
            obs.set("p", value);
        }

        prop_assert_eq!(fired.get(), expected);
        prop_assert_eq!(obs.get("p"), current);
    }

    #[test]
    fn unbinding_every_target_releases_every_listener(
        plan in proptest::collection::vec(proptest::collection::vec((0usize..3, 0usize..3), 1..4), 1..6),
    ) {
        let view = Observable::new();
        let sources: Vec<Observable> = (0..3).map(|_| Observable::new()).collect();
        let names = ["a", "b", "c"];

        let mut targets = Vec::new();
        for pairs in &plan {
            let target = Target::new(|_| {});
            let declared: Vec<(&Observable, &str)> = pairs
                .iter()
                .map(|&(source, name)| (&sources[source], names[name]))
                .collect();
            view.bind(&target).unwrap().to_pairs(&declared).unwrap();
            targets.push(target);
        }

        for source in &sources {
            for name in names {
                let key = format!("change:{name}");
                prop_assert!(source.listener_count(&key) <= 1);
            }
        }

        for target in &targets {
            view.unbind(target);
        }

        prop_assert_eq!(view.binding_count(), 0);
        prop_assert_eq!(view.listened_pair_count(), 0);
        for source in &sources {
            prop_assert_eq!(view.subscription_count(source), 0);
            for name in names {
                let key = format!("change:{name}");
                prop_assert!(!source.has_listeners(&key));
            }
        }
    }
}
