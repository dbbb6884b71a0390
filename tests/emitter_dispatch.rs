use spark_emitter::{Callback, Emitter, EmitterCapable, Observable, Value, cloned};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn counter() -> (Rc<Cell<usize>>, Callback) {
    let count = Rc::new(Cell::new(0));
    let callback = Callback::new(cloned!(count => move |_, _| count.set(count.get() + 1)));
    (count, callback)
}

fn tagged(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Callback {
    Callback::new(cloned!(log => move |_, _| log.borrow_mut().push(tag)))
}

// =============================================================================
// DISPATCH
// =============================================================================

#[test]
fn fire_passes_event_then_args() {
    let e1 = Emitter::new();
    let calls: Rc<RefCell<Vec<(String, Vec<Value>)>>> = Rc::new(RefCell::new(Vec::new()));
    e1.on(
        "x",
        Callback::new(cloned!(calls => move |event, args| {
            calls.borrow_mut().push((event.name().to_string(), args.to_vec()));
        })),
    );

    e1.fire("x", &[Value::from(1), Value::from("a")]);

    assert_eq!(
        *calls.borrow(),
        vec![("x".to_string(), vec![Value::from(1), Value::from("a")])]
    );
}

#[test]
fn callbacks_run_in_registration_order() {
    let emitter = Emitter::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    emitter.on("x", tagged(&log, "c1"));
    emitter.on("x", tagged(&log, "c2"));
    emitter.on("x", tagged(&log, "c3"));

    emitter.fire("x", &[]);
    assert_eq!(*log.borrow(), vec!["c1", "c2", "c3"]);
}

#[test]
fn stop_halts_remaining_callbacks_once() {
    let emitter = Emitter::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    emitter.on("x", tagged(&log, "c1"));
    emitter.on(
        "x",
        Callback::new(cloned!(log => move |event, _| {
            log.borrow_mut().push("c2");
            event.stop();
        })),
    );
    emitter.on("x", tagged(&log, "c3"));

    emitter.fire("x", &[]);
    assert_eq!(*log.borrow(), vec!["c1", "c2"]);

    // The event stays live: the next fire stops at c2 again
    emitter.fire("x", &[]);
    assert_eq!(*log.borrow(), vec!["c1", "c2", "c1", "c2"]);
    assert_eq!(emitter.listener_count("x"), 3);
}

#[test]
fn off_signal_runs_once_then_never() {
    let emitter = Emitter::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    emitter.on(
        "x",
        Callback::new(cloned!(log => move |event, _| {
            log.borrow_mut().push("once");
            event.off();
        })),
    );
    emitter.on("x", tagged(&log, "always"));

    emitter.fire("x", &[]);
    emitter.fire("x", &[]);
    assert_eq!(*log.borrow(), vec!["once", "always", "always"]);
}

#[test]
fn unobserved_event_is_fine() {
    let emitter = Emitter::new();
    let (count, callback) = counter();
    emitter.on("y", callback);

    emitter.fire("x", &[Value::Null]);
    assert_eq!(count.get(), 0);
}

// =============================================================================
// CROSS-OBJECT SUBSCRIPTIONS
// =============================================================================

#[test]
fn stop_listening_to_event_on_remote() {
    let a = Emitter::new();
    let b = Emitter::new();
    let (count, spy) = counter();

    a.listen_to(&b, "x", spy);
    b.fire("x", &[]);
    assert_eq!(count.get(), 1);

    a.stop_listening_event(&b, "x");
    b.fire("x", &[]);
    assert_eq!(count.get(), 1);
}

#[test]
fn stop_listening_event_leaves_other_events() {
    let a = Emitter::new();
    let b = Emitter::new();
    let (x_count, x_spy) = counter();
    let (y_count, y_spy) = counter();

    a.listen_to(&b, "x", x_spy.clone());
    a.listen_to(&b, "x", y_spy.clone());
    a.listen_to(&b, "y", y_spy);

    a.stop_listening_event(&b, "x");
    b.fire("x", &[]);
    b.fire("y", &[]);

    assert_eq!(x_count.get(), 0);
    assert_eq!(y_count.get(), 1);
    assert_eq!(a.subscription_count(&b), 1);
}

#[test]
fn stop_listening_to_one_remote_only() {
    let listener = Emitter::new();
    let b = Emitter::new();
    let c = Emitter::new();
    let (count, spy) = counter();

    listener.listen_to(&b, "x", spy.clone());
    listener.listen_to(&b, "y", spy.clone());
    listener.listen_to(&c, "x", spy);

    listener.stop_listening_to(&b);
    b.fire("x", &[]);
    b.fire("y", &[]);
    c.fire("x", &[]);

    assert_eq!(count.get(), 1);
    assert!(!b.has_listeners("x"));
    assert!(!b.has_listeners("y"));
    assert_eq!(listener.subscription_count(&b), 0);
    assert_eq!(listener.subscription_count(&c), 1);
}

#[test]
fn stop_listening_all_clears_everything() {
    let listener = Emitter::new();
    let b = Emitter::new();
    let c = Emitter::new();
    let (count, spy) = counter();

    listener.on("self", spy.clone());
    listener.listen_to(&b, "x", spy.clone());
    listener.listen_to(&c, "y", spy);

    listener.stop_listening_all();
    listener.fire("self", &[]);
    b.fire("x", &[]);
    c.fire("y", &[]);

    assert_eq!(count.get(), 0);
    assert_eq!(listener.subscription_count(&listener), 0);
}

#[test]
fn stop_listening_leaves_other_listeners_alone() {
    let a = Emitter::new();
    let other = Emitter::new();
    let remote = Emitter::new();
    let (count, spy) = counter();

    a.listen_to(&remote, "x", spy.clone());
    other.listen_to(&remote, "x", spy.clone());

    a.stop_listening(&remote, "x", &spy);
    remote.fire("x", &[]);
    assert_eq!(count.get(), 1);
    assert_eq!(other.subscription_count(&remote), 1);
}

#[test]
fn removal_of_unknown_things_is_noop() {
    let a = Emitter::new();
    let b = Emitter::new();
    let (_, spy) = counter();

    a.stop_listening(&b, "x", &spy);
    a.stop_listening_event(&b, "x");
    a.stop_listening_to(&b);
    a.stop_listening_all();
    a.off("x", &spy);

    a.listen_to(&b, "x", spy.clone());
    a.stop_listening(&b, "y", &spy);
    a.stop_listening_event(&b, "y");
    assert_eq!(b.listener_count("x"), 1);
}

// =============================================================================
// REPEATED REGISTRATION
// =============================================================================

#[test]
fn repeated_registration_is_not_deduplicated() {
    let a = Emitter::new();
    let b = Emitter::new();
    let (count, spy) = counter();

    a.listen_to(&b, "x", spy.clone());
    a.listen_to(&b, "x", spy.clone());
    b.fire("x", &[]);
    assert_eq!(count.get(), 2);
}

#[test]
fn stop_listening_removes_one_occurrence_per_call() {
    let a = Emitter::new();
    let b = Emitter::new();
    let (count, spy) = counter();

    a.listen_to(&b, "x", spy.clone());
    a.listen_to(&b, "x", spy.clone());
    a.listen_to(&b, "x", spy.clone());

    a.stop_listening(&b, "x", &spy);
    b.fire("x", &[]);
    assert_eq!(count.get(), 2);
    assert_eq!(b.listener_count("x"), 2);

    a.stop_listening(&b, "x", &spy);
    a.stop_listening(&b, "x", &spy);
    b.fire("x", &[]);
    assert_eq!(count.get(), 2);
    assert_eq!(a.subscription_count(&b), 0);
}

#[test]
fn stop_listening_event_removes_every_occurrence() {
    let a = Emitter::new();
    let b = Emitter::new();
    let (count, spy) = counter();

    a.listen_to(&b, "x", spy.clone());
    a.listen_to(&b, "x", spy);
    a.stop_listening_event(&b, "x");

    b.fire("x", &[]);
    assert_eq!(count.get(), 0);
}

// =============================================================================
// CAPABILITY COMPOSITION
// =============================================================================

struct Player {
    events: Emitter,
    name: String,
}

impl EmitterCapable for Player {
    fn emitter(&self) -> &Emitter {
        &self.events
    }
}

#[test]
fn host_type_acquires_emitter_surface() {
    let player = Player {
        events: Emitter::new(),
        name: "ada".to_string(),
    };
    let score = Observable::new();
    let (count, spy) = counter();

    player.listen_to(&score, "change:points", spy);
    player.on(
        "joined",
        Callback::new(|event, args| {
            assert_eq!(event.name(), "joined");
            assert_eq!(args, [Value::from("ada")]);
        }),
    );

    score.set("points", 10);
    player.fire("joined", &[Value::from(player.name.as_str())]);
    assert_eq!(count.get(), 1);

    player.stop_listening_to(&score);
    score.set("points", 20);
    assert_eq!(count.get(), 1);
}

#[test]
fn observable_listens_to_plain_emitter() {
    let bus = Emitter::new();
    let state = Observable::new();

    state.listen_to(
        &bus,
        "rename",
        Callback::new(cloned!(state => move |_, args| {
            state.set("name", args[0].clone());
        })),
    );

    bus.fire("rename", &[Value::from("grace")]);
    assert_eq!(state.get("name"), Value::from("grace"));
}
