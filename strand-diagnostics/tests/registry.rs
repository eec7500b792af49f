use std::sync::{Arc, Mutex};
use strand_core::component::ComponentLabel;
use strand_core::event::{WiringEvent, WiringListener};
use strand_core::port::Cardinality;
use strand_core::test_utils::RecordingListener;
use strand_diagnostics::{Diagnostics, TracingListener};

fn event(port: &str) -> WiringEvent {
    WiringEvent {
        owner: ComponentLabel::new("app::Owner", Some("left")),
        port: port.to_owned(),
        cardinality: Cardinality::Single,
        partner: ComponentLabel::new("app::Partner", None),
        capability: "dyn Dataflow<i32>".to_owned(),
    }
}

// --- Empty registry ---

#[test]
fn empty_registry_drops_events() {
    let diagnostics = Diagnostics::new();
    assert!(diagnostics.is_empty());
    diagnostics.emit(&event("next"));
}

// --- Single listener ---

#[test]
fn single_listener_receives_event() {
    let diagnostics = Diagnostics::new();
    let recorder = Arc::new(RecordingListener::new());
    diagnostics.subscribe(recorder.clone());

    diagnostics.emit(&event("next"));

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].port, "next");
    assert_eq!(
        recorder.lines(),
        vec!["wired Owner(\"left\").next -> Partner as dyn Dataflow<i32>"]
    );
}

// --- Ordering ---

struct NamedListener {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl WiringListener for NamedListener {
    fn on_wired(&self, _event: &WiringEvent) {
        self.log.lock().unwrap().push(self.name);
    }
}

#[test]
fn listeners_run_in_subscription_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let diagnostics = Diagnostics::new();
    for name in ["first", "second", "third"] {
        diagnostics.subscribe(Arc::new(NamedListener {
            name,
            log: Arc::clone(&log),
        }));
    }

    diagnostics.emit(&event("next"));

    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}

// --- Detaching ---

#[test]
fn unsubscribe_detaches_only_that_listener() {
    let diagnostics = Diagnostics::new();
    let kept = Arc::new(RecordingListener::new());
    let dropped = Arc::new(RecordingListener::new());
    diagnostics.subscribe(kept.clone());
    let id = diagnostics.subscribe(dropped.clone());

    assert!(diagnostics.unsubscribe(id));
    assert!(!diagnostics.unsubscribe(id));
    diagnostics.emit(&event("next"));

    assert_eq!(kept.events().len(), 1);
    assert!(dropped.events().is_empty());
}

#[test]
fn clear_detaches_everything() {
    let diagnostics = Diagnostics::new();
    let recorder = Arc::new(RecordingListener::new());
    diagnostics.subscribe(recorder.clone());
    diagnostics.subscribe(Arc::new(TracingListener::new()));
    assert_eq!(diagnostics.len(), 2);

    diagnostics.clear();
    diagnostics.emit(&event("next"));

    assert!(diagnostics.is_empty());
    assert!(recorder.events().is_empty());
}

// --- Closures ---

#[test]
fn closures_are_listeners() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let diagnostics = Diagnostics::new();
    let sink = Arc::clone(&seen);
    diagnostics.subscribe_fn(move |event| sink.lock().unwrap().push(event.to_string()));

    diagnostics.emit(&event("faults"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains(".faults ->"));
}

// --- Isolation ---

#[test]
fn panicking_listener_does_not_stop_others() {
    let diagnostics = Diagnostics::new();
    diagnostics.subscribe_fn(|_event| panic!("listener bug"));
    let recorder = Arc::new(RecordingListener::new());
    diagnostics.subscribe(recorder.clone());

    diagnostics.emit(&event("next"));

    assert_eq!(recorder.events().len(), 1);
}

#[test]
fn listener_may_subscribe_during_emit() {
    let diagnostics = Arc::new(Diagnostics::new());
    let late = Arc::new(RecordingListener::new());
    let registry = Arc::clone(&diagnostics);
    let to_add = Arc::clone(&late);
    diagnostics.subscribe_fn(move |_event| {
        registry.subscribe(to_add.clone());
    });

    diagnostics.emit(&event("first"));
    assert!(late.events().is_empty());

    diagnostics.emit(&event("second"));
    assert_eq!(late.events().len(), 1);
    assert_eq!(late.events()[0].port, "second");
}

#[test]
fn tracing_listener_accepts_events_with_subscriber_installed() {
    let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
    tracing::subscriber::with_default(subscriber, || {
        TracingListener::new().on_wired(&event("next"));
    });
}
