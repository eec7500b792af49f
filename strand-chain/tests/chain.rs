use std::sync::{Arc, Mutex};
use std::time::Duration;
use strand_chain::{
    Bindable, ChainBuilder, ChainConfig, ChainError, Continuable, StageFault, TaskSource,
    TaskStage, ValueSource, completion,
};
use strand_core::error::StageError;
use strand_core::task::ChainState;
use strand_core::test_utils::{RecordingListener, RecordingSink};
use strand_wiring::Wiring;
use tokio::time::{Instant, sleep};

/// Let spawned node work run to quiescence on the current-thread runtime.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

fn failed(state: &ChainState) -> (usize, String, String) {
    let failure = state.failure().expect("run should have failed");
    (failure.stage, failure.node.clone(), failure.error.to_string())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Task family
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test(start_paused = true)]
async fn each_stage_sees_the_resolved_value_of_the_previous_one() {
    let wiring = Wiring::new();
    let received = Arc::new(Mutex::new(Vec::new()));
    let started = Instant::now();

    let source = Arc::new(TaskSource::new(1));
    let sink_received = Arc::clone(&received);
    source
        .bind(&wiring, |x: i32| async move {
            sleep(Duration::from_millis(100)).await;
            Ok(x + 2)
        })
        .unwrap()
        .bind(&wiring, |x: i32| {
            let (completer, completion) = completion();
            tokio::spawn(async move {
                sleep(Duration::from_millis(50)).await;
                completer.resolve(x + 5);
            });
            completion
        })
        .unwrap()
        .into_sink(&wiring, move |x: i32| {
            sink_received.lock().unwrap().push((x, started.elapsed()));
        })
        .unwrap();

    let handle = source.run().unwrap();
    assert!(received.lock().unwrap().is_empty());

    let state = handle.finished().await;
    assert!(state.is_completed());
    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, 8);
    assert!(received[0].1 >= Duration::from_millis(150));
}

#[tokio::test]
async fn failing_stage_halts_the_chain() {
    let wiring = Wiring::new();
    let invoked = Arc::new(Mutex::new(0));
    let source = Arc::new(TaskSource::new(1));
    let counter = Arc::clone(&invoked);
    source
        .bind(&wiring, |_x: i32| async move {
            Err::<i32, _>(StageError::failed("division by zero"))
        })
        .unwrap()
        .bind(&wiring, |x: i32| async move { Ok(x * 100) })
        .unwrap()
        .into_sink(&wiring, move |_x: i32| *counter.lock().unwrap() += 1)
        .unwrap();

    let state = source.run().unwrap().finished().await;

    let (stage, _node, error) = failed(&state);
    assert_eq!(stage, 1);
    assert!(error.contains("division by zero"));
    settle().await;
    assert_eq!(*invoked.lock().unwrap(), 0);
}

#[tokio::test]
async fn panicking_stage_fails_the_run() {
    let wiring = Wiring::new();
    let source = Arc::new(TaskSource::new(1));
    let sink = Arc::new(RecordingSink::<i32>::new());
    let stage = source
        .bind(&wiring, |x: i32| async move {
            if x > 0 {
                panic!("stage exploded");
            }
            Ok(x)
        })
        .unwrap();
    wiring.wire_in(&stage, &sink).unwrap();

    let state = source.run().unwrap().finished().await;

    let (stage, _node, error) = failed(&state);
    assert_eq!(stage, 1);
    assert!(error.contains("stage exploded"));
    assert!(sink.values().is_empty());
    assert_eq!(sink.failures().len(), 1);
}

#[tokio::test]
async fn unguarded_panic_stalls_the_run() {
    let invoked = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&invoked);
    let chain = ChainBuilder::with_config(1, ChainConfig::default().with_catch_panics(false))
        .then(|x: i32| async move {
            if x > 0 {
                panic!("unguarded");
            }
            Ok(x)
        })
        .unwrap()
        .finish(move |_x: i32| *flag.lock().unwrap() = true)
        .unwrap();

    let state = chain.run().unwrap().finished().await;

    assert!(matches!(state, ChainState::Running { stage: 1, .. }));
    assert!(!*invoked.lock().unwrap());
}

#[tokio::test]
async fn panicking_sink_fails_the_run_at_its_stage() {
    let wiring = Wiring::new();
    let source = Arc::new(TaskSource::new(1));
    source
        .into_sink(&wiring, |_x: i32| panic!("sink exploded"))
        .unwrap();

    let state = source.run().unwrap().finished().await;

    let failure = state.failure().expect("run should have failed");
    assert_eq!(failure.stage, 1);
    assert!(failure.node.starts_with("TaskSink<i32>"));
    assert!(matches!(failure.error.as_ref(), StageError::Panicked(m) if m == "sink exploded"));
}

#[tokio::test]
async fn unwired_stage_reports_disconnected() {
    let wiring = Wiring::new();
    let source = Arc::new(TaskSource::new(1));
    let stage = Arc::new(TaskStage::new(|x: i32| async move { Ok(x + 1) }).named("dangling"));
    wiring.wire_in(&source, &stage).unwrap();

    let state = source.run().unwrap().finished().await;

    let (stage, node, error) = failed(&state);
    assert_eq!(stage, 1);
    assert!(node.contains("dangling"));
    assert_eq!(error, StageError::Disconnected.to_string());
}

#[tokio::test]
async fn unwired_source_refuses_to_run() {
    let source = TaskSource::new(1).named("lonely");
    assert!(matches!(source.run(), Err(ChainError::Disconnected { node }) if node.contains("lonely")));
}

#[test]
fn run_outside_runtime_has_no_dispatcher() {
    let wiring = Wiring::new();
    let source = Arc::new(TaskSource::new(1));
    source.into_sink(&wiring, |_x: i32| {}).unwrap();
    assert!(matches!(source.run(), Err(ChainError::NoDispatcher)));
}

#[tokio::test]
async fn abandoned_completion_fails_the_run() {
    let wiring = Wiring::new();
    let source = Arc::new(TaskSource::new(1));
    source
        .bind(&wiring, |_x: i32| {
            let (completer, completion) = completion::<i32>();
            drop(completer);
            completion
        })
        .unwrap()
        .into_sink(&wiring, |_x: i32| {})
        .unwrap();

    let state = source.run().unwrap().finished().await;
    assert!(matches!(
        state.failure().map(|f| f.error.as_ref()),
        Some(StageError::Abandoned)
    ));
}

#[tokio::test]
async fn runs_are_independent() {
    let wiring = Wiring::new();
    let source = Arc::new(TaskSource::new(3));
    let sink = Arc::new(RecordingSink::<i32>::new());
    let stage = source.bind(&wiring, |x: i32| async move { Ok(x * 2) }).unwrap();
    wiring.wire_in(&stage, &sink).unwrap();

    let first = source.run().unwrap();
    let second = source.run().unwrap();
    assert_ne!(first.run_id(), second.run_id());

    assert!(first.finished().await.is_completed());
    assert!(second.finished().await.is_completed());
    assert_eq!(sink.values(), vec![6, 6]);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Value family
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn value_chain_delivers_transformed_value() {
    let wiring = Wiring::new();
    let received = Arc::new(Mutex::new(Vec::new()));
    let source = Arc::new(ValueSource::new(2));
    let sink_received = Arc::clone(&received);
    source
        .bind(&wiring, |x: i32| async move { Ok(x * 10) })
        .unwrap()
        .bind(&wiring, |x: i32| async move { Ok(format!("value {x}")) })
        .unwrap()
        .into_action(&wiring, move |s: String| sink_received.lock().unwrap().push(s))
        .unwrap();

    source.run().unwrap();
    settle().await;

    assert_eq!(*received.lock().unwrap(), vec!["value 20".to_owned()]);
}

#[tokio::test]
async fn value_stage_failure_goes_to_faults_port() {
    let wiring = Wiring::new();
    let source = Arc::new(ValueSource::new(2));
    let downstream = Arc::new(RecordingSink::<i32>::new());
    let faults = Arc::new(RecordingSink::<StageFault>::new());
    let stage = source
        .bind(&wiring, |_x: i32| async move {
            Err::<i32, _>(StageError::failed("bad input"))
        })
        .unwrap();
    wiring.wire_to(&stage, &downstream).unwrap();
    wiring.wire_to_port(&stage, &faults, "faults").unwrap();

    source.run().unwrap();
    settle().await;

    assert!(downstream.values().is_empty());
    let faults = faults.values();
    assert_eq!(faults.len(), 1);
    assert!(faults[0].to_string().contains("bad input"));
}

#[tokio::test]
async fn unwired_value_source_refuses_to_run() {
    let source = ValueSource::new(1);
    assert!(matches!(source.run(), Err(ChainError::Disconnected { .. })));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Builder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn builder_assembles_and_runs() {
    let listener = Arc::new(RecordingListener::new());
    let wiring = Wiring::new();
    wiring.diagnostics().subscribe(listener.clone());
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink_received = Arc::clone(&received);

    let chain = ChainBuilder::with_config(1, ChainConfig::named("adder"))
        .wiring(wiring)
        .then(|x| async move { Ok(x + 2) })
        .unwrap()
        .then_named("stringify", |x: i32| async move { Ok(x.to_string()) })
        .unwrap()
        .finish(move |s: String| sink_received.lock().unwrap().push(s))
        .unwrap();

    assert_eq!(chain.stages(), 2);
    assert_eq!(listener.events().len(), 3);
    assert!(listener.lines()[0].contains("(\"adder\").next"));

    let state = chain.run().unwrap().finished().await;
    assert!(state.is_completed());
    assert_eq!(*received.lock().unwrap(), vec!["3".to_owned()]);
}

#[test]
fn builder_enforces_stage_limit() {
    let config = ChainConfig::default().with_max_stages(1);
    let builder = ChainBuilder::with_config(1, config)
        .then(|x| async move { Ok(x + 1) })
        .unwrap();
    let result = builder.then(|x| async move { Ok(x + 1) });
    assert!(matches!(result, Err(ChainError::TooManyStages { limit: 1 })));
}

#[tokio::test]
async fn builder_stage_failure_names_the_stage() {
    let chain = ChainBuilder::new(1)
        .then_named("checked", |_x: i32| async move {
            Err::<i32, _>(StageError::failed("rejected"))
        })
        .unwrap()
        .finish(|_x: i32| {})
        .unwrap();

    let state = chain.run().unwrap().finished().await;
    let (stage, node, _error) = failed(&state);
    assert_eq!(stage, 1);
    assert!(node.contains("checked"));
}
