use std::sync::{Arc, Mutex};
use std::time::Duration;

use rossec_runner::{
    ros_ids, BlockingLifecycleClient, CallbackResult, CancellationToken, ErrorKind,
    LifecycleCallbacks, LifecycleServiceClient, LifecycleTarget, MemoryBus, RunnerConfig, State,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Records which callbacks ran; `configure` answers with a fixed result.
struct Recorder {
    calls: Arc<Mutex<Vec<&'static str>>>,
    configure: CallbackResult,
}

impl Recorder {
    fn boxed(configure: CallbackResult) -> (Box<Self>, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let rec = Box::new(Self {
            calls: Arc::clone(&calls),
            configure,
        });
        (rec, calls)
    }

    fn hit(&self, name: &'static str) -> CallbackResult {
        self.calls.lock().unwrap().push(name);
        CallbackResult::Success
    }
}

impl LifecycleCallbacks for Recorder {
    fn on_configure(&mut self) -> CallbackResult {
        self.hit("configure");
        self.configure
    }
    fn on_activate(&mut self) -> CallbackResult {
        self.hit("activate")
    }
    fn on_deactivate(&mut self) -> CallbackResult {
        self.hit("deactivate")
    }
    fn on_cleanup(&mut self) -> CallbackResult {
        self.hit("cleanup")
    }
    fn on_shutdown(&mut self) -> CallbackResult {
        self.hit("shutdown")
    }
    fn on_error(&mut self) -> CallbackResult {
        self.hit("error")
    }
}

fn client_for(bus: &MemoryBus, target: &str) -> LifecycleServiceClient {
    let config = RunnerConfig::new(target).with_default_timeout(Duration::from_secs(1));
    LifecycleServiceClient::from_config(bus, &config, CancellationToken::new())
}

#[tokio::test]
async fn full_lifecycle_round_trip() {
    init_tracing();
    let bus = MemoryBus::new();
    let (callbacks, calls) = Recorder::boxed(CallbackResult::Success);
    let target = LifecycleTarget::serve(&bus, "noop", callbacks).unwrap();
    let client = client_for(&bus, "noop");

    assert_eq!(
        client.current_state(Duration::from_secs(1)).await.unwrap(),
        State::Unconfigured
    );

    assert!(client.configure().await);
    assert_eq!(target.state(), State::Inactive);
    assert!(client.activate().await);
    assert_eq!(target.state(), State::Active);
    assert!(client.deactivate().await);
    assert_eq!(target.state(), State::Inactive);
    assert!(client.cleanup().await);
    assert_eq!(target.state(), State::Unconfigured);
    assert!(client.shutdown().await);
    assert_eq!(target.state(), State::Finalized);

    assert_eq!(
        client.get_state(Duration::from_secs(1)).await.unwrap(),
        State::Finalized.id()
    );
    assert_eq!(
        target.received_transitions(),
        vec![
            ros_ids::TRANSITION_CONFIGURE,
            ros_ids::TRANSITION_ACTIVATE,
            ros_ids::TRANSITION_DEACTIVATE,
            ros_ids::TRANSITION_CLEANUP,
            ros_ids::TRANSITION_UNCONFIGURED_SHUTDOWN,
        ]
    );
    assert_eq!(
        *calls.lock().unwrap(),
        vec!["configure", "activate", "deactivate", "cleanup", "shutdown"]
    );

    // nothing left to shut down
    assert!(!client.shutdown().await);
    assert_eq!(target.received_transitions().len(), 5);
}

#[tokio::test]
async fn shutdown_from_active_uses_active_variant() {
    init_tracing();
    let bus = MemoryBus::new();
    let (callbacks, _) = Recorder::boxed(CallbackResult::Success);
    let target = LifecycleTarget::serve(&bus, "attacker", callbacks).unwrap();
    let client = client_for(&bus, "attacker");

    assert!(client.configure().await);
    assert!(client.activate().await);
    assert!(client.shutdown().await);

    assert_eq!(target.state(), State::Finalized);
    assert_eq!(
        target.received_transitions().last().copied(),
        Some(ros_ids::TRANSITION_ACTIVE_SHUTDOWN)
    );
}

#[tokio::test]
async fn refused_transition_is_answered_but_not_successful() {
    init_tracing();
    let bus = MemoryBus::new();
    let (callbacks, _) = Recorder::boxed(CallbackResult::Failure);
    let target = LifecycleTarget::serve(&bus, "noop", callbacks).unwrap();
    let client = client_for(&bus, "noop");

    // the target answered, so the plain operation reports true
    assert!(client.configure().await);
    let resp = client
        .try_change_state(ros_ids::TRANSITION_CONFIGURE, Duration::from_secs(1))
        .await
        .unwrap();
    assert!(!resp.success);
    assert_eq!(target.state(), State::Unconfigured);
}

#[tokio::test]
async fn erroring_callback_recovers_through_error_processing() {
    init_tracing();
    let bus = MemoryBus::new();
    let (callbacks, calls) = Recorder::boxed(CallbackResult::Error);
    let target = LifecycleTarget::serve(&bus, "noop", callbacks).unwrap();
    let client = client_for(&bus, "noop");

    let resp = client
        .try_change_state(ros_ids::TRANSITION_CONFIGURE, Duration::from_secs(1))
        .await
        .unwrap();
    assert!(!resp.success);
    assert_eq!(target.state(), State::Unconfigured);
    assert_eq!(*calls.lock().unwrap(), vec!["configure", "error"]);
}

#[tokio::test(start_paused = true)]
async fn missing_target_fails_without_hanging() {
    init_tracing();
    let bus = MemoryBus::new();
    let client = client_for(&bus, "ghost");

    assert!(!client.configure().await);
    let err = client.get_state(Duration::from_millis(300)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
}

#[tokio::test]
async fn target_that_goes_away_stops_answering() {
    init_tracing();
    let bus = MemoryBus::new();
    let (callbacks, _) = Recorder::boxed(CallbackResult::Success);
    let target = LifecycleTarget::serve(&bus, "noop", callbacks).unwrap();
    let client = client_for(&bus, "noop");

    assert!(client.configure().await);
    drop(target);
    assert!(!bus.is_advertised("/noop/change_state"));

    let err = client
        .try_change_state(ros_ids::TRANSITION_ACTIVATE, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
}

/// Configures slowly; everything else succeeds, except shutdown which errors.
struct Sluggish {
    configure_delay: Duration,
    error_calls: Arc<Mutex<usize>>,
}

impl LifecycleCallbacks for Sluggish {
    fn on_configure(&mut self) -> CallbackResult {
        std::thread::sleep(self.configure_delay);
        CallbackResult::Success
    }
    fn on_activate(&mut self) -> CallbackResult {
        CallbackResult::Success
    }
    fn on_deactivate(&mut self) -> CallbackResult {
        CallbackResult::Success
    }
    fn on_cleanup(&mut self) -> CallbackResult {
        CallbackResult::Success
    }
    fn on_shutdown(&mut self) -> CallbackResult {
        CallbackResult::Error
    }
    fn on_error(&mut self) -> CallbackResult {
        *self.error_calls.lock().unwrap() += 1;
        CallbackResult::Success
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_target_cannot_stretch_the_call_timeout() {
    init_tracing();
    let bus = MemoryBus::new();
    let callbacks = Box::new(Sluggish {
        configure_delay: Duration::from_millis(1500),
        error_calls: Arc::new(Mutex::new(0)),
    });
    let target = LifecycleTarget::serve(&bus, "slow", callbacks).unwrap();
    let client = client_for(&bus, "slow");

    let time_out = Duration::from_millis(300);
    let started = std::time::Instant::now();
    let answered = client
        .change_state(ros_ids::TRANSITION_CONFIGURE, time_out)
        .await;
    let waited = started.elapsed();

    assert!(!answered);
    assert!(waited >= time_out);
    // one poll slice plus scheduling slack
    assert!(waited < time_out + Duration::from_millis(400), "waited {waited:?}");

    // the target still finishes the transition on its own time
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while target.state() != State::Inactive && std::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(target.state(), State::Inactive);
}

#[tokio::test]
async fn shutdown_error_finalizes_without_error_recovery() {
    init_tracing();
    let bus = MemoryBus::new();
    let error_calls = Arc::new(Mutex::new(0));
    let callbacks = Box::new(Sluggish {
        configure_delay: Duration::ZERO,
        error_calls: Arc::clone(&error_calls),
    });
    let target = LifecycleTarget::serve(&bus, "noop", callbacks).unwrap();
    let client = client_for(&bus, "noop");

    assert!(client.shutdown().await);
    assert_eq!(target.state(), State::Finalized);
    assert_eq!(*error_calls.lock().unwrap(), 0);
}

#[test]
fn blocking_facade_drives_target() {
    init_tracing();
    let bus = MemoryBus::new();
    let (callbacks, _) = Recorder::boxed(CallbackResult::Success);
    let target = LifecycleTarget::serve(&bus, "noop", callbacks).unwrap();
    let client = BlockingLifecycleClient::new(client_for(&bus, "noop")).unwrap();

    assert!(client.configure());
    assert!(client.activate());
    assert_eq!(
        client.current_state(Duration::from_secs(1)).unwrap(),
        State::Active
    );
    assert!(client.shutdown());
    assert_eq!(target.state(), State::Finalized);
    assert_eq!(client.client().target_node_name(), "noop");
}
