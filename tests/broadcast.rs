use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use patternkit::{
    AsyncBroadcaster, BoxError, Broadcaster, BroadcasterConfig, FaultPolicy, PublishError, SubscriberFault,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
#[error("handler {0} refused")]
struct Refused(&'static str);

type Log = Arc<Mutex<Vec<&'static str>>>;

/// Subscribes A, B, C where B always fails.
fn abc(bus: &Broadcaster<i32>, log: &Log) -> Vec<patternkit::Subscription> {
    ["a", "b", "c"]
        .into_iter()
        .map(|name| {
            let log = Arc::clone(log);
            bus.subscribe(move |_: &i32| {
                log.lock().unwrap().push(name);
                if name == "b" {
                    Err(Box::new(Refused(name)) as BoxError)
                } else {
                    Ok(())
                }
            })
        })
        .collect()
}

#[test]
fn throw_aggregate_runs_everyone_and_collects() {
    let log = Log::default();
    let bus = Broadcaster::<i32>::new();
    let subs = abc(&bus, &log);

    let err = bus.publish(&1).unwrap_err();
    assert_eq!(err.as_label(), "publish_aggregate");
    let faults = err.into_faults();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].id, subs[1].id());
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn throw_first_stops_at_failing_subscriber() {
    let log = Log::default();
    let bus = Broadcaster::<i32>::builder()
        .with_policy(FaultPolicy::ThrowFirst)
        .build();
    let _subs = abc(&bus, &log);

    match bus.publish(&1) {
        Err(PublishError::Subscriber(fault)) => {
            let refused = fault.error().and_then(|e| e.downcast_ref::<Refused>());
            assert_eq!(refused.map(|r| r.0), Some("b"));
            assert_eq!(fault.to_string(), format!("subscriber {} failed: handler b refused", fault.id));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn swallow_returns_ok_and_notifies_sink() {
    let log = Log::default();
    let sunk = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&sunk);
    let bus = Broadcaster::<i32>::builder()
        .with_policy(FaultPolicy::Swallow)
        .with_sink(move |_: &SubscriberFault| -> Result<(), BoxError> {
            s.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build();
    let _subs = abc(&bus, &log);

    assert!(bus.publish(&1).is_ok());
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(sunk.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_sink_never_surfaces() {
    let bus = Broadcaster::<i32>::builder()
        .with_policy(FaultPolicy::Swallow)
        .with_sink(|_: &SubscriberFault| -> Result<(), BoxError> { panic!("sink is broken") })
        .build();
    let _bad = bus.subscribe(|_: &i32| Err("x".into()));

    assert!(bus.publish(&1).is_ok());
}

#[test]
fn predicates_select_recipients() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let bus = Broadcaster::<i32>::new();

    let s = Arc::clone(&seen);
    let _a = bus.subscribe_when(|v: &i32| *v > 0, move |v: &i32| {
        s.lock().unwrap().push(("A", *v));
        Ok(())
    });
    let s = Arc::clone(&seen);
    let _b = bus.subscribe(move |v: &i32| {
        s.lock().unwrap().push(("B", *v));
        Ok(())
    });

    bus.publish(&-1).unwrap();
    bus.publish(&5).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![("B", -1), ("A", 5), ("B", 5)]);
}

#[test]
fn unsubscribe_during_publish_takes_effect_next_time() {
    let bus = Broadcaster::<i32>::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let victim_slot: Arc<Mutex<Option<patternkit::Subscription>>> = Arc::default();

    let slot = Arc::clone(&victim_slot);
    let _remover = bus.subscribe(move |_: &i32| {
        if let Some(sub) = slot.lock().unwrap().take() {
            sub.release();
        }
        Ok(())
    });

    let s = Arc::clone(&seen);
    let victim = bus.subscribe(move |v: &i32| {
        s.lock().unwrap().push(*v);
        Ok(())
    });
    *victim_slot.lock().unwrap() = Some(victim);

    bus.publish(&1).unwrap();
    bus.publish(&2).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1]);
    assert_eq!(bus.subscriber_count(), 1);
}

#[test]
fn concurrent_subscribe_release_and_publish() {
    const THREADS: usize = 6;
    const ROUNDS: usize = 100;

    let bus = Broadcaster::<usize>::with_config(BroadcasterConfig {
        name: "stress".into(),
        ..BroadcasterConfig::default()
    });
    let delivered = Arc::new(AtomicUsize::new(0));
    let barrier = Barrier::new(THREADS + 1);

    let kept = std::thread::scope(|s| {
        let writers: Vec<_> = (0..THREADS)
            .map(|t| {
                let bus = &bus;
                let barrier = &barrier;
                let delivered = Arc::clone(&delivered);
                s.spawn(move || {
                    barrier.wait();
                    let mut kept = Vec::new();
                    for i in 0..ROUNDS {
                        let d = Arc::clone(&delivered);
                        let sub = bus.subscribe(move |_: &usize| {
                            d.fetch_add(1, Ordering::Relaxed);
                            Ok(())
                        });
                        if i % 2 == t % 2 {
                            kept.push(sub);
                        }
                    }
                    kept
                })
            })
            .collect();

        let bus = &bus;
        let barrier = &barrier;
        let reader = s.spawn(move || {
            barrier.wait();
            for n in 0..ROUNDS {
                assert!(bus.publish(&n).is_ok());
            }
        });

        reader.join().unwrap();
        writers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(bus.subscriber_count(), kept.len());
    let mut expected: Vec<_> = kept.iter().map(|s| s.id()).collect();
    expected.sort();
    let mut live = bus.registry().ids();
    live.sort();
    assert_eq!(live, expected);
}

#[tokio::test]
async fn async_throw_aggregate_and_cancellation_token() {
    let bus = AsyncBroadcaster::<u32>::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["a", "b", "c"] {
        let order = Arc::clone(&order);
        bus.subscribe_fn(name, move |ev: u32, ctx: CancellationToken| {
            let order = Arc::clone(&order);
            async move {
                tokio::task::yield_now().await;
                order.lock().unwrap().push((name, ev, ctx.is_cancelled()));
                if name == "b" {
                    return Err(Box::new(Refused(name)) as BoxError);
                }
                Ok(())
            }
        })
        .detach();
    }

    let ctx = CancellationToken::new();
    let err = bus.publish_with(&9, ctx.clone()).await.unwrap_err();
    assert_eq!(err.faults().len(), 1);
    assert_eq!(
        *order.lock().unwrap(),
        vec![("a", 9, false), ("b", 9, false), ("c", 9, false)]
    );
}

#[test]
fn throw_first_notifies_sink_before_returning() {
    let log = Log::default();
    let l = Arc::clone(&log);
    let bus = Broadcaster::<i32>::builder()
        .with_policy(FaultPolicy::ThrowFirst)
        .with_sink(move |_: &SubscriberFault| -> Result<(), BoxError> {
            l.lock().unwrap().push("sink");
            Err("sink offline".into())
        })
        .build();
    let subs = abc(&bus, &log);

    let err = bus.publish(&1).unwrap_err();
    assert_eq!(err.as_label(), "publish_subscriber_fault");
    assert_eq!(err.faults()[0].id, subs[1].id());
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "sink"]);
}

#[test]
fn throw_aggregate_notifies_sink_once_per_fault() {
    let sunk = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&sunk);
    let bus = Broadcaster::<i32>::builder()
        .with_sink(move |f: &SubscriberFault| -> Result<(), BoxError> {
            s.lock().unwrap().push(f.id);
            Ok(())
        })
        .build();

    let first = bus.subscribe(|_: &i32| Err("first".into()));
    let _ok = bus.subscribe(|_: &i32| Ok(()));
    let second = bus.subscribe(|_: &i32| panic!("second"));

    let faults = bus.publish(&1).unwrap_err().into_faults();
    let ids: Vec<_> = faults.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![first.id(), second.id()]);
    assert_eq!(*sunk.lock().unwrap(), ids);
    assert!(faults[1].is_panic());
}

/// Subscribes async A, B, C where B always fails; returns the run log.
fn async_abc(bus: &AsyncBroadcaster<u32>) -> Log {
    let log = Log::default();
    for name in ["a", "b", "c"] {
        let log = Arc::clone(&log);
        bus.subscribe_fn(name, move |_ev: u32, _ctx: CancellationToken| {
            let log = Arc::clone(&log);
            async move {
                tokio::task::yield_now().await;
                log.lock().unwrap().push(name);
                if name == "b" {
                    return Err(Box::new(Refused(name)) as BoxError);
                }
                Ok(())
            }
        })
        .detach();
    }
    log
}

#[tokio::test]
async fn async_throw_first_skips_later_subscribers() {
    let sunk = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&sunk);
    let bus = AsyncBroadcaster::<u32>::builder()
        .with_policy(FaultPolicy::ThrowFirst)
        .with_sink(move |_: &SubscriberFault| -> Result<(), BoxError> {
            s.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build();
    let log = async_abc(&bus);

    match bus.publish(&3).await {
        Err(PublishError::Subscriber(fault)) => {
            let refused = fault.error().and_then(|e| e.downcast_ref::<Refused>());
            assert_eq!(refused.map(|r| r.0), Some("b"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    assert_eq!(sunk.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn async_swallow_runs_everyone() {
    let sunk = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&sunk);
    let bus = AsyncBroadcaster::<u32>::builder()
        .with_policy(FaultPolicy::Swallow)
        .with_sink(move |_: &SubscriberFault| -> Result<(), BoxError> {
            s.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build();
    let log = async_abc(&bus);

    assert!(bus.publish(&3).await.is_ok());
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(sunk.load(Ordering::SeqCst), 1);
}
