//! Registry lifecycle and update-path tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use vigil_core::error::ErrorCode;
use vigil_core::metrics::{Metric, MetricKind, Registry, SampleValue};

const ROOT: [(&str, &str); 3] = [("method", "GET"), ("route", "/"), ("status", "200")];

fn requests_counter() -> Metric {
    Metric::counter("http_requests_total", "Total HTTP requests").with_labels(&[
        "method", "route", "status",
    ])
}

#[test]
fn duplicate_registration_keeps_first() {
    let reg = Registry::new();
    reg.register(requests_counter()).unwrap();

    let err = reg
        .register(Metric::gauge("http_requests_total", "second"))
        .expect_err("duplicate must fail");
    assert_eq!(err.code(), ErrorCode::DuplicateMetric);
    assert_eq!(reg.len(), 1);

    let snap = reg.snapshot();
    let fam = snap.family("http_requests_total").unwrap();
    assert_eq!(fam.kind, MetricKind::Counter);
    assert_eq!(fam.help, "Total HTTP requests");
}

#[test]
fn increment_unknown_metric_fails() {
    let reg = Registry::new();
    let err = reg.inc("nope_total", &[]).expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::UnknownMetric);
    assert!(reg.is_empty());
}

#[test]
fn unseen_tuple_starts_at_zero() {
    let reg = Registry::new();
    reg.register(requests_counter()).unwrap();

    assert_eq!(reg.snapshot().counter("http_requests_total", &ROOT), None);

    reg.increment("http_requests_total", &ROOT, 5).unwrap();
    reg.inc("http_requests_total", &ROOT).unwrap();
    assert_eq!(reg.snapshot().counter("http_requests_total", &ROOT), Some(6));
}

#[test]
fn label_order_is_normalised() {
    let reg = Registry::new();
    reg.register(requests_counter()).unwrap();

    reg.inc("http_requests_total", &ROOT).unwrap();
    reg.inc(
        "http_requests_total",
        &[("status", "200"), ("method", "GET"), ("route", "/")],
    )
    .unwrap();

    let snap = reg.snapshot();
    assert_eq!(snap.family("http_requests_total").unwrap().samples.len(), 1);
    assert_eq!(snap.counter("http_requests_total", &ROOT), Some(2));
}

#[test]
fn wrong_labels_are_rejected() {
    let reg = Registry::new();
    reg.register(requests_counter()).unwrap();

    let missing = reg
        .inc("http_requests_total", &[("method", "GET"), ("route", "/")])
        .expect_err("missing label");
    assert_eq!(missing.code(), ErrorCode::LabelMismatch);

    let renamed = reg
        .inc(
            "http_requests_total",
            &[("method", "GET"), ("path", "/"), ("status", "200")],
        )
        .expect_err("unknown label");
    assert_eq!(renamed.code(), ErrorCode::LabelMismatch);

    let doubled = reg
        .inc(
            "http_requests_total",
            &[("method", "GET"), ("method", "POST"), ("status", "200")],
        )
        .expect_err("repeated label");
    assert_eq!(doubled.code(), ErrorCode::LabelMismatch);
}

#[test]
fn kind_mismatch_is_rejected() {
    let reg = Registry::new();
    reg.register(Metric::gauge("queue_depth", "Items waiting")).unwrap();

    let err = reg.inc("queue_depth", &[]).expect_err("gauge is not a counter");
    assert_eq!(err.code(), ErrorCode::KindMismatch);

    let err = reg
        .observe("queue_depth", &[], Duration::from_millis(1))
        .expect_err("gauge is not a histogram");
    assert_eq!(err.code(), ErrorCode::KindMismatch);
}

#[test]
fn invalid_names_are_rejected() {
    let reg = Registry::new();

    for bad in ["", "1abc", "has-dash", "white space"] {
        let err = reg.register(Metric::counter(bad, "x")).expect_err(bad);
        assert_eq!(err.code(), ErrorCode::InvalidName);
    }

    let reserved = reg
        .register(Metric::counter("ok_total", "x").with_labels(&["__internal"]))
        .expect_err("reserved prefix");
    assert_eq!(reserved.code(), ErrorCode::InvalidName);

    let repeated = reg
        .register(Metric::counter("ok_total", "x").with_labels(&["a", "a"]))
        .expect_err("repeated label");
    assert_eq!(repeated.code(), ErrorCode::InvalidName);

    let le = reg
        .register(Metric::histogram("latency_micros", "x").with_labels(&["le"]))
        .expect_err("le on histogram");
    assert_eq!(le.code(), ErrorCode::InvalidName);

    assert!(reg.is_empty());
    reg.register(Metric::counter("ns:ok_total", "x")).unwrap();
    assert!(reg.contains("ns:ok_total"));
}

#[test]
fn gauge_add_and_set() {
    let reg = Registry::new();
    let g = reg.register_gauge("sessions_active", "Open sessions", &["tenant"]).unwrap();

    g.inc(&[("tenant", "acme")]).unwrap();
    g.inc(&[("tenant", "acme")]).unwrap();
    g.dec(&[("tenant", "acme")]).unwrap();
    reg.add_gauge("sessions_active", &[("tenant", "beta")], -3).unwrap();

    let snap = reg.snapshot();
    assert_eq!(snap.gauge("sessions_active", &[("tenant", "acme")]), Some(1));
    assert_eq!(snap.gauge("sessions_active", &[("tenant", "beta")]), Some(-3));

    reg.set_gauge("sessions_active", &[("tenant", "acme")], 42).unwrap();
    assert_eq!(
        reg.snapshot().gauge("sessions_active", &[("tenant", "acme")]),
        Some(42)
    );
}

#[test]
fn histogram_buckets_are_cumulative() {
    let reg = Registry::new();
    let h = reg.register_histogram("handle_micros", "Handler time", &[]).unwrap();

    h.observe(&[], Duration::from_micros(50)).unwrap();
    h.observe(&[], Duration::from_micros(700)).unwrap();
    h.observe(&[], Duration::from_secs(3)).unwrap();

    let snap = reg.snapshot();
    let fam = snap.family("handle_micros").unwrap();
    match fam.sample(&[]).unwrap() {
        SampleValue::Histogram { buckets, count, sum } => {
            assert_eq!(*count, 3);
            assert_eq!(*sum, 50 + 700 + 3_000_000);
            assert_eq!(buckets[0], 1); // <= 100us
            assert_eq!(buckets[1], 1); // <= 500us
            assert_eq!(buckets[2], 2); // <= 1ms
            assert_eq!(buckets[8], 2); // <= 1s
        }
        other => panic!("unexpected sample: {other:?}"),
    }
}

#[test]
fn concurrent_increments_do_not_lose_updates() {
    let reg = Arc::new(Registry::new());
    let counter = reg
        .register_counter("http_requests_total", "Total HTTP requests", &["method", "route", "status"])
        .unwrap();

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let reg = Arc::clone(&reg);
            let counter = counter.clone();
            thread::spawn(move || {
                // Mix handle and name-based updates.
                if i % 2 == 0 {
                    counter.inc(&ROOT).unwrap();
                } else {
                    reg.inc("http_requests_total", &ROOT).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(reg.snapshot().counter("http_requests_total", &ROOT), Some(100));
}

#[test]
fn concurrent_registration_admits_one_winner() {
    let reg = Arc::new(Registry::new());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let reg = Arc::clone(&reg);
            thread::spawn(move || reg.register(Metric::counter("race_total", "x")).is_ok())
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(reg.len(), 1);
}

#[test]
fn histogram_scrape_during_observations_stays_cumulative() {
    let reg = Arc::new(Registry::new());
    let h = reg.register_histogram("busy_micros", "Busy time", &[]).unwrap();

    let writers: Vec<_> = (0..4u64)
        .map(|w| {
            let h = h.clone();
            thread::spawn(move || {
                for i in 0..2_000u64 {
                    h.observe(&[], Duration::from_micros((i * 37 + w * 101) % 1_500_000))
                        .unwrap();
                }
            })
        })
        .collect();

    let mut scrapes = 0;
    while scrapes < 200 || !writers.iter().all(|w| w.is_finished()) {
        let snap = reg.snapshot();
        if let Some(SampleValue::Histogram { buckets, count, .. }) =
            snap.family("busy_micros").unwrap().sample(&[])
        {
            assert!(buckets.windows(2).all(|p| p[0] <= p[1]), "{buckets:?}");
            assert!(buckets[buckets.len() - 1] <= *count, "{buckets:?} > {count}");
        }
        scrapes += 1;
    }
    for w in writers {
        w.join().unwrap();
    }

    let snap = reg.snapshot();
    match snap.family("busy_micros").unwrap().sample(&[]).unwrap() {
        SampleValue::Histogram { count, .. } => assert_eq!(*count, 8_000),
        other => panic!("unexpected sample: {other:?}"),
    }
}
