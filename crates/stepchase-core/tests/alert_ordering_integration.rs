//! Alerts posted from many threads reach subscribers in queue order.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use stepchase_core::{Alert, AlertCenter};

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

fn wait_for(received: &Mutex<Vec<Alert>>, count: usize) -> Vec<Alert> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let seen = received.lock().unwrap().clone();
        if seen.len() >= count || Instant::now() > deadline {
            return seen;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn concurrent_posts_are_delivered_in_queue_order() {
    let center = AlertCenter::new();
    let received = Arc::new(Mutex::new(Vec::new()));
    {
        let received = Arc::clone(&received);
        center.subscribe(move |alert| received.lock().unwrap().push(alert.clone()));
    }

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let center = center.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    center.post(Alert::new(format!("thread {t} alert {i}")));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let delivered = wait_for(&received, THREADS * PER_THREAD);
    assert_eq!(delivered.len(), THREADS * PER_THREAD);
    assert_eq!(delivered, center.alerts());
}

#[test]
fn duplicate_posts_race_to_a_single_entry() {
    let center = AlertCenter::new();
    let received = Arc::new(Mutex::new(Vec::new()));
    {
        let received = Arc::clone(&received);
        center.subscribe(move |alert| received.lock().unwrap().push(alert.clone()));
    }

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let center = center.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                center.post(Alert::caught_by_nessie())
            })
        })
        .collect();
    let accepted = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|posted| *posted)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(center.len(), 1);
    assert_eq!(wait_for(&received, 1), vec![Alert::caught_by_nessie()]);
}

#[test]
fn every_subscriber_sees_the_same_sequence() {
    let center = AlertCenter::new();
    let logs: Vec<Arc<Mutex<Vec<Alert>>>> = (0..3).map(|_| Arc::default()).collect();
    for log in &logs {
        let log = Arc::clone(log);
        center.subscribe(move |alert| log.lock().unwrap().push(alert.clone()));
    }

    let expected = vec![
        Alert::milestone_25_percent(),
        Alert::nessie_50_percent(),
        Alert::milestone_50_percent(),
        Alert::nessie_90_percent(),
    ];
    for alert in &expected {
        center.post(alert.clone());
    }

    for log in &logs {
        assert_eq!(wait_for(log, expected.len()), expected);
    }
}

#[test]
fn clearing_front_reveals_next_alert() {
    let center = AlertCenter::new();
    center.post(Alert::no_pedometer());
    center.post(Alert::data_alert());

    let shown = center.front().unwrap();
    assert_eq!(shown, Alert::no_pedometer());
    center.clear(&shown);

    assert_eq!(center.front(), Some(Alert::data_alert()));
    assert_eq!(center.second(), None);
}

#[tokio::test]
async fn watchers_see_posts_in_order() {
    let center = AlertCenter::new();
    let mut rx = center.watch();

    let poster = center.clone();
    tokio::task::spawn_blocking(move || {
        for i in 0..10 {
            poster.post(Alert::new(format!("step {i}")));
        }
    })
    .await
    .unwrap();

    for i in 0..10 {
        assert_eq!(rx.recv().await.unwrap(), Alert::new(format!("step {i}")));
    }
}
