//! Integration tests for the blocking queue handoff.

use signalbox_sync::{BlockingQueue, DeliveryOrder, SyncError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_three_values_one_sender_one_receiver() {
    let queue = Arc::new(BlockingQueue::new());

    let tx = Arc::clone(&queue);
    let producer = thread::spawn(move || {
        for v in [1, 2, 3] {
            tx.send(v).unwrap();
        }
    });
    producer.join().unwrap();

    let rx = Arc::clone(&queue);
    let consumer = thread::spawn(move || [rx.receive().unwrap(), rx.receive().unwrap(), rx.receive().unwrap()]);

    // Latest first
    assert_eq!(consumer.join().unwrap(), [3, 2, 1]);
}

#[test]
fn test_blocked_receivers_each_get_one_value() {
    let queue = Arc::new(BlockingQueue::with_order(DeliveryOrder::Fifo));
    let receivers = 8;
    let delivered = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..receivers)
        .map(|_| {
            let rx = Arc::clone(&queue);
            let delivered = Arc::clone(&delivered);
            thread::spawn(move || {
                let v = rx.receive().unwrap();
                delivered.fetch_add(1, Ordering::Relaxed);
                v
            })
        })
        .collect();

    // Let the receivers park before anything is sent
    let start = Instant::now();
    while queue.waiting_receivers() < receivers {
        assert!(start.elapsed() < Duration::from_secs(5));
        thread::sleep(Duration::from_millis(1));
    }

    for v in 0..receivers {
        queue.send(v).unwrap();
    }

    let mut got: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    got.sort_unstable();

    assert_eq!(got, (0..receivers).collect::<Vec<_>>());
    assert_eq!(delivered.load(Ordering::Relaxed), receivers);
    assert!(queue.is_empty());
}

#[test]
fn test_close_releases_timed_receiver() {
    let queue: Arc<BlockingQueue<u64>> = Arc::new(BlockingQueue::new());

    let rx = Arc::clone(&queue);
    let consumer = thread::spawn(move || rx.receive_timeout(Duration::from_secs(30)));

    let start = Instant::now();
    while queue.waiting_receivers() < 1 {
        assert!(start.elapsed() < Duration::from_secs(5));
        thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(queue.close(), 1);
    assert_eq!(consumer.join().unwrap(), Err(SyncError::Closed));
    assert!(start.elapsed() < Duration::from_secs(5));
}
