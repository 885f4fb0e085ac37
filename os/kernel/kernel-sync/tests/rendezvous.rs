use kernel_sync::{Rendezvous, SyncOnceCell};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[test]
fn nobody_leaves_before_everyone_arrived() {
    let parties = 4;
    let barrier = Arc::new(Rendezvous::new(parties));
    let left = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..parties)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let left = Arc::clone(&left);
            thread::spawn(move || {
                let order = barrier.arrive_and_wait();
                // Everybody has decremented the countdown by now.
                assert_eq!(barrier.arrived(), parties);
                left.fetch_add(1, Ordering::SeqCst);
                order
            })
        })
        .collect();

    let mut orders: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    orders.sort_unstable();
    assert_eq!(orders, vec![0, 1, 2, 3]);
    assert_eq!(left.load(Ordering::SeqCst), parties);
}

#[test]
fn late_arrivals_do_not_wrap() {
    let barrier = Rendezvous::new(2);
    assert_eq!(barrier.arrive(), 0);
    assert!(!barrier.is_complete());
    assert_eq!(barrier.arrive(), 1);
    assert!(barrier.is_complete());
    assert_eq!(barrier.arrive(), 2);
    assert_eq!(barrier.arrived(), 2);
    barrier.wait();
}

#[test]
fn once_cell_keeps_first_value() {
    let cell = SyncOnceCell::new();
    assert!(cell.get().is_none());
    assert_eq!(cell.set(7), Ok(()));
    assert_eq!(cell.set(9), Err(9));
    assert_eq!(cell.get(), Some(&7));
    assert_eq!(*cell.get_or_init(|| 11), 7);
}

#[test]
fn once_cell_wait_sees_other_thread_write() {
    let cell = Arc::new(SyncOnceCell::new());
    let writer = {
        let cell = Arc::clone(&cell);
        thread::spawn(move || cell.set(String::from("halt")).unwrap())
    };
    assert_eq!(cell.wait(), "halt");
    writer.join().unwrap();
}
