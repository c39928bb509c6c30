#![allow(missing_docs)]

use contadi::{Binder, Container};
use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicUsize, Ordering}
    },
    thread,
    time::Duration
};

const THREADS: usize = 8;

#[test]
fn it_builds_singleton_once_across_threads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let container = Container::new();
    container.register_service("pool", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        vec![1_u8; 16]
    }).unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.get_shared::<Vec<u8>>("pool").unwrap()
            })
        })
        .collect();

    let pools: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(pools.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn it_never_observes_half_reloaded_state() {
    let container = Container::new();
    container.register_service("version", || 0_usize).unwrap();
    container.register_service_with("left", ["version"], |v: usize| Ok(v)).unwrap();
    container.register_service_with("right", ["version"], |v: usize| Ok(v)).unwrap();
    container.register_service_with("pair", ["left", "right"], |l: usize, r: usize| Ok((l, r))).unwrap();
    container.get::<usize>("left").unwrap();
    container.get::<usize>("right").unwrap();

    let writer = {
        let container = container.clone();
        thread::spawn(move || {
            for version in 1..=50_usize {
                container.register_service("version", move || version).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let container = container.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let left = container.get::<usize>("left").unwrap();
                    let right = container.get::<usize>("right").unwrap();
                    let version = container.get::<usize>("version").unwrap();
                    assert!(left <= version && right <= version);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(container.get::<usize>("left").unwrap(), 50);
    assert_eq!(container.get::<usize>("right").unwrap(), 50);
}

#[test]
fn it_resolves_through_binder_inside_factory() {
    let container = Container::new();
    container.register_service("cleanedWater", || "cleaned").unwrap();
    container.bind_implementation("water", "cleanedWater").unwrap();
    container.register_service_with("bottle", ["water"], |water: Binder| {
        water.resolve::<&str>("cleanedWater").map(|kind| format!("bottle of {kind} water"))
    }).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            thread::spawn(move || container.get::<String>("bottle").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "bottle of cleaned water");
    }
}
