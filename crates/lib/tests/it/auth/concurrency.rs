use std::{
    collections::HashSet,
    sync::{
        Arc, Barrier,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use userd::store::Store;

use crate::helpers::{PASSWORD, lines, setup};

const WRITERS: usize = 16;
const READERS: usize = 4;
const ROUNDS: usize = 50;

#[test]
fn test_concurrent_user_creation() {
    let ctx = setup();
    let role = ctx.directory.create_role("admin").unwrap();

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let directory = ctx.directory.clone();
            let role_id = role.role_id.clone();
            thread::spawn(move || {
                directory.create_user(
                    &format!("user{i}@x.com"),
                    PASSWORD,
                    "created concurrently",
                    &role_id,
                )
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(lines(&ctx.path("user.conf")).len(), WRITERS);

    let reloaded = Store::open(&ctx.location).unwrap();
    assert_eq!(reloaded.user_count(), WRITERS);
    for i in 0..WRITERS {
        ctx.directory
            .authenticate(&format!("user{i}@x.com"), PASSWORD)
            .unwrap();
    }
}

#[test]
fn test_concurrent_duplicate_role_creates_one() {
    let ctx = setup();

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let directory = ctx.directory.clone();
            thread::spawn(move || directory.create_role("admin"))
        })
        .collect();
    let created = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(Result::is_ok)
        .count();

    assert_eq!(created, 1);
    assert_eq!(lines(&ctx.path("role.conf")).len(), 1);
}

#[test]
fn test_role_names_unique_while_readers_refresh() {
    let ctx = setup();
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let directory = ctx.directory.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    directory.list_roles().unwrap();
                }
            })
        })
        .collect();

    let racers = 4;
    let barrier = Arc::new(Barrier::new(racers));
    let writers: Vec<_> = (0..racers)
        .map(|_| {
            let directory = ctx.directory.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                (0..ROUNDS)
                    .filter(|round| {
                        barrier.wait();
                        directory.create_role(&format!("role{round}")).is_ok()
                    })
                    .count()
            })
        })
        .collect();
    let created: usize = writers
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .sum();

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(created, ROUNDS);
    let names: HashSet<String> = lines(&ctx.path("role.conf"))
        .iter()
        .map(|line| line.split(',').nth(1).unwrap().to_string())
        .collect();
    assert_eq!(names.len(), ROUNDS);
    assert_eq!(lines(&ctx.path("role.conf")).len(), ROUNDS);
}
