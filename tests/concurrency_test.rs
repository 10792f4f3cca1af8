//! Integration test: concurrent operations on a shared engine
//!
//! Same-user operations are serialized; different users proceed in parallel
//! without lost updates.

use chrono::NaiveDate;
use std::sync::{Arc, Barrier};
use std::thread;
use streakhold::{
    Engine, EngineConfig, EngineError, GroupId, ManualClock, MemoryStore, Reason, Store, UserId,
};

fn shared_engine() -> (Arc<Engine>, Arc<MemoryStore>) {
    let clock = Arc::new(ManualClock::at_date(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()));
    let store = Arc::new(MemoryStore::new());
    let engine = Engine::new(store.clone(), EngineConfig::default().with_seed(5)).with_clock(clock);
    (Arc::new(engine), store)
}

#[test]
fn test_same_user_same_day_exactly_one_succeeds() {
    let (engine, store) = shared_engine();
    let user = UserId::from("racer");
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let user = user.clone();
            thread::spawn(move || {
                barrier.wait();
                engine.perform_daily_engagement(&user, None)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let already_done = results
        .iter()
        .filter(|r| matches!(r, Err(EngineError::AlreadyDone(Reason::AlreadyEngagedToday))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(already_done, threads - 1);
    assert_eq!(store.engagements_for(&user).unwrap().len(), 1);
    assert_eq!(engine.get_progress(&user).unwrap().total_days, 1);
}

#[test]
fn test_different_users_all_succeed() {
    let (engine, store) = shared_engine();
    let handles: Vec<_> = (0..16)
        .map(|n| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.perform_daily_engagement(&UserId::new(format!("u{n}")), None))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
    assert_eq!(store.users().unwrap().len(), 16);
}

#[test]
fn test_concurrent_donations_are_not_lost() {
    let (engine, store) = shared_engine();
    let group = GroupId::from("guild-group");
    let members: Vec<UserId> = (0..6).map(|n| UserId::new(format!("m{n}"))).collect();

    for member in &members {
        engine.perform_daily_engagement(member, None).unwrap();
    }
    engine
        .create_guild(&group, "Concord", &members[0], &members[1..])
        .unwrap();

    let handles: Vec<_> = members
        .iter()
        .cloned()
        .map(|member| {
            let engine = Arc::clone(&engine);
            let group = group.clone();
            thread::spawn(move || engine.donate_to_guild(&group, &member, 10))
        })
        .collect();

    let gained: u64 = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap().experience_gained)
        .sum();

    let guild = store.guild(&group).unwrap().unwrap();
    assert_eq!(guild.currency, 60);
    assert_eq!(guild.experience, gained);
}
