/*!
 * Wait registry integration tests
 */

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use task_rendezvous::{RegistryError, TaskTable, WaitRegistry, WakeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    Read,
    Flush,
}

fn setup() -> (Arc<TaskTable>, Arc<WaitRegistry<u32, Op>>) {
    let _ = env_logger::builder().is_test(true).try_init();
    (Arc::new(TaskTable::new()), Arc::new(WaitRegistry::new()))
}

#[test]
fn test_notify_wakes_exact_waiter_with_value() {
    let (table, registry) = setup();
    let task = table.attach();

    let waiter = {
        let registry = registry.clone();
        thread::spawn(move || registry.wait(&task, 5, Op::Read, || true, Some(Duration::from_millis(500))))
    };

    // Give the waiter time to register and suspend.
    thread::sleep(Duration::from_millis(50));
    let start = Instant::now();
    assert_eq!(
        registry.notify(&5, &Op::Read, 42).unwrap(),
        WakeResult::Woken(1)
    );

    assert_eq!(waiter.join().unwrap(), Ok(42));
    assert!(start.elapsed() < Duration::from_millis(400));
    assert!(registry.is_empty());
}

#[test]
fn test_timeout_frees_identity_for_reuse() {
    let (table, registry) = setup();
    let task = table.attach();

    let start = Instant::now();
    let outcome = registry.wait(&task, 5, Op::Read, || true, Some(Duration::from_millis(50)));
    assert_eq!(outcome, Err(RegistryError::Timeout));
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert!(!registry.is_registered(&5));

    // The same identity can wait again right away.
    let outcome = registry.wait(&task, 5, Op::Read, || true, Some(Duration::ZERO));
    assert_eq!(outcome, Err(RegistryError::Timeout));
}

#[test]
fn test_zero_timeout_polls() {
    let (table, registry) = setup();
    let task = table.attach();

    let start = Instant::now();
    let outcome = registry.wait(&task, 5, Op::Read, || true, Some(Duration::ZERO));
    assert_eq!(outcome, Err(RegistryError::Timeout));
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_duplicate_identity_rejected_while_waiting() {
    let (table, registry) = setup();
    let first = table.attach();
    let second = table.attach();

    let waiter = {
        let registry = registry.clone();
        thread::spawn(move || {
            registry.wait(&first, 5, Op::Read, || true, Some(Duration::from_millis(500)))
        })
    };

    thread::sleep(Duration::from_millis(50));
    let outcome = registry.wait(&second, 5, Op::Flush, || true, Some(Duration::ZERO));
    assert_eq!(outcome, Err(RegistryError::IdentityInUse));

    registry.notify(&5, &Op::Read, 1).unwrap();
    assert_eq!(waiter.join().unwrap(), Ok(1));
}

#[test]
fn test_broadcast_reaches_every_waiter_of_kind() {
    let (table, registry) = setup();

    let mut waiters = Vec::new();
    for identity in [1u32, 2] {
        let task = table.attach();
        let registry = registry.clone();
        waiters.push(thread::spawn(move || {
            registry.wait(&task, identity, Op::Flush, || true, Some(Duration::from_secs(1)))
        }));
    }

    let bystander_task = table.attach();
    let bystander = {
        let registry = registry.clone();
        thread::spawn(move || {
            registry.wait(&bystander_task, 3, Op::Read, || true, Some(Duration::from_secs(1)))
        })
    };

    // Wait until all three are registered.
    while registry.len() < 3 {
        thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(
        registry.notify_all(&Op::Flush, 7).unwrap(),
        WakeResult::Woken(2)
    );
    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Ok(7));
    }

    // The Read waiter was untouched by the Flush broadcast.
    assert!(registry.is_registered(&3));
    registry.notify(&3, &Op::Read, 9).unwrap();
    assert_eq!(bystander.join().unwrap(), Ok(9));
}

#[test]
fn test_kind_mismatch_leaves_waiter_suspended() {
    let (table, registry) = setup();
    let task = table.attach();

    let waiter = {
        let registry = registry.clone();
        thread::spawn(move || registry.wait(&task, 5, Op::Read, || true, Some(Duration::from_millis(500))))
    };

    thread::sleep(Duration::from_millis(50));
    assert_eq!(
        registry.notify(&5, &Op::Flush, 1).unwrap(),
        WakeResult::NoWaiters
    );
    assert!(registry.is_registered(&5));

    assert_eq!(
        registry.notify(&5, &Op::Read, 2).unwrap(),
        WakeResult::Woken(1)
    );
    assert_eq!(waiter.join().unwrap(), Ok(2));
}

#[test]
fn test_aborted_identity_can_wait_again() {
    let (table, registry) = setup();
    let task = table.attach();

    let outcome = registry.wait(&task, 5, Op::Read, || false, None);
    assert_eq!(outcome, Err(RegistryError::ArmAborted));
    assert!(!registry.is_registered(&5));
    assert!(task.slot().is_empty());

    let outcome = registry.wait(&task, 5, Op::Read, || true, Some(Duration::ZERO));
    assert_eq!(outcome, Err(RegistryError::Timeout));
}

#[test]
fn test_notify_during_arm_window_is_observed() {
    let (table, registry) = setup();
    let task = table.attach();

    let outcome = registry.wait(
        &task,
        5,
        Op::Read,
        || {
            registry.notify(&5, &Op::Read, 0xBEEF).unwrap();
            true
        },
        Some(Duration::ZERO),
    );
    assert_eq!(outcome, Ok(0xBEEF));
}

#[test]
fn test_redelivery_overwrites_pending_value() {
    let (table, registry) = setup();
    let task = table.attach();

    let registration = registry.register(&task, 5, Op::Read).unwrap();
    registry.notify(&5, &Op::Read, 1).unwrap();
    registry.notify(&5, &Op::Read, 2).unwrap();
    drop(registration);

    // Only the last delivery survives.
    assert_eq!(task.slot().try_receive(), Some(2));
    assert_eq!(task.slot().try_receive(), None);
}

#[test]
fn test_notify_without_waiters_is_a_miss() {
    let (_table, registry) = setup();
    assert_eq!(
        registry.notify(&5, &Op::Read, 1).unwrap(),
        WakeResult::NoWaiters
    );
    assert_eq!(
        registry.notify_all(&Op::Flush, 1).unwrap(),
        WakeResult::NoWaiters
    );
}

#[test]
fn test_concurrent_waiters_with_distinct_identities() {
    let (table, registry) = setup();

    let mut waiters = Vec::new();
    for identity in 0u32..8 {
        let task = table.attach();
        let registry = registry.clone();
        waiters.push(thread::spawn(move || {
            registry.wait(&task, identity, Op::Read, || true, Some(Duration::from_secs(1)))
        }));
    }

    while registry.len() < 8 {
        thread::sleep(Duration::from_millis(10));
    }

    // Each waiter gets its own value.
    for identity in 0u32..8 {
        assert_eq!(
            registry.notify(&identity, &Op::Read, identity * 10).unwrap(),
            WakeResult::Woken(1)
        );
    }

    for (identity, waiter) in waiters.into_iter().enumerate() {
        assert_eq!(waiter.join().unwrap(), Ok(identity as u32 * 10));
    }
    assert!(registry.is_empty());
}
