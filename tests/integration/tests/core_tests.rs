//! ChatCore Integration Tests
//!
//! Drive the full stack (store, broker, facade, client session) in-process.
//!
//! Run with: cargo test -p integration-tests --test core_tests

use std::sync::Arc;
use std::time::Duration;

use chat_broker::{ChatClient, ChatCore, FnListener, SubscriptionHandle};
use chat_core::{ClientId, Connectivity, DomainError, Message, PresenceSnapshot};
use chat_store::StoreConfig;
use integration_tests::{
    ids, recorder, room, texts, unique_room, user, MemoryArchive, Recorded, TestCore,
};
use parking_lot::Mutex;

// ============================================================================
// Channel Store Properties
// ============================================================================

#[tokio::test]
async fn test_append_order_is_preserved() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    test.core.append(&lobby, &user("alice"), "earlier").unwrap();
    let m1 = test.core.append(&lobby, &user("alice"), "m1").unwrap();
    let m2 = test.core.append(&lobby, &user("bob"), "m2").unwrap();

    let recent = test.core.get_recent(&lobby, 200);
    assert_eq!(&recent[recent.len() - 2..], &[m1.clone(), m2.clone()]);
    assert!(m1.id < m2.id);
    assert!(m1.server_timestamp <= m2.server_timestamp);
}

#[tokio::test]
async fn test_blank_messages_rejected() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();
    test.core.append(&lobby, &user("alice"), "keep").unwrap();

    for text in ["", "   "] {
        let err = test.core.append(&lobby, &user("alice"), text).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    assert_eq!(texts(&test.core.get_recent(&lobby, 200)), vec!["keep"]);
}

#[tokio::test]
async fn test_history_is_bounded() {
    let test = TestCore::start_with_config(StoreConfig {
        history_limit: 5,
        ..StoreConfig::default()
    })
    .unwrap();
    let lobby = unique_room();

    for i in 1..=8 {
        test.core.append(&lobby, &user("alice"), &format!("m{i}")).unwrap();
    }

    let recent = test.core.get_recent(&lobby, 200);
    assert_eq!(ids(&recent), vec![4, 5, 6, 7, 8]);
    assert_eq!(ids(&test.core.get_recent(&lobby, 2)), vec![7, 8]);
}

#[tokio::test]
async fn test_typing_expires_without_refresh() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    test.core.set_typing(&lobby, &user("alice"), true).unwrap();
    test.advance(Duration::from_millis(1499));
    assert!(test.core.get_presence(&lobby, &user("bob")).contains(&user("alice")));

    test.advance(Duration::from_millis(1));
    assert!(test.core.get_presence(&lobby, &user("bob")).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_typing_expires_on_real_scheduler() {
    let core = ChatCore::builder().build().unwrap();
    let lobby = unique_room();

    core.set_typing(&lobby, &user("alice"), true).unwrap();
    tokio::time::sleep(Duration::from_millis(1400)).await;
    assert_eq!(core.get_presence(&lobby, &user("bob")).len(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(core.get_presence(&lobby, &user("bob")).is_empty());
}

#[tokio::test]
async fn test_clear_typing_is_immediate() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    test.core.set_typing(&lobby, &user("alice"), true).unwrap();
    test.advance(Duration::from_millis(700));
    test.core.set_typing(&lobby, &user("alice"), false).unwrap();
    assert!(test.core.get_presence(&lobby, &user("bob")).is_empty());

    // The cancelled expiry must not fire later
    assert_eq!(test.advance(Duration::from_secs(5)), 0);
}

#[tokio::test]
async fn test_refresh_racing_expiry_keeps_entry() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    test.core.set_typing(&lobby, &user("alice"), true).unwrap();
    test.advance(Duration::from_millis(1499));
    test.core.set_typing(&lobby, &user("alice"), true).unwrap();

    test.advance(Duration::from_millis(1));
    assert_eq!(test.core.get_presence(&lobby, &user("bob")).len(), 1);

    test.advance(Duration::from_millis(1499));
    assert!(test.core.get_presence(&lobby, &user("bob")).is_empty());
}

// ============================================================================
// Subscription Properties
// ============================================================================

#[tokio::test]
async fn test_backfill_then_live_exactly_once() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();
    for text in ["m1", "m2", "m3"] {
        test.core.append(&lobby, &user("alice"), text).unwrap();
    }

    let (listener, mut events) = recorder();
    let _handle = test
        .core
        .subscribe(ClientId::generate(), &lobby, listener)
        .unwrap();

    let backfill = events.messages(3).await.unwrap();
    assert_eq!(texts(&backfill), vec!["m1", "m2", "m3"]);
    assert!(events.next_presence().await.unwrap().is_empty());

    test.core.append(&lobby, &user("bob"), "m4").unwrap();
    let live = events.next_message().await.unwrap();
    assert_eq!(live.text, "m4");
    assert_eq!(live.id.into_inner(), 4);

    events.assert_quiet().await.unwrap();
}

#[tokio::test]
async fn test_room_switch_has_no_gaps_or_leaks() {
    let test = TestCore::start().unwrap();
    let (a, b) = (unique_room(), unique_room());
    let client = ClientId::generate();

    let (listener_a, mut events_a) = recorder();
    test.core.subscribe(client, &a, listener_a).unwrap();
    assert!(events_a.next_presence().await.unwrap().is_empty());

    test.core.append(&b, &user("bob"), "b1").unwrap();
    test.core.append(&b, &user("bob"), "b2").unwrap();

    let (listener_b, mut events_b) = recorder();
    test.core.subscribe(client, &b, listener_b).unwrap();
    test.core.append(&a, &user("bob"), "a-after").unwrap();
    test.core.append(&b, &user("bob"), "b3").unwrap();

    assert_eq!(texts(&events_b.messages(2).await.unwrap()), vec!["b1", "b2"]);
    events_b.next_presence().await.unwrap();
    assert_eq!(events_b.next_message().await.unwrap().text, "b3");

    events_a.assert_quiet().await.unwrap();
    events_b.assert_quiet().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_delivered_in_order() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    let (listener, mut events) = recorder();
    test.core
        .subscribe(ClientId::generate(), &lobby, listener)
        .unwrap();
    events.next_presence().await.unwrap();

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let core = test.core.clone();
            let lobby = lobby.clone();
            tokio::spawn(async move {
                for i in 0..25 {
                    core.append(&lobby, &user(&format!("writer{w}")), &format!("{w}-{i}"))
                        .unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap();
    }

    let received = events.messages(100).await.unwrap();
    assert_eq!(ids(&received), (1..=100).collect::<Vec<u64>>());
    assert_eq!(received, test.core.get_recent(&lobby, 200));
    events.assert_quiet().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_subscribe_during_appends_misses_nothing() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    let writer = {
        let core = test.core.clone();
        let lobby = lobby.clone();
        tokio::spawn(async move {
            for i in 0..150 {
                core.append(&lobby, &user("alice"), &format!("m{i}")).unwrap();
                if i % 10 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    tokio::task::yield_now().await;
    let (listener, mut events) = recorder();
    test.core
        .subscribe(ClientId::generate(), &lobby, listener)
        .unwrap();
    writer.await.unwrap();

    let mut seen = Vec::new();
    while seen.len() < 150 {
        match events.next().await.unwrap() {
            Recorded::Message(message) => seen.push(message.id.into_inner()),
            Recorded::Presence(_) => {}
        }
    }
    assert_eq!(seen, (1..=150).collect::<Vec<u64>>());
    events.assert_quiet().await.unwrap();
}

#[tokio::test]
async fn test_presence_snapshots_delivered() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    let (listener, mut events) = recorder();
    test.core
        .subscribe(ClientId::generate(), &lobby, listener)
        .unwrap();
    assert!(events.next_presence().await.unwrap().is_empty());

    test.core.set_typing(&lobby, &user("alice"), true).unwrap();
    test.core.set_typing(&lobby, &user("bob"), true).unwrap();
    test.core.set_typing(&lobby, &user("alice"), true).unwrap();

    let first = events.next_presence().await.unwrap();
    assert!(first.contains(&user("alice")));
    let second = events.next_presence().await.unwrap();
    assert_eq!(second.others(&user("alice")).collect::<Vec<_>>(), vec![&user("bob")]);
    events.assert_quiet().await.unwrap();

    // Bob's entry was never refreshed, so it expires first
    test.advance(Duration::from_millis(1500));
    assert_eq!(events.next_presence().await.unwrap().len(), 1);
    assert!(events.next_presence().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unsubscribe_inside_callback() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    let slot: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let listener = {
        let slot = slot.clone();
        let seen = seen.clone();
        FnListener::new(
            move |message: &Message| {
                seen.lock().push(message.text.clone());
                if let Some(handle) = slot.lock().as_ref() {
                    assert!(handle.unsubscribe());
                }
                Ok(())
            },
            |_: &PresenceSnapshot| Ok(()),
        )
    };

    let handle = test
        .core
        .subscribe(ClientId::generate(), &lobby, listener)
        .unwrap();
    *slot.lock() = Some(handle.clone());

    test.core.append(&lobby, &user("alice"), "first").unwrap();
    test.core.append(&lobby, &user("alice"), "second").unwrap();

    for _ in 0..50 {
        if !handle.is_active() {
            break;
        }
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!handle.is_active());
    assert_eq!(*seen.lock(), vec!["first".to_string()]);
    assert!(!test.core.unsubscribe(&handle));
}

#[tokio::test]
async fn test_failing_listener_is_isolated() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    let failing = FnListener::new(
        |message: &Message| {
            if message.text == "panic" {
                panic!("listener bug");
            }
            anyhow::bail!("cannot render {}", message.text)
        },
        |_: &PresenceSnapshot| Ok(()),
    );
    let broken = test
        .core
        .subscribe(ClientId::generate(), &lobby, failing)
        .unwrap();

    let (listener, mut events) = recorder();
    test.core
        .subscribe(ClientId::generate(), &lobby, listener)
        .unwrap();
    events.next_presence().await.unwrap();

    for text in ["one", "panic", "three"] {
        test.core.append(&lobby, &user("alice"), text).unwrap();
    }

    assert_eq!(texts(&events.messages(3).await.unwrap()), vec!["one", "panic", "three"]);
    for _ in 0..50 {
        if broken.failed_deliveries() == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(broken.failed_deliveries(), 3);
    assert!(broken.is_active());
}

#[tokio::test]
async fn test_unsubscribe_is_idempotent() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();

    let (listener, mut events) = recorder();
    let handle = test
        .core
        .subscribe(ClientId::generate(), &lobby, listener)
        .unwrap();
    events.next_presence().await.unwrap();

    assert!(test.core.unsubscribe(&handle));
    assert!(!test.core.unsubscribe(&handle));
    assert!(!handle.unsubscribe());

    test.core.append(&lobby, &user("alice"), "after").unwrap();
    events.assert_quiet().await.unwrap();
}

// ============================================================================
// Facade Lifecycle
// ============================================================================

#[tokio::test]
async fn test_connectivity_and_shutdown() {
    let test = TestCore::start().unwrap();
    let lobby = unique_room();
    let mut connectivity = test.core.connectivity();
    assert_eq!(*connectivity.borrow_and_update(), Connectivity::ONLINE);

    assert!(test.core.set_online(false));
    connectivity.changed().await.unwrap();
    assert!(test.core.set_online(true));
    connectivity.changed().await.unwrap();
    assert!(connectivity.borrow_and_update().is_online);

    let (listener, mut events) = recorder();
    let handle = test
        .core
        .subscribe(ClientId::generate(), &lobby, listener)
        .unwrap();
    events.next_presence().await.unwrap();
    test.core.set_typing(&lobby, &user("alice"), true).unwrap();
    events.next_presence().await.unwrap();

    test.core.shutdown();

    assert!(!handle.is_active());
    assert!(!connectivity.borrow_and_update().is_online);
    assert_eq!(test.advance(Duration::from_secs(2)), 0);
    assert_eq!(
        test.core.append(&lobby, &user("alice"), "late").unwrap_err(),
        DomainError::ShutDown
    );
    events.assert_quiet().await.unwrap();
}

#[tokio::test]
async fn test_archive_receives_appends() {
    let archive = Arc::new(MemoryArchive::default());
    let core = ChatCore::builder().archive(archive.clone()).build().unwrap();
    let lobby = unique_room();

    core.append(&lobby, &user("alice"), "one").unwrap();
    core.append(&lobby, &user("alice"), "two").unwrap();

    for _ in 0..50 {
        if archive.stored.lock().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let mut stored = archive.texts();
    stored.sort();
    assert_eq!(stored, vec!["one", "two"]);
}

#[tokio::test]
async fn test_archive_failure_is_not_retried_or_surfaced() {
    let archive = Arc::new(MemoryArchive::failing());
    let core = ChatCore::builder().archive(archive.clone()).build().unwrap();
    let lobby = unique_room();

    assert!(core.append(&lobby, &user("alice"), "kept").is_ok());
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(archive.texts().is_empty());
    assert_eq!(texts(&core.get_recent(&lobby, 10)), vec!["kept"]);
}

// ============================================================================
// Client Session
// ============================================================================

#[tokio::test]
async fn test_client_session_flow() {
    let test = TestCore::start().unwrap();
    let (general, dev) = (room("general"), room("dev"));

    let mut alice = ChatClient::new(test.core.clone(), user("alice"));
    let mut bob = ChatClient::new(test.core.clone(), user("bob"));

    let (alice_listener, mut alice_events) = recorder();
    alice.switch_room(general.clone(), alice_listener).unwrap();
    let (bob_listener, mut bob_events) = recorder();
    bob.switch_room(general.clone(), bob_listener).unwrap();
    alice_events.next_presence().await.unwrap();
    bob_events.next_presence().await.unwrap();

    alice.input_changed("he").unwrap();
    let typing = bob_events.next_presence().await.unwrap();
    assert_eq!(typing.others(bob.user()).collect::<Vec<_>>(), vec![&user("alice")]);
    assert_eq!(bob.typing_others().len(), 1);

    let sent = alice.send("hello").unwrap();
    assert_eq!(bob_events.next_message().await.unwrap(), sent);
    assert!(bob_events.next_presence().await.unwrap().is_empty());

    assert_eq!(alice_events.next_presence().await.unwrap().len(), 1);
    assert_eq!(alice_events.next_message().await.unwrap(), sent);
    assert!(alice_events.next_presence().await.unwrap().is_empty());

    let (dev_listener, mut dev_events) = recorder();
    assert!(alice.switch_room(dev.clone(), dev_listener).unwrap());
    assert_eq!(alice.room(), Some(&dev));
    dev_events.next_presence().await.unwrap();

    let reply = bob.send("anyone?").unwrap();
    assert_eq!(bob_events.next_message().await.unwrap(), reply);

    // Nothing from the old room reaches Alice after the switch
    alice_events.assert_quiet().await.unwrap();
    dev_events.assert_quiet().await.unwrap();

    alice.leave().unwrap();
    bob.leave().unwrap();
    assert!(test.core.subscription_of(alice.id()).is_none());
}
