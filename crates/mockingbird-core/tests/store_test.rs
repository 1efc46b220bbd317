//! Store-level behavior: identifier allocation, lookups, deletion and the
//! lazy message iterators.

use mockingbird_core::entity::{EntityKind, Message, MessageId, UserId};
use mockingbird_core::error::ServiceError;
use mockingbird_core::service::Service;

#[test]
fn counters_start_at_1000_and_step_by_10() {
    let mut service = Service::new();
    let a = service.new_user("alice", "Alice");
    let b = service.new_user("bob", "Bob");
    assert_eq!(a, UserId(1000));
    assert_eq!(b, UserId(1010));

    let m1 = service.new_message("first", a, None).expect("create message");
    let m2 = service.new_message("second", a, None).expect("create message");
    assert_eq!(m1, MessageId(1000));
    assert_eq!(m2, MessageId(1010));

    // Counters are independent per entity kind.
    let dm = service.new_dm("psst", a, b).expect("create dm");
    assert_eq!(dm.value(), 1000);
}

#[test]
fn round_trip_preserves_text() {
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");
    let id = service.new_message("hello world", alice, None).expect("create message");

    let message = service.store().message(id).expect("message exists");
    assert_eq!(message.text, "hello world");
    assert_eq!(message.author, alice);
}

#[test]
fn get_absent_is_none_and_remove_absent_is_not_found() {
    let mut service = Service::new();
    assert!(service.store().message(MessageId(9999)).is_none());

    let err = service.store_mut().remove_message(MessageId(9999)).unwrap_err();
    assert_eq!(
        err,
        ServiceError::NotFound { kind: EntityKind::Message, id: "9999".to_owned() }
    );
}

#[test]
fn delete_then_fetch_is_absent() {
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");
    let id = service.new_message("short lived", alice, None).expect("create message");

    service.store_mut().remove_message(id).expect("remove");
    assert!(service.store().message(id).is_none());
}

#[test]
fn screen_name_lookup_is_case_sensitive() {
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");

    let found = service.store().user_by_screen_name("alice").expect("found");
    assert_eq!(found.id, alice);
    assert!(service.store().user_by_screen_name("Alice").is_none());
}

#[test]
fn messages_from_filters_by_author() {
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");
    let bob = service.new_user("bob", "Bob");
    service.new_message("by alice", alice, None).expect("create");
    service.new_message("by bob", bob, None).expect("create");
    service.new_message("also alice", alice, None).expect("create");

    let mut texts: Vec<&str> =
        service.store().messages_from(alice).map(|m| m.text.as_str()).collect();
    texts.sort_unstable();
    assert_eq!(texts, vec!["also alice", "by alice"]);
}

#[test]
fn messages_mentioning_is_a_literal_substring_scan() {
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");
    let bob = service.new_user("bob", "Bob");
    service.new_message("hi @alice", bob, None).expect("create");
    service.new_message("hi @alicederp", bob, None).expect("create");
    service.new_message("no mention", bob, None).expect("create");

    // The store scan is substring-based; `@alice` is contained in
    // `@alicederp` too. Resolved mention records are computed at
    // rendering time instead.
    let count = service.store().messages_mentioning(alice).expect("known user").count();
    assert_eq!(count, 2);

    let err = service.store().messages_mentioning(UserId(4242)).map(|_| ()).unwrap_err();
    assert_eq!(err, ServiceError::NotFound { kind: EntityKind::User, id: "4242".to_owned() });
}

#[test]
fn caller_supplied_entities_keep_their_identifier() {
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");
    let id = service
        .add_message(Message::new(MessageId(555), "explicit id", alice))
        .expect("insert");
    assert_eq!(id, MessageId(555));

    // The allocation counter is unaffected by explicit inserts.
    let next = service.new_message("allocated", alice, None).expect("create");
    assert_eq!(next, MessageId(1000));
}
