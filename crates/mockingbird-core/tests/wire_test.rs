//! Wire rendering: identifier pairs, computed defaults, nested author,
//! reply metadata, the entities block, extras overrides and fail-fast
//! rejection of unmodeled option flags.

use mockingbird_core::entity::{DirectMessage, DmId, Message, MessageId, UserId};
use mockingbird_core::error::ServiceError;
use mockingbird_core::service::Service;
use mockingbird_core::wire::{DmRenderOptions, MessageRenderOptions, render_dm, render_message, render_user};
use serde_json::{Value, json};

fn setup() -> (Service, UserId, UserId) {
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");
    let bob = service.new_user("bob", "Bob");
    (service, alice, bob)
}

#[test]
fn identifier_pair_is_consistent_for_every_kind() {
    let (mut service, alice, bob) = setup();
    let message = service.new_message("hello", alice, None).expect("create");
    let dm = service.new_dm("psst", alice, bob).expect("create");

    let store = service.store();
    for map in [
        render_user(store.user(alice).expect("user")),
        render_message(store.message(message).expect("message"), store, &MessageRenderOptions::default())
            .expect("render"),
        render_dm(store.dm(dm).expect("dm"), store, &DmRenderOptions::default()).expect("render"),
    ] {
        let id = map.get("id").and_then(Value::as_u64).expect("id");
        let id_str = map.get("id_str").and_then(Value::as_str).expect("id_str");
        assert_eq!(id_str.parse::<u64>().expect("numeric"), id);
    }
}

#[test]
fn message_defaults_and_derived_flags() {
    let (mut service, alice, _) = setup();
    let id = service.new_message("hello", alice, None).expect("create");
    let store = service.store();
    let map = render_message(store.message(id).expect("message"), store, &MessageRenderOptions::default())
        .expect("render");

    assert_eq!(map.get("text"), Some(&json!("hello")));
    assert_eq!(map.get("favorite_count"), Some(&json!(0)));
    assert_eq!(map.get("favorited"), Some(&json!(false)));
    assert_eq!(map.get("retweet_count"), Some(&json!(0)));
    assert_eq!(map.get("retweeted"), Some(&json!(false)));
    assert_eq!(map.get("filter_level"), Some(&json!("medium")));
    assert_eq!(map.get("source"), Some(&json!("web")));

    let user = map.get("user").and_then(Value::as_object).expect("user");
    assert_eq!(user.get("screen_name"), Some(&json!("alice")));
    assert_eq!(user.get("name"), Some(&json!("Alice")));
}

#[test]
fn trim_user_embeds_only_the_identifier_pair() {
    let (mut service, alice, _) = setup();
    let id = service.new_message("hello", alice, None).expect("create");
    let store = service.store();
    let options = MessageRenderOptions { trim_user: Some(true), ..Default::default() };
    let map =
        render_message(store.message(id).expect("message"), store, &options).expect("render");

    let user = map.get("user").and_then(Value::as_object).expect("user");
    assert_eq!(user.len(), 2);
    assert_eq!(user.get("id"), Some(&json!(1000)));
    assert_eq!(user.get("id_str"), Some(&json!("1000")));
}

#[test]
fn extras_override_any_computed_field() {
    let (mut service, alice, _) = setup();
    let id = service
        .add_message(
            Message::new(MessageId(1000), "hello", alice)
                .with_extra("favorite_count", json!(7))
                .with_extra("source", json!("test rig")),
        )
        .expect("insert");
    let store = service.store();
    let map = render_message(store.message(id).expect("message"), store, &MessageRenderOptions::default())
        .expect("render");

    assert_eq!(map.get("favorite_count"), Some(&json!(7)));
    assert_eq!(map.get("source"), Some(&json!("test rig")));
    // The derived flag was computed from the default count, not the
    // override; overrides win only for the keys they name.
    assert_eq!(map.get("favorited"), Some(&json!(false)));
}

#[test]
fn entities_block_lists_mentions() {
    let (mut service, alice, bob) = setup();
    let id = service.new_message("hi @alice", bob, None).expect("create");
    let store = service.store();
    let map = render_message(store.message(id).expect("message"), store, &MessageRenderOptions::default())
        .expect("render");

    assert_eq!(
        map.get("entities"),
        Some(&json!({
            "user_mentions": [{
                "id": alice.value(),
                "id_str": alice.to_string(),
                "screen_name": "alice",
                "name": "Alice",
                "indices": [3, 9],
            }],
        }))
    );
}

#[test]
fn explicit_include_entities_false_removes_the_block_even_from_extras() {
    let (mut service, alice, _) = setup();
    let id = service
        .add_message(
            Message::new(MessageId(1000), "hello", alice)
                .with_extra("entities", json!({"user_mentions": ["injected"]})),
        )
        .expect("insert");
    let store = service.store();
    let options = MessageRenderOptions { include_entities: Some(false), ..Default::default() };
    let map =
        render_message(store.message(id).expect("message"), store, &options).expect("render");
    assert!(!map.contains_key("entities"));
}

#[test]
fn explicit_reply_target_populates_status_and_user_fields() {
    let (mut service, alice, bob) = setup();
    let original = service.new_message("first", alice, None).expect("create");
    let reply = service.new_message("a reply", bob, Some(original)).expect("create");

    let store = service.store();
    let map = render_message(store.message(reply).expect("message"), store, &MessageRenderOptions::default())
        .expect("render");

    assert_eq!(map.get("in_reply_to_status_id"), Some(&json!(1000)));
    assert_eq!(map.get("in_reply_to_status_id_str"), Some(&json!("1000")));
    assert_eq!(map.get("in_reply_to_user_id"), Some(&json!(alice.value())));
    assert_eq!(map.get("in_reply_to_user_id_str"), Some(&json!(alice.to_string())));
    assert_eq!(map.get("in_reply_to_screen_name"), Some(&json!("alice")));
}

#[test]
fn deleted_reply_target_keeps_stale_status_id_and_omits_user_fields() {
    let (mut service, alice, bob) = setup();
    let original = service.new_message("first", alice, None).expect("create");
    let reply = service.new_message("a reply", bob, Some(original)).expect("create");
    service.store_mut().remove_message(original).expect("remove");

    let store = service.store();
    let map = render_message(store.message(reply).expect("message"), store, &MessageRenderOptions::default())
        .expect("render");

    assert_eq!(map.get("in_reply_to_status_id"), Some(&json!(1000)));
    assert_eq!(map.get("in_reply_to_status_id_str"), Some(&json!("1000")));
    assert!(!map.contains_key("in_reply_to_user_id"));
    assert!(!map.contains_key("in_reply_to_screen_name"));
}

#[test]
fn leading_mention_implies_the_reply_target_user() {
    let (mut service, alice, bob) = setup();
    let id = service.new_message("@alice how are you", bob, None).expect("create");

    let store = service.store();
    let map = render_message(store.message(id).expect("message"), store, &MessageRenderOptions::default())
        .expect("render");

    // No explicit target, so no status-id fields; the user fields come
    // from the leading mention.
    assert!(!map.contains_key("in_reply_to_status_id"));
    assert_eq!(map.get("in_reply_to_user_id"), Some(&json!(alice.value())));
    assert_eq!(map.get("in_reply_to_screen_name"), Some(&json!("alice")));
}

#[test]
fn mid_text_mention_implies_nothing() {
    let (mut service, _, bob) = setup();
    let id = service.new_message("so @alice walks in", bob, None).expect("create");

    let store = service.store();
    let map = render_message(store.message(id).expect("message"), store, &MessageRenderOptions::default())
        .expect("render");
    assert!(!map.contains_key("in_reply_to_user_id"));
}

#[test]
fn unmodeled_flags_fail_fast() {
    let (mut service, alice, _) = setup();
    let id = service.new_message("hello", alice, None).expect("create");
    let store = service.store();
    let message = store.message(id).expect("message");

    let contributor =
        MessageRenderOptions { contributor_details: Some(false), ..Default::default() };
    assert!(matches!(
        render_message(message, store, &contributor),
        Err(ServiceError::UnsupportedFeature { .. })
    ));

    let my_retweet =
        MessageRenderOptions { include_my_retweet: Some(true), ..Default::default() };
    assert!(matches!(
        render_message(message, store, &my_retweet),
        Err(ServiceError::UnsupportedFeature { .. })
    ));
}

#[test]
fn dm_rendering_embeds_both_parties() {
    let (mut service, alice, bob) = setup();
    let id = service.new_dm("psst @bob", alice, bob).expect("create");
    let store = service.store();
    let map =
        render_dm(store.dm(id).expect("dm"), store, &DmRenderOptions::default()).expect("render");

    assert_eq!(map.get("sender_id"), Some(&json!(alice.value())));
    assert_eq!(map.get("sender_id_str"), Some(&json!(alice.to_string())));
    assert_eq!(map.get("recipient_id"), Some(&json!(bob.value())));
    assert_eq!(map.get("recipient_id_str"), Some(&json!(bob.to_string())));

    let sender = map.get("sender").and_then(Value::as_object).expect("sender");
    assert_eq!(sender.get("screen_name"), Some(&json!("alice")));
    let recipient = map.get("recipient").and_then(Value::as_object).expect("recipient");
    assert_eq!(recipient.get("screen_name"), Some(&json!("bob")));

    let entities = map.get("entities").and_then(Value::as_object).expect("entities");
    let mentions = entities.get("user_mentions").and_then(Value::as_array).expect("mentions");
    assert_eq!(mentions.len(), 1);

    let skip = DmRenderOptions { skip_status: Some(false), ..Default::default() };
    assert!(matches!(
        render_dm(store.dm(id).expect("dm"), store, &skip),
        Err(ServiceError::UnsupportedFeature { .. })
    ));
}

#[test]
fn rendering_with_unregistered_author_is_not_found() {
    let (mut service, _, _) = setup();
    // Inserted through the store directly: no broadcast, no author check.
    service.store_mut().add_message(Message::new(MessageId(77), "orphan", UserId(4242)));

    let store = service.store();
    let err = render_message(
        store.message(MessageId(77)).expect("message"),
        store,
        &MessageRenderOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[test]
fn dm_ids_allocate_independently() {
    let (mut service, alice, bob) = setup();
    let dm = service.new_dm("one", alice, bob).expect("create");
    assert_eq!(dm, DmId(1000));
    let message = service.new_message("one", alice, None).expect("create");
    assert_eq!(message, MessageId(1000));
}

#[test]
fn user_extras_merge_last() {
    let mut service = Service::new();
    let id = service.store_mut().allocate_user_id();
    service.add_user(
        mockingbird_core::entity::User::new(id, "alice", "Alice")
            .with_extra("verified", json!(true))
            .with_extra("name", json!("Overridden")),
    );
    let map = render_user(service.store().user(id).expect("user"));
    assert_eq!(map.get("verified"), Some(&json!(true)));
    assert_eq!(map.get("name"), Some(&json!("Overridden")));
}
