//! Canonical wire rendering.
//!
//! Each renderer builds the entity's wire mapping in a fixed order:
//! base fields, computed defaults, derived flags, nested author, reply
//! metadata, the `entities` block, and merges the entity's `extras`
//! override map last, so test setup can replace any computed field. The
//! `entities` key is removed after the merge when entity inclusion is
//! explicitly disabled, so an override cannot smuggle it back in.
//!
//! Option flags that exist on the real API but are not modeled here fail
//! fast with [`ServiceError::UnsupportedFeature`] before any output is
//! produced.

use serde_json::{Map, Value, json};

use crate::entity::{DirectMessage, EntityKind, Message, User, UserId, format_created_at};
use crate::error::ServiceError;
use crate::mention::{Mention, extract_mentions, leading_mention};
use crate::store::EntityStore;

/// Rendering options for a [`Message`].
///
/// Every field is individually optional; `None` means the documented
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRenderOptions {
    /// Embed only the author's identifier pair instead of the full user.
    /// Default `false`.
    pub trim_user: Option<bool>,
    /// Not modeled; `Some(true)` fails with `UnsupportedFeature`.
    pub include_my_retweet: Option<bool>,
    /// Include the `entities` block. Default `true`.
    pub include_entities: Option<bool>,
    /// Not modeled; any supplied value fails with `UnsupportedFeature`.
    pub contributor_details: Option<bool>,
}

/// Rendering options for a [`DirectMessage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DmRenderOptions {
    /// Include the `entities` block. Default `true`.
    pub include_entities: Option<bool>,
    /// Not modeled; any supplied value fails with `UnsupportedFeature`.
    pub skip_status: Option<bool>,
}

/// The `{id, id_str}` pair for a user identifier.
fn user_id_pair(id: UserId) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("id".into(), Value::from(id.value()));
    map.insert("id_str".into(), Value::from(id.to_string()));
    map
}

/// Render mention records as the `entities.user_mentions` array.
fn mention_records(mentions: &[Mention]) -> Value {
    Value::Array(
        mentions
            .iter()
            .map(|m| {
                json!({
                    "id": m.user_id.value(),
                    "id_str": m.user_id.to_string(),
                    "screen_name": m.screen_name,
                    "name": m.name,
                    "indices": [m.span[0], m.span[1]],
                })
            })
            .collect(),
    )
}

/// The `entities` block for a body text.
fn entities_block(store: &EntityStore, text: &str) -> Value {
    let mentions = extract_mentions(store, text);
    json!({ "user_mentions": mention_records(&mentions) })
}

/// Render a user to its wire mapping.
///
/// `{id, id_str, screen_name, name, created_at}` with extras merged over
/// the result.
pub fn render_user(user: &User) -> Map<String, Value> {
    let mut out = user_id_pair(user.id);
    out.insert("screen_name".into(), Value::from(user.screen_name.clone()));
    out.insert("name".into(), Value::from(user.name.clone()));
    out.insert("created_at".into(), Value::from(format_created_at(user.created_at)));
    for (key, value) in &user.extras {
        out.insert(key.clone(), value.clone());
    }
    out
}

/// Reply-target fields for a message.
///
/// An explicit `reply_to` always yields the status-id pair; the
/// replied-to author's fields are added when the target message still
/// exists (a deleted target keeps the stale id fields and nothing else).
/// Without an explicit target, a text that begins with a resolvable
/// mention supplies the `in_reply_to_user_*` fields and no status-id
/// pair.
fn reply_fields(message: &Message, store: &EntityStore, out: &mut Map<String, Value>) {
    let reply_user = |out: &mut Map<String, Value>, id: UserId, screen_name: &str| {
        out.insert("in_reply_to_user_id".into(), Value::from(id.value()));
        out.insert("in_reply_to_user_id_str".into(), Value::from(id.to_string()));
        out.insert("in_reply_to_screen_name".into(), Value::from(screen_name.to_owned()));
    };

    if let Some(target_id) = message.reply_to {
        out.insert("in_reply_to_status_id".into(), Value::from(target_id.value()));
        out.insert("in_reply_to_status_id_str".into(), Value::from(target_id.to_string()));
        if let Some(target) = store.message(target_id)
            && let Some(author) = store.user(target.author)
        {
            reply_user(out, author.id, &author.screen_name);
        }
    } else if let Some(mention) = leading_mention(store, &message.text) {
        reply_user(out, mention.user_id, &mention.screen_name);
    }
}

/// Render a message to its wire mapping.
pub fn render_message(
    message: &Message,
    store: &EntityStore,
    options: &MessageRenderOptions,
) -> Result<Map<String, Value>, ServiceError> {
    if options.contributor_details.is_some() {
        return Err(ServiceError::unsupported("contributor_details parameter"));
    }
    if options.include_my_retweet == Some(true) {
        return Err(ServiceError::unsupported("include_my_retweet parameter"));
    }
    let trim_user = options.trim_user.unwrap_or(false);
    let include_entities = options.include_entities.unwrap_or(true);

    let mut out = Map::new();
    out.insert("id".into(), Value::from(message.id.value()));
    out.insert("id_str".into(), Value::from(message.id.to_string()));
    out.insert("text".into(), Value::from(message.text.clone()));
    out.insert("created_at".into(), Value::from(format_created_at(message.created_at)));

    // Defaults. Favorite/retweet mutation is not modeled, so the counts
    // stay at zero and the flags derived from them stay false.
    out.insert("favorite_count".into(), Value::from(0));
    out.insert("favorited".into(), Value::from(false));
    out.insert("retweet_count".into(), Value::from(0));
    out.insert("retweeted".into(), Value::from(false));
    out.insert("filter_level".into(), Value::from("medium"));
    out.insert("source".into(), Value::from("web"));

    if trim_user {
        out.insert("user".into(), Value::Object(user_id_pair(message.author)));
    } else {
        let author = store
            .user(message.author)
            .ok_or_else(|| ServiceError::not_found(EntityKind::User, message.author))?;
        out.insert("user".into(), Value::Object(render_user(author)));
    }

    reply_fields(message, store, &mut out);
    out.insert("entities".into(), entities_block(store, &message.text));

    for (key, value) in &message.extras {
        out.insert(key.clone(), value.clone());
    }
    if !include_entities {
        out.remove("entities");
    }
    Ok(out)
}

/// Render a direct message to its wire mapping.
pub fn render_dm(
    dm: &DirectMessage,
    store: &EntityStore,
    options: &DmRenderOptions,
) -> Result<Map<String, Value>, ServiceError> {
    if options.skip_status.is_some() {
        return Err(ServiceError::unsupported("skip_status parameter"));
    }
    let include_entities = options.include_entities.unwrap_or(true);

    let sender =
        store.user(dm.sender).ok_or_else(|| ServiceError::not_found(EntityKind::User, dm.sender))?;
    let recipient = store
        .user(dm.recipient)
        .ok_or_else(|| ServiceError::not_found(EntityKind::User, dm.recipient))?;

    let mut out = Map::new();
    out.insert("id".into(), Value::from(dm.id.value()));
    out.insert("id_str".into(), Value::from(dm.id.to_string()));
    out.insert("text".into(), Value::from(dm.text.clone()));
    out.insert("created_at".into(), Value::from(format_created_at(dm.created_at)));

    out.insert("sender".into(), Value::Object(render_user(sender)));
    out.insert("sender_id".into(), Value::from(dm.sender.value()));
    out.insert("sender_id_str".into(), Value::from(dm.sender.to_string()));
    out.insert("recipient".into(), Value::Object(render_user(recipient)));
    out.insert("recipient_id".into(), Value::from(dm.recipient.value()));
    out.insert("recipient_id_str".into(), Value::from(dm.recipient.to_string()));

    out.insert("entities".into(), entities_block(store, &dm.text));

    for (key, value) in &dm.extras {
        out.insert(key.clone(), value.clone());
    }
    if !include_entities {
        out.remove("entities");
    }
    Ok(out)
}
