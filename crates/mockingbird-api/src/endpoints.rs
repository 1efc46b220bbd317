//! Registered endpoint handlers.
//!
//! The implemented surface is the documented subset of the real API; most
//! of the real service's endpoints are intentionally absent. Endpoints
//! that exist on the real service and are recognized here but not modeled
//! (home timeline, retweets) are registered so they fail fast with
//! `UnsupportedFeature` instead of being mistaken for unroutable paths.

use mockingbird_core::entity::{DirectMessage, EntityKind, Message, UserId};
use mockingbird_core::error::ServiceError;
use mockingbird_core::service::Service;
use mockingbird_core::store::EntityStore;
use mockingbird_core::timeline::{TimelineQuery, filter_timeline};
use mockingbird_core::wire::{DmRenderOptions, MessageRenderOptions, render_dm, render_message};
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::dispatch::{Endpoint, HostClass, Response, StreamHandle};
use crate::params::{
    ParamMap, opt_bool, opt_message_id, opt_str, opt_term_list, opt_u64, opt_user_id,
    opt_user_id_list, opt_usize, require, require_message_id,
};

/// The static registration table.
pub(crate) fn table() -> Vec<Endpoint> {
    vec![
        Endpoint {
            host: HostClass::Api,
            path: "statuses/mentions_timeline.json",
            params: &[
                "count",
                "since_id",
                "max_id",
                "trim_user",
                "contributor_details",
                "include_entities",
            ],
            handler: statuses_mentions_timeline,
        },
        Endpoint {
            host: HostClass::Api,
            path: "statuses/user_timeline.json",
            params: &[
                "user_id",
                "screen_name",
                "since_id",
                "count",
                "max_id",
                "trim_user",
                "exclude_replies",
                "contributor_details",
                "include_rts",
            ],
            handler: statuses_user_timeline,
        },
        Endpoint {
            host: HostClass::Api,
            path: "statuses/home_timeline.json",
            params: &[
                "count",
                "since_id",
                "max_id",
                "trim_user",
                "exclude_replies",
                "contributor_details",
                "include_entities",
            ],
            handler: statuses_home_timeline,
        },
        Endpoint {
            host: HostClass::Api,
            path: "statuses/retweets.json",
            params: &["id", "count", "trim_user"],
            handler: statuses_retweets,
        },
        Endpoint {
            host: HostClass::Api,
            path: "statuses/show.json",
            params: &["id", "trim_user", "include_my_retweet", "include_entities"],
            handler: statuses_show,
        },
        Endpoint {
            host: HostClass::Api,
            path: "statuses/destroy.json",
            params: &["id", "trim_user"],
            handler: statuses_destroy,
        },
        Endpoint {
            host: HostClass::Api,
            path: "statuses/update.json",
            params: &[
                "status",
                "in_reply_to_status_id",
                "lat",
                "long",
                "place_id",
                "display_coordinates",
                "trim_user",
            ],
            handler: statuses_update,
        },
        Endpoint {
            host: HostClass::Api,
            path: "statuses/retweet.json",
            params: &["id", "trim_user"],
            handler: statuses_retweet,
        },
        Endpoint {
            host: HostClass::Api,
            path: "direct_messages.json",
            params: &["since_id", "max_id", "count", "include_entities", "skip_status"],
            handler: direct_messages,
        },
        Endpoint {
            host: HostClass::Stream,
            path: "statuses/filter.json",
            params: &["follow", "track", "locations", "stall_warnings"],
            handler: stream_statuses_filter,
        },
        Endpoint {
            host: HostClass::UserStream,
            path: "user.json",
            params: &["stringify_friend_ids", "with", "replies", "stall_warnings"],
            handler: userstream_user,
        },
    ]
}

/// Bound/count parameters shared by the feed endpoints.
fn timeline_query(params: &ParamMap) -> Result<TimelineQuery, ServiceError> {
    Ok(TimelineQuery {
        count: opt_usize(params, "count")?,
        since_id: opt_u64(params, "since_id")?,
        max_id: opt_u64(params, "max_id")?,
    })
}

/// Render a filtered message feed to a JSON array.
fn render_feed(
    messages: &[&Message],
    store: &EntityStore,
    options: &MessageRenderOptions,
) -> Result<Response, ServiceError> {
    let rendered = messages
        .iter()
        .map(|message| render_message(message, store, options).map(Value::Object))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Response::Json(Value::Array(rendered)))
}

fn statuses_mentions_timeline(
    service: &mut Service,
    identity: UserId,
    params: &ParamMap,
) -> Result<Response, ServiceError> {
    let query = timeline_query(params)?;
    let options = MessageRenderOptions {
        trim_user: opt_bool(params, "trim_user")?,
        include_my_retweet: None,
        include_entities: opt_bool(params, "include_entities")?,
        contributor_details: opt_bool(params, "contributor_details")?,
    };
    let store = service.store();
    let messages = filter_timeline(store.messages_mentioning(identity)?, &query);
    render_feed(&messages, store, &options)
}

fn statuses_user_timeline(
    service: &mut Service,
    _identity: UserId,
    params: &ParamMap,
) -> Result<Response, ServiceError> {
    let store = service.store();
    let target = match (opt_user_id(params, "user_id")?, opt_str(params, "screen_name")) {
        (Some(id), None) => {
            store.user(id).ok_or_else(|| ServiceError::not_found(EntityKind::User, id))?.id
        },
        (None, Some(screen_name)) => store
            .user_by_screen_name(screen_name)
            .ok_or_else(|| ServiceError::not_found(EntityKind::User, screen_name))?
            .id,
        _ => {
            return Err(ServiceError::unsupported(
                "user_timeline requires exactly one of user_id/screen_name",
            ));
        },
    };
    if params.contains_key("include_rts") {
        return Err(ServiceError::unsupported("include_rts parameter"));
    }

    let query = timeline_query(params)?;
    let options = MessageRenderOptions {
        trim_user: opt_bool(params, "trim_user")?,
        include_my_retweet: None,
        include_entities: None,
        contributor_details: opt_bool(params, "contributor_details")?,
    };
    let mut messages = filter_timeline(store.messages_from(target), &query);
    if opt_bool(params, "exclude_replies")?.unwrap_or(false) {
        messages.retain(|message| message.reply_to.is_none());
    }
    render_feed(&messages, store, &options)
}

fn statuses_home_timeline(
    _service: &mut Service,
    _identity: UserId,
    _params: &ParamMap,
) -> Result<Response, ServiceError> {
    Err(ServiceError::unsupported("home_timeline endpoint"))
}

fn statuses_retweets(
    _service: &mut Service,
    _identity: UserId,
    _params: &ParamMap,
) -> Result<Response, ServiceError> {
    Err(ServiceError::unsupported("retweets endpoint"))
}

fn statuses_show(
    service: &mut Service,
    _identity: UserId,
    params: &ParamMap,
) -> Result<Response, ServiceError> {
    let id = require_message_id(params, "id")?;
    let options = MessageRenderOptions {
        trim_user: opt_bool(params, "trim_user")?,
        include_my_retweet: opt_bool(params, "include_my_retweet")?,
        include_entities: opt_bool(params, "include_entities")?,
        contributor_details: None,
    };
    let store = service.store();
    let message =
        store.message(id).ok_or_else(|| ServiceError::not_found(EntityKind::Message, id))?;
    Ok(Response::Json(Value::Object(render_message(message, store, &options)?)))
}

fn statuses_destroy(
    service: &mut Service,
    identity: UserId,
    params: &ParamMap,
) -> Result<Response, ServiceError> {
    let id = require_message_id(params, "id")?;
    let options = MessageRenderOptions {
        trim_user: opt_bool(params, "trim_user")?,
        include_my_retweet: None,
        include_entities: None,
        contributor_details: None,
    };
    let store = service.store();
    let message =
        store.message(id).ok_or_else(|| ServiceError::not_found(EntityKind::Message, id))?;
    if message.author != identity {
        return Err(ServiceError::OwnershipViolation {
            kind: EntityKind::Message,
            id: id.to_string(),
            owner: message.author.to_string(),
            caller: identity.to_string(),
        });
    }
    // Render before removal so the response carries the deleted message.
    let rendered = render_message(message, store, &options)?;
    service.store_mut().remove_message(id)?;
    Ok(Response::Json(Value::Object(rendered)))
}

fn statuses_update(
    service: &mut Service,
    identity: UserId,
    params: &ParamMap,
) -> Result<Response, ServiceError> {
    for geo in ["lat", "long", "place_id", "display_coordinates"] {
        if params.contains_key(geo) {
            return Err(ServiceError::unsupported(format!("{geo} parameter")));
        }
    }
    let status = require(params, "status")?.to_owned();
    let reply_to = opt_message_id(params, "in_reply_to_status_id")?;
    let options = MessageRenderOptions {
        trim_user: opt_bool(params, "trim_user")?,
        include_my_retweet: None,
        include_entities: None,
        contributor_details: None,
    };

    // Broadcast to matching subscriptions happens inside the factory,
    // before it returns.
    let id = service.new_message(status, identity, reply_to)?;
    let store = service.store();
    let message =
        store.message(id).ok_or_else(|| ServiceError::not_found(EntityKind::Message, id))?;
    Ok(Response::Json(Value::Object(render_message(message, store, &options)?)))
}

fn statuses_retweet(
    _service: &mut Service,
    _identity: UserId,
    _params: &ParamMap,
) -> Result<Response, ServiceError> {
    Err(ServiceError::unsupported("retweet endpoint"))
}

fn direct_messages(
    service: &mut Service,
    identity: UserId,
    params: &ParamMap,
) -> Result<Response, ServiceError> {
    let query = timeline_query(params)?;
    let options = DmRenderOptions {
        include_entities: opt_bool(params, "include_entities")?,
        skip_status: opt_bool(params, "skip_status")?,
    };
    let store = service.store();
    let received = store.dms().filter(|dm| dm.recipient == identity);
    let dms: Vec<&DirectMessage> = filter_timeline(received, &query);
    let rendered = dms
        .iter()
        .map(|dm| render_dm(dm, store, &options).map(Value::Object))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Response::Json(Value::Array(rendered)))
}

/// Compile a track term into the real service's word-boundary match.
fn track_pattern(term: &str) -> Result<Regex, ServiceError> {
    Regex::new(&format!(r"\b{}\b", regex::escape(term))).map_err(|_| {
        ServiceError::InvalidParameter { name: "track".to_owned(), value: term.to_owned() }
    })
}

fn stream_statuses_filter(
    service: &mut Service,
    _identity: UserId,
    params: &ParamMap,
) -> Result<Response, ServiceError> {
    if params.contains_key("locations") {
        return Err(ServiceError::unsupported("locations parameter"));
    }
    // stall_warnings is accepted and ignored: a buffering in-memory
    // channel never stalls.
    let follow = opt_user_id_list(params, "follow")?;
    let track: Vec<Regex> = opt_term_list(params, "track")
        .iter()
        .map(|term| track_pattern(term))
        .collect::<Result<_, _>>()?;

    let (id, channel) = service.streams_mut().open();
    service.streams_mut().set_message_predicate(id, move |message| {
        follow.contains(&message.author)
            || track.iter().any(|pattern| pattern.is_match(&message.text))
    });
    tracing::debug!(subscription = %id, "filter stream opened");
    Ok(Response::Stream(StreamHandle { id, channel }))
}

fn userstream_user(
    service: &mut Service,
    identity: UserId,
    params: &ParamMap,
) -> Result<Response, ServiceError> {
    // The real parameter is mandatory; its value changes nothing here
    // because friend ids are always stringified in the handshake.
    require(params, "stringify_friend_ids")?;
    match opt_str(params, "with") {
        Some("user") => {},
        _ => {
            // Follower graphs are not modeled, so the default
            // `with=followings` scope cannot be honored.
            return Err(ServiceError::unsupported("with parameter values other than \"user\""));
        },
    }

    let screen_name = service
        .store()
        .user(identity)
        .ok_or_else(|| ServiceError::not_found(EntityKind::User, identity))?
        .screen_name
        .clone();
    let mention = Regex::new(&format!(r"@{}\b", regex::escape(&screen_name))).map_err(|_| {
        ServiceError::InvalidParameter { name: "screen_name".to_owned(), value: screen_name.clone() }
    })?;

    let (id, channel) = service.streams_mut().open();
    let me = identity;
    service
        .streams_mut()
        .set_message_predicate(id, move |message| {
            message.author == me || mention.is_match(&message.text)
        });
    service
        .streams_mut()
        .set_dm_predicate(id, move |dm| dm.sender == me || dm.recipient == me);

    // Handshake precedes any entity delivery.
    let mut handshake = Map::new();
    handshake.insert("friends_str".to_owned(), json!([]));
    channel.push_record(handshake);

    tracing::debug!(subscription = %id, user = %identity, "user stream opened");
    Ok(Response::Stream(StreamHandle { id, channel }))
}
