//! Discovery of the event types carried by `GetEventsResponse`.
//!
//! The API declares every event as a variant of the `event` oneof on the
//! `GetEventsResponse` message. A variant field `exec` of type `Exec` is
//! exposed in Go through the wrapper `GetEventsResponse_Exec`; stripping the
//! wrapper prefix yields the name of the event message.

use std::collections::HashSet;

use crate::error::{CodegenError, Result};
use crate::schema::{File, Message};

/// Go name of the message whose oneof enumerates all events.
pub const ANCHOR_MESSAGE: &str = "GetEventsResponse";

/// Name of the oneof on the anchor message.
pub const EVENT_ONEOF: &str = "event";

/// Prefix of the Go wrapper types generated for the oneof variants.
pub const VARIANT_PREFIX: &str = "GetEventsResponse_";

/// Returns every top-level message of `file` that is a variant of
/// `GetEventsResponse.event`.
///
/// The result follows the declaration order of messages in the file, not
/// the order of the oneof fields.
///
/// # Errors
///
/// - [`CodegenError::AnchorMessageNotFound`] if the file declares no
///   `GetEventsResponse` message
/// - [`CodegenError::AnchorOneofNotFound`] if that message has no `event` oneof
pub fn discover_events<'f, 'a>(file: &'f File<'a>) -> Result<Vec<&'f Message<'a>>> {
    let anchor = file
        .messages
        .iter()
        .find(|m| m.go_ident.go_name == ANCHOR_MESSAGE)
        .ok_or_else(|| CodegenError::AnchorMessageNotFound(ANCHOR_MESSAGE.to_string()))?;

    let oneof = anchor
        .oneofs
        .iter()
        .find(|o| o.name() == EVENT_ONEOF)
        .ok_or_else(|| {
            CodegenError::AnchorOneofNotFound(format!("{ANCHOR_MESSAGE}.{EVENT_ONEOF}"))
        })?;

    // Variants that strip to the same name collapse into a single entry.
    let valid_names: HashSet<&str> = oneof
        .fields
        .iter()
        .map(|f| {
            let go_name = f.go_ident.go_name.as_str();
            go_name.strip_prefix(VARIANT_PREFIX).unwrap_or(go_name)
        })
        .collect();

    let events: Vec<&Message<'a>> = file
        .messages
        .iter()
        .filter(|m| valid_names.contains(m.name()))
        .collect();

    tracing::debug!(
        file = file.name(),
        variants = oneof.fields.len(),
        events = events.len(),
        "Discovered events"
    );

    Ok(events)
}

/// Returns true if the message declares a field with exactly this name.
pub fn has_field(msg: &Message<'_>, field: &str) -> bool {
    msg.field_by_name(field).is_some()
}

/// Returns true if the event carries a `process` field.
pub fn is_process_event(msg: &Message<'_>) -> bool {
    has_field(msg, "process")
}

/// Returns true if the event carries a `parent` field.
pub fn is_parent_event(msg: &Message<'_>) -> bool {
    has_field(msg, "parent")
}
