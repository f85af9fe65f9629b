//! Value objects - immutable types that represent domain concepts

mod client_id;
mod message_id;
mod room_name;
mod user_name;

pub use client_id::ClientId;
pub use message_id::{MessageId, MessageIdParseError};
pub use room_name::RoomName;
pub use user_name::UserName;

/// Characters that cannot appear in a room or user key
pub const RESERVED_KEY_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Trim a candidate key and check it against the naming rules.
///
/// Returns the trimmed key, or a short reason on rejection.
fn normalize_key(raw: &str, max_len: usize) -> Result<String, String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err("must not be empty".to_string());
    }
    if key.chars().count() > max_len {
        return Err(format!("must be at most {max_len} characters"));
    }
    if let Some(c) = key
        .chars()
        .find(|c| RESERVED_KEY_CHARS.contains(c) || c.is_control())
    {
        return Err(format!("contains reserved character {c:?}"));
    }
    Ok(key.to_string())
}
