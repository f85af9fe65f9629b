//! Terminal rendering of messages, typing lines, and status

use chat_core::{Connectivity, Message, PresenceSnapshot, RoomName, UserName};
use chrono::{Local, TimeZone};
use std::fmt::Display;

/// Greeting shown on start-up
pub const WELCOME: &str = "Welcome! Set your name with /name and start chatting. Type /help for commands.";

/// A local system line
pub fn system(text: &str) -> String {
    format!("* {text}")
}

/// Announcement after a room switch
pub fn switched(room: &RoomName) -> String {
    system(&format!("Switched to room: #{room}"))
}

/// `[HH:MM] user: text`, with the viewer's own messages marked
pub fn message(message: &Message, viewer: &UserName) -> String {
    message_in(message, viewer, &Local)
}

/// `message` with the time shown in `tz`
pub fn message_in<Tz>(message: &Message, viewer: &UserName, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let time = message.server_timestamp.with_timezone(tz).format("%H:%M");
    let marker = if message.is_from(viewer) { " (you)" } else { "" };
    format!("[{time}] {}{marker}: {}", message.user, message.text)
}

/// `a, b typing…` for everyone but the viewer; `None` when nobody else is typing
pub fn typing(snapshot: &PresenceSnapshot, viewer: &UserName) -> Option<String> {
    let names: Vec<&str> = snapshot.others(viewer).map(UserName::as_str).collect();
    if names.is_empty() {
        None
    } else {
        Some(format!("{} typing…", names.join(", ")))
    }
}

/// Status line for a connectivity change
pub fn connectivity(state: Connectivity) -> String {
    let dot = if state.is_online { "●" } else { "○" };
    format!("{dot} {}", state.label())
}
