//! Room events - what subscribers of a room observe

mod room_event;

pub use room_event::RoomEvent;
