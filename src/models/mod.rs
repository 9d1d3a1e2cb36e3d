mod meeting_room;
mod role;
mod user;

pub use meeting_room::{MeetingRoom, NewMeetingRoom};
pub use role::{GrantRow, Grants};
pub use user::{User, UserInfo};

/// Partial-update helper: overwrite `target` only when `value` carries non-empty text.
pub fn assign_text(target: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *target = value;
    }
}

/// Same as [`assign_text`] for nullable columns.
pub fn assign_optional_text(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *target = Some(value);
    }
}
