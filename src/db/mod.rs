pub mod meeting_rooms;
pub mod roles;
pub mod seed;
pub mod users;
