pub mod auth;
pub mod booking;
pub mod booking_link;
pub mod form;
pub mod interval;
pub mod poll;
pub mod slot;
pub mod user;
