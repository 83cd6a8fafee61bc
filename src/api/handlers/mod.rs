pub mod action;
pub mod booking;
pub mod booking_link;
pub mod health;
pub mod poll;
pub mod public_booking;
pub mod public_poll;
