pub mod availability;
pub mod booking_service;
pub mod calendar;
pub mod interval_merger;
pub mod link_locks;
pub mod poll_service;
