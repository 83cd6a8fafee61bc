pub mod sqlite_booking_link_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_poll_repo;
pub mod sqlite_user_repo;
pub mod sqlite_vote_repo;
