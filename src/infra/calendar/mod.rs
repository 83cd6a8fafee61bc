pub mod disconnected;
