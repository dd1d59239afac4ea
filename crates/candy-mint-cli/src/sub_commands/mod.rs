pub mod mint;
pub mod status;
pub mod watch;
