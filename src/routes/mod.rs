mod health_check;
mod home;
mod waitlist;

// allow external `use` statements to skip the submodule names
pub use health_check::health_check;
pub use home::home;
pub use waitlist::join_waitlist;
