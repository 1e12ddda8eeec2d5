pub mod asset;
pub mod attendance;
pub mod document;
pub mod role;
pub mod user;
pub mod vendor;
