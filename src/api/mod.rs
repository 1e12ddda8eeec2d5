pub mod asset;
pub mod attendance;
pub mod document;
pub mod profile;
pub mod vendor;
