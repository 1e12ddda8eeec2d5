pub mod dates;
pub mod id;
