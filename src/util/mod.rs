pub mod bytes;
pub mod timezone;
