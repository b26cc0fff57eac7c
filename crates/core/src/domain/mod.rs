pub mod finance;
pub mod user;
