pub mod adoption;
pub mod auth;
pub mod cats;
pub mod recognition;
