pub mod adoption;
pub mod cat;
pub mod cat_image;
pub mod password_reset;
pub mod session;
pub mod user;
