pub mod adoption_repo;
pub mod cat_image_repo;
pub mod cat_repo;
pub mod password_reset_repo;
pub mod session_repo;
pub mod user_repo;

pub use adoption_repo::AdoptionRepo;
pub use cat_image_repo::CatImageRepo;
pub use cat_repo::CatRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
