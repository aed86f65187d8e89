// handlers/public/auth/mod.rs - Public authentication handlers

pub mod login;    // POST /api/users/login - verify credentials and issue a JWT
pub mod register; // POST /api/register - create a business with its first admin

pub use login::login_post;
pub use register::register_post;
