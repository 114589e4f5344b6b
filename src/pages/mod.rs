mod auth_confirm;
mod home;
mod login;

pub use auth_confirm::AuthConfirmPage;
pub use home::HomePage;
pub use login::LoginPage;
