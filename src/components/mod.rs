mod logo;
mod nav;
mod resend_form;
mod session;

pub use logo::Logo;
pub use nav::Nav;
pub use resend_form::ResendForm;
pub use session::SessionVersion;
