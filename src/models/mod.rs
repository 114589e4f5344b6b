pub mod confirm;
pub mod link;

pub use confirm::{
    confirm_email, is_valid_email, request_new_link, AuthProvider, ConfirmError, ConfirmState,
    OtpType, ProviderError, ResendError,
};
pub use link::{ConfirmParams, FragmentTokens};
