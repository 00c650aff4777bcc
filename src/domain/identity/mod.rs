//! Identity domain: Mini App init data and the identity it resolves to.
//!
//! Identity is used only by the HTTP init endpoint; relay connections stay
//! anonymous.

mod errors;
mod init_data;
mod user;

pub use errors::IdentityError;
pub use init_data::{compute_signature, sign_hex, InitData};
pub use user::{ResolvedIdentity, Role, TelegramUser};
