//! Identity adapters.
//!
//! Implementations of the `IdentityResolver` port:
//!
//! - `telegram` - Telegram Mini App init data with HMAC verification

mod telegram;

pub use telegram::TelegramIdentityResolver;
