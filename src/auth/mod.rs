//! Sign-in, token renewal and token caching.

pub mod authenticator;
pub mod device_code;
pub mod error;
pub mod providers;
pub mod session;
pub mod store;
pub mod token;

pub use authenticator::{
    Credential, CredentialProvider, IdentityProvider, SessionAuthenticator, STORE_KEY,
};
pub use device_code::{DeviceCodePoll, DeviceCodeSession};
pub use error::AuthError;
pub use session::Session;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreConfig};
pub use token::Token;
