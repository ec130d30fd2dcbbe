//! Identity provider implementations.

pub mod microsoft;

pub use microsoft::{DeviceCodePrompt, MicrosoftIdentity};
