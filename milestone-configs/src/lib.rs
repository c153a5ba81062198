#[cfg(feature = "json")]
pub mod node;
