pub mod error;
pub mod investigation;
pub mod market;
pub mod metadata;
pub mod pinning;
pub mod security;
