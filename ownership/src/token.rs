//! Secret generation.

use uuid::Uuid;

/// Source of unpredictable challenge secrets.
pub trait TokenGenerator: Send + Sync {
    /// Returns a fresh secret. Collisions must be negligible.
    fn generate(&self) -> String;
}

/// Random version 4 UUIDs (122 bits of entropy).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokens;

impl TokenGenerator for UuidTokens {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
