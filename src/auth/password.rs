use tokio::task;

use crate::errors::{AppError, AppResult};

/// Salted one-way password hashing backed by bcrypt.
///
/// bcrypt is deliberately slow, so both operations run on the blocking pool
/// instead of an actix worker.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, plaintext: &str) -> AppResult<String> {
        let plaintext = plaintext.to_string();
        let cost = self.cost;

        let hashed = task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {}", e)))?;
        Ok(hashed?)
    }

    /// Never fails: a malformed stored hash counts as a mismatch.
    pub async fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let plaintext = plaintext.to_string();
        let hash = hash.to_string();

        match task::spawn_blocking(move || bcrypt::verify(plaintext, &hash)).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                log::warn!("Stored password hash could not be verified: {}", e);
                false
            }
            Err(e) => {
                log::error!("Password verification task failed: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
