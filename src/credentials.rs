use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Credentials
///
/// One-way password hashing with Argon2id. Only PHC strings (algorithm, params,
/// salt and digest) are ever stored. The work runs on the blocking pool so a login
/// never stalls the async workers.
#[derive(Clone, Default)]
pub struct Credentials {
    argon2: Argon2<'static>,
}

impl Credentials {
    /// Argon2id with explicit cost parameters. Tests use the minimum cost.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub async fn hash(&self, password: String) -> Result<String, CredentialError> {
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| CredentialError::Hash(e.to_string()))
        })
        .await?
    }

    /// verify
    ///
    /// False for a wrong password. A stored value that is not a valid PHC string
    /// also verifies as false and is logged.
    pub async fn verify(&self, password: String, stored_hash: String) -> Result<bool, CredentialError> {
        let argon2 = self.argon2.clone();
        let verified = tokio::task::spawn_blocking(move || match PasswordHash::new(&stored_hash) {
            Ok(parsed) => argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::warn!("stored password hash is malformed: {}", e);
                false
            }
        })
        .await?;
        Ok(verified)
    }
}
