/// Account manager using sqlx runtime queries
use crate::{
    account::{Claims, Identity, User, UserView},
    config::ServerConfig,
    error::{ShareError, ShareResult},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Register a new user
    ///
    /// The password is stored only as an Argon2id hash; it never appears in
    /// logs or at rest in clear form.
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        role: Option<String>,
    ) -> ShareResult<User> {
        self.validate_email(&email)?;

        if name.trim().is_empty() {
            return Err(ShareError::Validation("Name cannot be empty".to_string()));
        }
        if password.len() < 8 {
            return Err(ShareError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let role = role.unwrap_or_else(|| "user".to_string());
        if role != "user" && role != "admin" {
            return Err(ShareError::Validation(format!("Unknown role: {}", role)));
        }

        if self.email_exists(&email).await? {
            return Err(ShareError::DuplicateIdentity(email));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ShareError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        // The UNIQUE constraint on email backs up the exists-check above
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&id)
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .bind(&role)
        .bind(now)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            if is_unique_violation(&e) {
                return Err(ShareError::DuplicateIdentity(email));
            }
            return Err(ShareError::Database(e));
        }

        tracing::info!("Registered user {} ({})", id, email);

        Ok(User {
            id,
            name,
            email,
            password_hash,
            role,
            created_at: now,
        })
    }

    /// Authenticate by email and password, returning the user and a fresh
    /// session token
    pub async fn login(&self, email: &str, password: &str) -> ShareResult<(User, String)> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at
             FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(ShareError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| ShareError::Internal(format!("Corrupt password hash: {}", e)))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(ShareError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;

        Ok((user, token))
    }

    /// Issue a signed session token for a user
    pub fn issue_token(&self, user: &User) -> ShareResult<String> {
        let now = Utc::now();
        let ttl = Duration::seconds(self.config.authentication.token_ttl_secs as i64);
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
        )
        .map_err(|e| ShareError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verify a session token and resolve the identity it encodes
    ///
    /// Called on every protected request; results are never cached.
    pub fn verify_token(&self, token: &str) -> ShareResult<Identity> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ShareError::ExpiredToken,
            _ => {
                tracing::warn!("Token verification failed: {}", e);
                ShareError::InvalidToken
            }
        })?;

        Ok(Identity {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }

    /// Fetch a user's profile, without the password hash
    pub async fn get_profile(&self, user_id: &str) -> ShareResult<UserView> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at
             FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ShareError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    async fn email_exists(&self, email: &str) -> ShareResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    fn validate_email(&self, email: &str) -> ShareResult<()> {
        let valid = email.contains('@')
            && !email.starts_with('@')
            && !email.ends_with('@')
            && !email.contains(char::is_whitespace);

        if !valid {
            return Err(ShareError::Validation(format!("Invalid email: {}", email)));
        }

        Ok(())
    }
}

/// Detect a SQLite UNIQUE constraint violation
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, LoggingConfig, RemoteStoreConfig, RemoteUrlMode, ServerConfig, ServiceConfig,
        StorageConfig,
    };
    use crate::db;

    fn test_config() -> Arc<ServerConfig> {
        Arc::new(ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".into(),
                port: 0,
                version: "test".into(),
                upload_limit: 1024,
            },
            storage: StorageConfig {
                data_directory: "./data".into(),
                database: "./data/test.sqlite".into(),
                temp_directory: "./data/tmp".into(),
                media_directory: "./data/media".into(),
                remote: RemoteStoreConfig {
                    bucket: "test".into(),
                    region: "us-east-1".into(),
                    endpoint: None,
                    force_path_style: false,
                    url_mode: RemoteUrlMode::Presigned { ttl_secs: 3600 },
                },
            },
            authentication: AuthConfig {
                jwt_secret: "0123456789abcdef0123456789abcdef".into(),
                token_ttl_secs: 86400,
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        })
    }

    async fn manager() -> AccountManager {
        let pool = db::create_memory_pool().await.unwrap();
        AccountManager::new(pool, test_config())
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let mgr = manager().await;

        let user = mgr
            .register(
                "Alice".into(),
                "alice@example.com".into(),
                "correct horse".into(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(user.role, "user");

        let (logged_in, token) = mgr.login("alice@example.com", "correct horse").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        let identity = mgr.verify_token(&token).unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.role, "user");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let mgr = manager().await;

        mgr.register("A".into(), "dup@example.com".into(), "password1".into(), None)
            .await
            .unwrap();

        let err = mgr
            .register("B".into(), "dup@example.com".into(), "password2".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::DuplicateIdentity(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let mgr = manager().await;

        mgr.register("A".into(), "a@example.com".into(), "password1".into(), None)
            .await
            .unwrap();

        let err = mgr.login("a@example.com", "password2").await.unwrap_err();
        assert!(matches!(err, ShareError::InvalidCredentials));

        let err = mgr.login("nobody@example.com", "password1").await.unwrap_err();
        assert!(matches!(err, ShareError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_password_never_stored_in_clear() {
        let mgr = manager().await;

        let user = mgr
            .register("A".into(), "a@example.com".into(), "hunter22".into(), None)
            .await
            .unwrap();
        assert!(!user.password_hash.contains("hunter22"));
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let mgr = manager().await;
        let err = mgr.verify_token("not-a-token").unwrap_err();
        assert!(matches!(err, ShareError::InvalidToken));
    }

    #[tokio::test]
    async fn test_expired_token_rejected_distinctly() {
        let mgr = manager().await;
        let config = test_config();

        // Expiry an hour in the past, well beyond verification leeway
        let now = Utc::now();
        let claims = Claims {
            sub: "some-user".into(),
            role: "user".into(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.authentication.jwt_secret.as_bytes()),
        )
        .unwrap();

        let err = mgr.verify_token(&token).unwrap_err();
        assert!(matches!(err, ShareError::ExpiredToken));
    }

    #[tokio::test]
    async fn test_profile_of_missing_user() {
        let mgr = manager().await;
        let err = mgr.get_profile("missing-id").await.unwrap_err();
        assert!(matches!(err, ShareError::NotFound(_)));
    }
}
