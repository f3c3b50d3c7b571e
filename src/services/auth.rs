// user authentication, registration, and account management

use crate::models::user::{CreateUserRequest, LoginRequest, UpdateProfileRequest, User};
use anyhow::{anyhow, Result};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::env;
use uuid::Uuid;

const BCRYPT_COST: u32 = 10;
const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // user id
    pub exp: i64,     // expiration
    pub role: String, // role at issue time; guards re-check the database
    pub iat: i64,     // issued at
    pub jti: String,  // unique token id
}

pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an account and issue a token for it.
    ///
    /// The `admin` role can never be self-assigned; admins promote users
    /// through the user management endpoints.
    pub async fn register(&self, user_req: CreateUserRequest) -> Result<(User, String)> {
        let name = user_req.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Name must not be empty"));
        }

        if user_req.password.len() < 8 {
            return Err(anyhow!("Password must be at least 8 characters"));
        }

        let role = match user_req.role.as_deref() {
            None | Some("user") => "user",
            Some("organizer") => "organizer",
            Some("admin") => return Err(anyhow!("Admin accounts cannot be self-registered")),
            Some(other) => {
                warn!("Registration with unknown role rejected: {}", other);
                return Err(anyhow!("Invalid role"));
            }
        };

        let email = user_req.email.trim().to_lowercase();

        if let Some(existing) = User::find_by_email(&self.pool, &email).await? {
            warn!(
                "Registration failed: email {} already registered as {}",
                email, existing.id
            );
            return Err(anyhow!("Email already registered"));
        }

        let password_hash = hash(&user_req.password, BCRYPT_COST)?;
        let user = User::create(&self.pool, name, &email, &password_hash, role).await?;
        info!("User registered: {} (role: {})", user.id, user.role);

        let token = Self::generate_token(user.id, &user.role)?;
        Ok((user, token))
    }

    pub async fn login(&self, login_req: LoginRequest) -> Result<(User, String)> {
        let email = login_req.email.trim().to_lowercase();

        // soft-deleted accounts never come back from the email lookup
        let user = User::find_by_email(&self.pool, &email)
            .await?
            .ok_or_else(|| anyhow!("Invalid email or password"))?;

        if !verify(&login_req.password, &user.password_hash)? {
            warn!("Login failed: invalid password for user {}", user.id);
            return Err(anyhow!("Invalid email or password"));
        }

        let token = Self::generate_token(user.id, &user.role)?;
        info!("Login successful: {} (role: {})", user.id, user.role);

        Ok((user, token))
    }

    pub fn verify_token(&self, token: &str) -> Result<Uuid> {
        let claims = Self::decode_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)?;
        Ok(user_id)
    }

    pub async fn update_profile(&self, user_id: Uuid, update: UpdateProfileRequest) -> Result<User> {
        let user = User::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found"))?;

        let email = match &update.email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                if let Some(existing) = User::find_by_email(&self.pool, &email).await? {
                    if existing.id != user_id {
                        return Err(anyhow!("Email already registered"));
                    }
                }
                Some(email)
            }
            None => None,
        };

        let password_hash = match &update.password {
            Some(password) => {
                if password.len() < 8 {
                    return Err(anyhow!("Password must be at least 8 characters"));
                }
                Some(hash(password, BCRYPT_COST)?)
            }
            None => None,
        };

        let updated = user
            .update_profile(
                &self.pool,
                update.name.as_deref(),
                email.as_deref(),
                password_hash.as_deref(),
            )
            .await?;

        Ok(updated)
    }

    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        let user = User::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found"))?;

        user.delete_account(&self.pool).await?;
        info!("Account soft-deleted: {}", user_id);

        Ok(())
    }

    fn generate_token(user_id: Uuid, role: &str) -> Result<String> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET not set"))?;

        let now = Utc::now().timestamp();
        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(TOKEN_LIFETIME_HOURS))
            .ok_or_else(|| anyhow!("Invalid timestamp calculation"))?
            .timestamp();

        // unique jti so two tokens for the same user in the same second differ
        let nonce: u64 = rand::rng().random();
        let jti = format!("{}-{}-{:016x}", user_id.simple(), now, nonce);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration,
            role: role.to_string(),
            iat: now,
            jti,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    fn decode_token(token: &str) -> Result<Claims> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET not set"))?;

        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 60;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt_secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }
}
