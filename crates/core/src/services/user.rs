//! User service.

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::Deserialize;
use social_common::{AppError, AppResult, IdGenerator};
use social_db::{
    entities::user,
    repositories::{FollowingRepository, UserRepository},
};
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    following_repo: FollowingRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    /// Unique login name.
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    /// Contact address.
    #[validate(email)]
    pub email: String,

    /// Plain-text password; only its hash is stored.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Credentials for token login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    /// Login name.
    #[validate(length(min = 1))]
    pub username: String,

    /// Plain-text password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Profile changes. Username and email are read-only.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    /// Free-form biography.
    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    /// URL of the avatar image.
    #[validate(url)]
    pub profile_picture: Option<String>,
}

/// A user together with its follow graph.
#[derive(Debug, Clone)]
pub struct Profile {
    /// The account.
    pub user: user::Model,
    /// IDs of users following this one.
    pub followers: Vec<String>,
    /// IDs of users this one follows.
    pub following: Vec<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, following_repo: FollowingRepository) -> Self {
        Self {
            user_repo,
            following_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and issue its API token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A user with that username already exists.".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            bio: Set(None),
            profile_picture: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Registered user");

        Ok(user)
    }

    /// Check credentials and return the user with its token.
    ///
    /// A token is issued if the user has none yet.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        input.validate()?;

        let invalid = || AppError::BadRequest("Invalid credentials".to_string());

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(invalid());
        }

        if user.token.is_some() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user with follower and following IDs.
    pub async fn profile(&self, user_id: &str) -> AppResult<Profile> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let followers = self.following_repo.follower_ids(user_id).await?;
        let following = self.following_repo.followee_ids(user_id).await?;

        Ok(Profile {
            user,
            followers,
            following,
        })
    }

    /// Update bio and profile picture.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<Profile> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(profile_picture) = input.profile_picture {
            active.profile_picture = Set(Some(profile_picture));
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await?;

        self.profile(user_id).await
    }

    /// Map user IDs to usernames.
    pub async fn usernames(&self, ids: &[String]) -> AppResult<HashMap<String, String>> {
        let users = self.user_repo.find_by_ids(ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
