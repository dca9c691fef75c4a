use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::{RequestHandler, Service, ServiceError};
use crate::models::users::{NewUser, Role, User};
use crate::repositories::UserStore;
use crate::settings::SeedAdmin;

pub enum UserRequest {
    Authenticate {
        email: String,
        password: String,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    ListUsers {
        caller_id: String,
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
    CreateUser {
        caller_id: String,
        profile: NewUser,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
}

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Creates the configured admin account on first run. Login has no other
/// path than the stored-credential compare, so this replaces any fixed
/// bootstrap credential.
pub async fn ensure_seed_admin(
    store: &dyn UserStore,
    seed: &SeedAdmin,
) -> Result<(), anyhow::Error> {
    if store.get_user_by_email(&seed.email).await?.is_some() {
        return Ok(());
    }

    store
        .insert_user(User {
            id: Uuid::new_v4().hyphenated().to_string(),
            name: seed.name.clone(),
            email: seed.email.clone(),
            password_hash: hash_password(&seed.password),
            company: seed.company.clone(),
            phone: seed.phone.clone(),
            role: Role::Admin,
        })
        .await?;

    log::info!("Seeded admin account {}.", seed.email);
    Ok(())
}

#[derive(Clone)]
pub struct UserRequestHandler {
    store: Arc<dyn UserStore>,
}

impl UserRequestHandler {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        UserRequestHandler { store }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        // One uniform failure regardless of which part did not match.
        match user {
            Some(user) if user.password_hash == hash_password(password) => Ok(user),
            _ => Err(ServiceError::Auth),
        }
    }

    async fn require_admin(&self, caller_id: &str) -> Result<User, ServiceError> {
        let caller = self
            .store
            .get_user_by_id(caller_id)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        match caller {
            Some(caller) if caller.role == Role::Admin => Ok(caller),
            _ => Err(ServiceError::Forbidden("admin access required".to_string())),
        }
    }

    async fn list_users(&self, caller_id: &str) -> Result<Vec<User>, ServiceError> {
        self.require_admin(caller_id).await?;

        self.store
            .list_users()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    async fn create_user(&self, caller_id: &str, profile: NewUser) -> Result<User, ServiceError> {
        self.require_admin(caller_id).await?;

        if profile.email.trim().is_empty() {
            return Err(ServiceError::Validation("email is required".to_string()));
        }
        if profile.password.trim().is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }

        let existing = self
            .store
            .get_user_by_email(&profile.email)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if existing.is_some() {
            return Err(ServiceError::Validation(
                "email already registered".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4().hyphenated().to_string(),
            name: profile.name,
            email: profile.email,
            password_hash: hash_password(&profile.password),
            company: profile.company,
            phone: profile.phone,
            role: profile.role.unwrap_or(Role::User),
        };

        self.store
            .insert_user(user)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }
}

#[async_trait]
impl RequestHandler<UserRequest> for UserRequestHandler {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::Authenticate {
                email,
                password,
                response,
            } => {
                let result = self.authenticate(&email, &password).await;
                let _ = response.send(result);
            }
            UserRequest::ListUsers {
                caller_id,
                response,
            } => {
                let result = self.list_users(&caller_id).await;
                let _ = response.send(result);
            }
            UserRequest::CreateUser {
                caller_id,
                profile,
                response,
            } => {
                let result = self.create_user(&caller_id, profile).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl Service<UserRequest, UserRequestHandler> for UserService {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;

    fn seed() -> SeedAdmin {
        SeedAdmin {
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "letmein".to_string(),
            company: "CMV HQ".to_string(),
            phone: "11999990000".to_string(),
        }
    }

    fn profile(email: &str) -> NewUser {
        NewUser {
            name: "Maria".to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
            company: "Cantina da Maria".to_string(),
            phone: "11988887777".to_string(),
            role: None,
        }
    }

    async fn handler_with_admin() -> (UserRequestHandler, String) {
        let store = Arc::new(MemoryStore::new());
        ensure_seed_admin(store.as_ref(), &seed()).await.unwrap();

        let admin = store
            .get_user_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();

        (UserRequestHandler::new(store), admin.id)
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        ensure_seed_admin(store.as_ref(), &seed()).await.unwrap();
        ensure_seed_admin(store.as_ref(), &seed()).await.unwrap();

        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn authenticate_accepts_seeded_credentials() {
        let (handler, _) = handler_with_admin().await;

        let user = handler
            .authenticate("admin@example.com", "letmein")
            .await
            .unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn authenticate_fails_uniformly() {
        let (handler, _) = handler_with_admin().await;

        let wrong_password = handler.authenticate("admin@example.com", "nope").await;
        let unknown_email = handler.authenticate("ghost@example.com", "letmein").await;

        assert!(matches!(wrong_password, Err(ServiceError::Auth)));
        assert!(matches!(unknown_email, Err(ServiceError::Auth)));
    }

    #[tokio::test]
    async fn create_user_defaults_to_user_role() {
        let (handler, admin_id) = handler_with_admin().await;

        let user = handler
            .create_user(&admin_id, profile("maria@example.com"))
            .await
            .unwrap();

        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "hunter2");
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_email() {
        let (handler, admin_id) = handler_with_admin().await;

        handler
            .create_user(&admin_id, profile("maria@example.com"))
            .await
            .unwrap();
        let duplicate = handler
            .create_user(&admin_id, profile("maria@example.com"))
            .await;

        assert!(matches!(duplicate, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn listing_requires_admin_role() {
        let (handler, admin_id) = handler_with_admin().await;

        let user = handler
            .create_user(&admin_id, profile("maria@example.com"))
            .await
            .unwrap();

        assert!(handler.list_users(&admin_id).await.is_ok());
        assert!(matches!(
            handler.list_users(&user.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            handler.list_users("unknown-caller").await,
            Err(ServiceError::Forbidden(_))
        ));
    }
}
