//! Auth ports: sessions, identities, and the privileged capability
//!
//! The managers in the domain crates never trust a role claim carried by a
//! request. Every privileged operation re-verifies the caller's admin flag
//! through [`AuthPort::is_admin`], which re-reads the identity store on each
//! call. The flag lives on the user row, so a revoked admin loses access on
//! the very next operation.
//!
//! [`PrivilegedAuth`] is the capability that bypasses normal signup side
//! effects and row-level policies. It is constructed once at startup and
//! passed by value into the few operations that legitimately need it
//! (registration bootstrap, KYC document URL signing). It must never be held
//! as ambient state reachable from ordinary request handlers.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::UserId;
use crate::ports::{DomainPort, PortError};

/// An authenticated caller's session
///
/// Built at the HTTP edge from the bearer token. The token is carried along
/// so it can be forwarded verbatim to the trusted intermediary, which
/// performs its own verification.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated user
    pub user_id: UserId,
    /// The raw bearer token, forwarded to trusted functions
    pub bearer_token: String,
    /// When the session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns true if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// A user identity as stored by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
    /// Role flag, re-read per privileged call
    pub is_admin: bool,
}

/// Port to the auth provider
#[async_trait]
pub trait AuthPort: DomainPort {
    /// Looks up a user identity
    async fn get_user(&self, user_id: UserId) -> Result<Option<UserIdentity>, PortError>;

    /// Verifies that a session is still valid (not expired, user exists)
    async fn verify_session(&self, session: &Session) -> Result<bool, PortError>;

    /// Re-reads the admin role flag for a user
    ///
    /// Called on every privileged operation. Implementations must hit the
    /// identity store, never a cached claim.
    async fn is_admin(&self, user_id: UserId) -> Result<bool, PortError>;
}

/// A signed, time-limited URL for a stored document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// The privileged auth capability
///
/// Wraps the admin-privileged client of the auth provider. Two operations
/// need it: creating an identity during partner registration (bypassing
/// normal signup triggers) and signing KYC document URLs for admin review.
#[async_trait]
pub trait PrivilegedAuth: DomainPort {
    /// Creates an auth identity directly, bypassing signup side effects
    async fn create_identity(&self, email: &str) -> Result<UserIdentity, PortError>;

    /// Signs a storage path into a time-limited URL
    async fn sign_document_url(
        &self,
        storage_path: &str,
        expires_in: Duration,
    ) -> Result<SignedUrl, PortError>;
}

/// In-memory mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock auth provider backed by an in-memory user map
    #[derive(Debug, Default)]
    pub struct MockAuthPort {
        users: Arc<RwLock<HashMap<UserId, UserIdentity>>>,
    }

    impl MockAuthPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a user and returns their id
        pub async fn add_user(&self, email: &str, is_admin: bool) -> UserId {
            let id = UserId::new_v7();
            self.users.write().await.insert(
                id,
                UserIdentity {
                    id,
                    email: email.to_string(),
                    is_admin,
                },
            );
            id
        }

        /// Registers a user under a known id
        pub async fn add_user_with_id(&self, id: UserId, email: &str, is_admin: bool) {
            self.users.write().await.insert(
                id,
                UserIdentity {
                    id,
                    email: email.to_string(),
                    is_admin,
                },
            );
        }

        /// Flips a user's admin flag, simulating an out-of-band role change
        pub async fn set_admin(&self, user_id: UserId, is_admin: bool) {
            if let Some(user) = self.users.write().await.get_mut(&user_id) {
                user.is_admin = is_admin;
            }
        }

        /// Issues a session for a known user, valid for one hour
        pub fn session_for(user_id: UserId) -> Session {
            Session {
                user_id,
                bearer_token: format!("test-token-{user_id}"),
                expires_at: Utc::now() + Duration::hours(1),
            }
        }

        /// Issues an already-expired session
        pub fn expired_session_for(user_id: UserId) -> Session {
            Session {
                user_id,
                bearer_token: format!("test-token-{user_id}"),
                expires_at: Utc::now() - Duration::minutes(1),
            }
        }
    }

    impl DomainPort for MockAuthPort {}

    #[async_trait]
    impl AuthPort for MockAuthPort {
        async fn get_user(&self, user_id: UserId) -> Result<Option<UserIdentity>, PortError> {
            Ok(self.users.read().await.get(&user_id).cloned())
        }

        async fn verify_session(&self, session: &Session) -> Result<bool, PortError> {
            if session.is_expired() {
                return Ok(false);
            }
            Ok(self.users.read().await.contains_key(&session.user_id))
        }

        async fn is_admin(&self, user_id: UserId) -> Result<bool, PortError> {
            Ok(self
                .users
                .read()
                .await
                .get(&user_id)
                .map(|u| u.is_admin)
                .unwrap_or(false))
        }
    }

    /// Mock privileged capability
    #[derive(Debug, Default)]
    pub struct MockPrivilegedAuth {
        created: Arc<RwLock<Vec<UserIdentity>>>,
    }

    impl MockPrivilegedAuth {
        pub fn new() -> Self {
            Self::default()
        }

        /// Identities created through the capability
        pub async fn created_identities(&self) -> Vec<UserIdentity> {
            self.created.read().await.clone()
        }
    }

    impl DomainPort for MockPrivilegedAuth {}

    #[async_trait]
    impl PrivilegedAuth for MockPrivilegedAuth {
        async fn create_identity(&self, email: &str) -> Result<UserIdentity, PortError> {
            let identity = UserIdentity {
                id: UserId::new_v7(),
                email: email.to_string(),
                is_admin: false,
            };
            self.created.write().await.push(identity.clone());
            Ok(identity)
        }

        async fn sign_document_url(
            &self,
            storage_path: &str,
            expires_in: Duration,
        ) -> Result<SignedUrl, PortError> {
            Ok(SignedUrl {
                url: format!("https://storage.test/signed/{storage_path}"),
                expires_at: Utc::now() + expires_in,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[tokio::test]
    async fn test_is_admin_reflects_store_changes() {
        let auth = MockAuthPort::new();
        let admin = auth.add_user("ops@example.com", true).await;

        assert!(auth.is_admin(admin).await.unwrap());

        // Role revoked out of band; the next check must see it
        auth.set_admin(admin, false).await;
        assert!(!auth.is_admin(admin).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_session_fails_verification() {
        let auth = MockAuthPort::new();
        let user = auth.add_user("organizer@example.com", false).await;

        let live = MockAuthPort::session_for(user);
        assert!(auth.verify_session(&live).await.unwrap());

        let stale = MockAuthPort::expired_session_for(user);
        assert!(!auth.verify_session(&stale).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_admin() {
        let auth = MockAuthPort::new();
        assert!(!auth.is_admin(UserId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_privileged_identity_creation() {
        let privileged = MockPrivilegedAuth::new();
        let identity = privileged.create_identity("new@example.com").await.unwrap();
        assert!(!identity.is_admin);

        let created = privileged.created_identities().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].email, "new@example.com");
    }
}
