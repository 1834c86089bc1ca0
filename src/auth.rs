//! Auth service collaborator - accounts, sign-in/out, and session events.
//!
//! The recharge workflow itself takes the user id as an explicit parameter;
//! this module is the thin collaborator that produces that id. One
//! [`AuthService`] instance models one browser session, and interested
//! parties can subscribe to session changes to gate access (e.g., redirect
//! unauthenticated users away from the workflow).

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use tokio::sync::watch;
use tracing::info;

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque uuid of the signed-in user
    pub user_id: String,
    /// Email the user signed in with
    pub email: String,
}

/// Registers a new account.
///
/// The email is trimmed and lowercased; the password is stored as a bcrypt
/// hash, never in the clear.
pub async fn register_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::Config {
            message: "A valid email address is required".to_string(),
        });
    }
    if password.len() < 6 {
        return Err(Error::Config {
            message: "Password must be at least 6 characters".to_string(),
        });
    }

    let existing = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::EmailTaken { email });
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let account = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        created_at: Set(chrono::Utc::now()),
    };

    let result = account.insert(db).await?;
    info!(user_id = %result.id, "account registered");
    Ok(result)
}

/// Issues and tracks the session for one user interaction
#[derive(Debug)]
pub struct AuthService {
    db: DatabaseConnection,
    session: watch::Sender<Option<Session>>,
}

impl AuthService {
    /// Creates an auth service with no active session.
    pub fn new(db: DatabaseConnection) -> Self {
        let (session, _) = watch::channel(None);
        Self { db, session }
    }

    /// Verifies credentials and establishes the session.
    ///
    /// Fails with [`Error::InvalidCredentials`] for both unknown emails and
    /// wrong passwords.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();
        let account = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !bcrypt::verify(password, &account.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        let session = Session {
            user_id: account.id,
            email: account.email,
        };
        self.session.send_replace(Some(session.clone()));
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    /// Clears the session.
    pub fn sign_out(&self) -> Result<()> {
        self.session.send_replace(None);
        Ok(())
    }

    /// The id of the currently signed-in user, if any.
    pub fn current_user(&self) -> Option<String> {
        self.session.borrow().as_ref().map(|s| s.user_id.clone())
    }

    /// Subscribes to session-change events: the receiver yields the new
    /// `Option<Session>` on every sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}
