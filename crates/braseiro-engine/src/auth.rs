//! # Authentication and Dual Control
//!
//! Operator login plus the authorizer re-check that gates every
//! sensitive mutation.
//!
//! Credentials are opaque strings compared verbatim; hashing policy
//! belongs to the deployment layer (see `braseiro_core::User`).

use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::LedgerEngine;
use braseiro_core::{User, UserRole};

impl LedgerEngine {
    /// Authenticates an operator by display name and password.
    pub async fn authenticate(&self, name: &str, password: &str) -> EngineResult<User> {
        let user = self.db.users().find_by_name(name).await?;

        match user {
            Some(user) if user.password == password => {
                info!(name = %user.name, role = user.role.as_str(), "Operator authenticated");
                Ok(user)
            }
            _ => {
                warn!(name, "Failed login attempt");
                Err(EngineError::InvalidCredentials)
            }
        }
    }

    /// Re-verifies an administrator credential at the moment of a
    /// sensitive action.
    ///
    /// The returned user is the *authorizer* stamped into the audit
    /// entry. A valid credential belonging to a non-administrator is
    /// rejected the same way as a wrong password.
    pub async fn verify_authorizer(&self, name: &str, password: &str) -> EngineResult<User> {
        let user = self.db.users().find_by_name(name).await?;

        match user {
            Some(user) if user.password == password && user.role == UserRole::Admin => Ok(user),
            _ => {
                warn!(name, "Rejected authorization attempt");
                Err(EngineError::InvalidAuthorization)
            }
        }
    }
}

/// Checks that an already-resolved user may act as authorizer.
///
/// Guards the engine entry points: even a caller that skips
/// [`LedgerEngine::verify_authorizer`] cannot slip a cashier in as
/// authorizer.
pub(crate) fn require_admin(authorizer: &User) -> EngineResult<()> {
    if authorizer.role != UserRole::Admin {
        return Err(EngineError::InvalidAuthorization);
    }
    Ok(())
}
