use std::sync::{PoisonError, RwLock};

use crate::models::User;

/// Read side of the authentication collaborator.
///
/// Settlement only reads `current_user().id` to tag persisted trades and
/// must keep working when nobody is signed in.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<User>;

    /// True while the provider has not yet resolved the session.
    fn is_loading(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
struct IdentityState {
    user: Option<User>,
    loading: bool,
}

/// Identity of one session, set by whoever authenticated the caller.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    state: RwLock<IdentityState>,
}

impl SessionIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            state: RwLock::new(IdentityState {
                user: Some(user),
                loading: false,
            }),
        }
    }

    /// Session whose user is not known yet.
    pub fn loading() -> Self {
        Self {
            state: RwLock::new(IdentityState {
                user: None,
                loading: true,
            }),
        }
    }

    pub fn sign_in(&self, user: User) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(user_id = %user.id, "User signed in");
        state.user = Some(user);
        state.loading = false;
    }

    pub fn sign_out(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(user) = state.user.take() {
            tracing::info!(user_id = %user.id, "User signed out");
        }
        state.loading = false;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<User> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.loading {
            return None;
        }
        state.user.clone()
    }

    fn is_loading(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .loading
    }
}
