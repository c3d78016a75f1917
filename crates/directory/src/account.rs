use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vendhub_core::{Entity, UserId};

/// A user account as the external directory exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
}

impl UserAccount {
    pub fn new(id: UserId, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: display_name.into(),
        }
    }
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Lookup boundary into the external user directory.
///
/// Returns `Option` rather than a result: a lookup failure is
/// indistinguishable from "no such account", and never blocks the caller.
/// The directory, not this core, is responsible for preventing duplicate
/// accounts when concurrent registrations race on the same email.
pub trait UserDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<UserAccount>;
}

impl<D> UserDirectory for Arc<D>
where
    D: UserDirectory + ?Sized,
{
    fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        (**self).find_by_email(email)
    }
}
