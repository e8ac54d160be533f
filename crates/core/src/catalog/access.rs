//! Actor identity and tenant ownership rules.

use catalog_shared::{Claims, Role};

use super::error::CatalogError;

/// The authenticated caller of a catalog operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// User ID from the token subject.
    pub user_id: String,
    /// User's role.
    pub role: Role,
    /// Tenant the user belongs to.
    pub tenant: Option<String>,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: Role, tenant: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            tenant,
        }
    }

    /// Whether the role may create or edit catalog entries at all.
    #[must_use]
    pub fn can_edit_catalog(&self) -> bool {
        Role::CATALOG_EDITORS.contains(&self.role)
    }

    /// Requires the actor to be allowed to edit entries of `tenant_id`.
    ///
    /// Elevated roles pass; everyone else must belong to that tenant.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Forbidden` otherwise.
    pub fn ensure_can_manage(&self, tenant_id: &str) -> Result<(), CatalogError> {
        if !self.can_edit_catalog() {
            return Err(CatalogError::forbidden(format!(
                "role '{}' cannot edit the catalog",
                self.role
            )));
        }
        if self.role.is_elevated() || self.tenant.as_deref() == Some(tenant_id) {
            return Ok(());
        }
        Err(CatalogError::forbidden(
            "You are not allowed to access this resource",
        ))
    }
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.user_id(), claims.role, claims.tenant.clone())
    }
}
