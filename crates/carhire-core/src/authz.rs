//! # Authorization
//!
//! Roles, capabilities and the request principal.
//!
//! ## Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Who may do what                                     │
//! │                                                                         │
//! │  Capability            Admin    Customer                                │
//! │  ───────────────────   ─────    ────────                                │
//! │  ManageCatalog           ✅        ❌                                   │
//! │  ViewAdminDashboard      ✅        ❌                                   │
//! │  RentCars                ❌        ✅                                   │
//! │  ManageOwnRentals        ✅        ✅                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every service call receives the [`Principal`] explicitly; nothing reads a
//! global "current user".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::User;

// =============================================================================
// Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }

    /// Whether this role holds `capability`.
    pub const fn grants(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Role::Admin, Capability::ManageCatalog)
            | (Role::Admin, Capability::ViewAdminDashboard)
            | (Role::Admin, Capability::ManageOwnRentals) => true,
            (Role::Customer, Capability::RentCars)
            | (Role::Customer, Capability::ManageOwnRentals) => true,
            _ => false,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Capability
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Add, edit and delete cars and car models.
    ManageCatalog,
    /// See counts and full lists on the admin dashboard.
    ViewAdminDashboard,
    /// Book a car model.
    RentCars,
    /// List and cancel the rentals one owns.
    ManageOwnRentals,
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated user a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Principal {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Where the principal lands after logging in.
    pub fn home_path(&self) -> &'static str {
        match self.role {
            Role::Admin => "/admin/dashboard",
            Role::Customer => "/user/dashboard",
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

// =============================================================================
// Checks
// =============================================================================

/// Fails with `Forbidden` unless the principal has exactly `role`.
pub fn require_role(principal: &Principal, role: Role) -> CoreResult<()> {
    if principal.role != role {
        return Err(CoreError::forbidden(format!("{} role required", role)));
    }
    Ok(())
}

/// Fails with `Forbidden` unless the principal's role grants `capability`.
pub fn require_capability(principal: &Principal, capability: Capability) -> CoreResult<()> {
    if !principal.role.grants(capability) {
        return Err(CoreError::forbidden(format!(
            "{} may not {:?}",
            principal.role, capability
        )));
    }
    Ok(())
}

/// Fails with `Forbidden` unless the principal owns the resource.
pub fn require_owner(principal: &Principal, owner_id: &str) -> CoreResult<()> {
    if principal.user_id != owner_id {
        return Err(CoreError::forbidden("not the owner of this resource"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
