//! Role registry
//!
//! Three flat admin roles plus the default admin that grants and revokes
//! them. No role hierarchy beyond that.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{LendingError, LendingResult};
use crate::types::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Grants and revokes every role
    DefaultAdmin,
    /// Structural reserve wiring and the designated collateral asset
    PoolAdmin,
    /// Collateral factors, caps, per-reserve pause
    RiskAdmin,
    /// Global pause
    EmergencyAdmin,
}

#[derive(Clone, Debug, Default)]
pub struct RoleRegistry {
    members: HashMap<Role, HashSet<Address>>,
}

impl RoleRegistry {
    pub fn new(default_admin: Address) -> Self {
        let mut registry = Self::default();
        registry.insert(Role::DefaultAdmin, default_admin);
        registry
    }

    fn insert(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .map_or(false, |members| members.contains(account))
    }

    pub fn require_role(&self, role: Role, account: &Address) -> LendingResult<()> {
        if !self.has_role(role, account) {
            return Err(LendingError::MissingRole {
                role,
                account: *account,
            });
        }
        Ok(())
    }

    /// Returns whether the account was newly granted.
    pub fn grant_role(&mut self, caller: &Address, role: Role, account: Address) -> LendingResult<bool> {
        self.require_role(Role::DefaultAdmin, caller)?;
        let granted = self.insert(role, account);
        if granted {
            info!(?role, %account, "role granted");
        }
        Ok(granted)
    }

    /// Returns whether the account held the role.
    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> LendingResult<bool> {
        self.require_role(Role::DefaultAdmin, caller)?;
        let revoked = self
            .members
            .get_mut(&role)
            .map_or(false, |members| members.remove(account));
        if revoked {
            info!(?role, %account, "role revoked");
        }
        Ok(revoked)
    }

    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.members.get(&role).into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Address {
        Address([1u8; 32])
    }

    #[test]
    fn test_default_admin_grants_and_revokes() {
        let mut roles = RoleRegistry::new(admin());
        let risk = Address([2u8; 32]);

        assert!(roles.grant_role(&admin(), Role::RiskAdmin, risk).unwrap());
        assert!(!roles.grant_role(&admin(), Role::RiskAdmin, risk).unwrap());
        assert!(roles.has_role(Role::RiskAdmin, &risk));

        assert!(roles.revoke_role(&admin(), Role::RiskAdmin, &risk).unwrap());
        assert!(!roles.has_role(Role::RiskAdmin, &risk));
        assert!(!roles.revoke_role(&admin(), Role::RiskAdmin, &risk).unwrap());
    }

    #[test]
    fn test_only_default_admin_can_grant() {
        let mut roles = RoleRegistry::new(admin());
        let pool_admin = Address([3u8; 32]);
        roles.grant_role(&admin(), Role::PoolAdmin, pool_admin).unwrap();

        let result = roles.grant_role(&pool_admin, Role::EmergencyAdmin, pool_admin);
        assert_eq!(
            result,
            Err(LendingError::MissingRole {
                role: Role::DefaultAdmin,
                account: pool_admin,
            })
        );
    }

    #[test]
    fn test_roles_are_flat() {
        let roles = RoleRegistry::new(admin());
        assert!(!roles.has_role(Role::PoolAdmin, &admin()));
        assert_eq!(roles.members(Role::DefaultAdmin).count(), 1);
    }
}
