// 🔐 Permissions - allow-list predicate
//
// Two gates per request: collection-level (no target) and instance-level
// (with a target). The caller is carried through but not consulted while
// authentication is disabled.

use serde::{Deserialize, Serialize};

pub const PERM_AA: &str = "aa";
pub const PERM_APPROVE: &str = "approve";

/// Permission names that pass every collection-level check
pub const COLLECTION_PERMISSIONS: [&str; 2] = [PERM_AA, PERM_APPROVE];

// ============================================================================
// CALLER
// ============================================================================

/// Whoever made the request; always anonymous while authentication is off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caller;

impl Caller {
    pub fn anonymous() -> Self {
        Caller
    }
}

// ============================================================================
// TARGET
// ============================================================================

/// Object an instance-level check is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Office(i64),
    Program(i64),
    /// Anything the policy has no rule for
    Other,
}

// ============================================================================
// ACCESS POLICY
// ============================================================================

/// Process-wide allow-lists, fixed after startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub allowed_offices: Vec<i64>,
    pub allowed_programs: Vec<i64>,
    /// The only allow-listed program that may be approved
    pub approver_program: i64,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        AccessPolicy {
            allowed_offices: vec![1, 2],
            allowed_programs: vec![1, 2, 3],
            approver_program: 1,
        }
    }
}

impl AccessPolicy {
    pub fn allowed(&self, _caller: &Caller, permission: &str, target: Option<Target>) -> bool {
        let Some(target) = target else {
            // "approve" passes here for every caller; only the instance
            // gate narrows it to the approver program.
            return COLLECTION_PERMISSIONS.contains(&permission);
        };

        match target {
            Target::Office(id) if self.allowed_offices.contains(&id) => permission == PERM_AA,
            Target::Program(id) if self.allowed_programs.contains(&id) => {
                if permission == PERM_APPROVE {
                    id == self.approver_program
                } else {
                    permission == PERM_AA
                }
            }
            _ => false,
        }
    }

    /// True when at least one of `required` is allowed
    pub fn allows_any(&self, caller: &Caller, required: &[&str], target: Option<Target>) -> bool {
        required
            .iter()
            .any(|permission| self.allowed(caller, permission, target))
    }
}
