//! Tunables the services read at runtime

use serde::{Deserialize, Serialize};

pub const DEFAULT_REFERRED_LIST_LIMIT: usize = 50;
pub const DEFAULT_REFERRED_LIST_MAX: usize = 100;
pub const DEFAULT_POLICY_LIST_LIMIT: usize = 20;
pub const DEFAULT_POLICY_LIST_MAX: usize = 100;

/// List limits applied by the workflow services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// Limit used when a referred-case listing asks for zero
    pub referred_list_default: usize,
    /// Upper bound on a referred-case listing
    pub referred_list_max: usize,
    /// Limit used when a policy listing asks for zero
    pub policy_list_default: usize,
    /// Upper bound on a policy listing page
    pub policy_list_max: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            referred_list_default: DEFAULT_REFERRED_LIST_LIMIT,
            referred_list_max: DEFAULT_REFERRED_LIST_MAX,
            policy_list_default: DEFAULT_POLICY_LIST_LIMIT,
            policy_list_max: DEFAULT_POLICY_LIST_MAX,
        }
    }
}

impl WorkflowSettings {
    /// Normalizes a requested referred-case limit
    pub fn referred_limit(&self, requested: i64) -> usize {
        clamp_limit(requested, self.referred_list_default, self.referred_list_max)
    }

    /// Normalizes a requested policy page size
    pub fn policy_limit(&self, requested: i64) -> usize {
        clamp_limit(requested, self.policy_list_default, self.policy_list_max)
    }
}

fn clamp_limit(requested: i64, default: usize, max: usize) -> usize {
    if requested <= 0 {
        return default.min(max);
    }
    usize::try_from(requested).map_or(max, |limit| limit.min(max))
}
