// src/models/policy.rs

//! Eligibility rules over (role type, work mode) pairs.

use serde::{Deserialize, Serialize};

use super::{RoleType, WorkMode};

/// One eligible combination: any of `roles` in the given `work_mode`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyRule {
    pub roles: Vec<RoleType>,
    pub work_mode: WorkMode,
}

/// The digest's eligibility policy. A posting passes if any rule matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl Policy {
    pub fn allows(&self, role_type: RoleType, work_mode: WorkMode) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.work_mode == work_mode && rule.roles.contains(&role_type))
    }
}

impl Default for Policy {
    /// Analytical and entry-level roles must be remote; trainee programmes must be onsite.
    fn default() -> Self {
        Self {
            rules: vec![
                PolicyRule {
                    roles: vec![
                        RoleType::DataAnalyst,
                        RoleType::Intern,
                        RoleType::DataScience,
                    ],
                    work_mode: WorkMode::Remote,
                },
                PolicyRule {
                    roles: vec![RoleType::GraduateTrainee],
                    work_mode: WorkMode::Onsite,
                },
            ],
        }
    }
}
