use std::collections::BTreeSet;

use retailx_core::Subject;

use crate::Role;

/// Ordered, duplicate-free set of granted authorities.
pub type Authorities = BTreeSet<Role>;

/// Verified identity of a request and the authorities granted to it.
///
/// Immutable once constructed; a request owns its principal for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: Subject,
    authorities: Authorities,
}

impl Principal {
    pub fn new(subject: Subject, authorities: impl IntoIterator<Item = Role>) -> Self {
        Self {
            subject,
            authorities: authorities.into_iter().collect(),
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn authorities(&self) -> &Authorities {
        &self.authorities
    }

    pub fn has_authority(&self, role: &Role) -> bool {
        self.authorities.contains(role)
    }

    pub fn has_any_authority(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.has_authority(r))
    }
}
