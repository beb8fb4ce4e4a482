use crate::Chemistry::chemical::Chemical;
use crate::Chemistry::role::Role;
use crate::Reactions::reaction::Reaction;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Number of distinct canonical chemicals per fingerprint role
/// (organic, inorganic, solvent, acid). Only presence counts, never quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Fingerprint {
    counts: [usize; 4],
}

impl Fingerprint {
    pub fn from_counts(organic: usize, inorganic: usize, solvent: usize, acid: usize) -> Self {
        Self {
            counts: [organic, inorganic, solvent, acid],
        }
    }

    /// count for a role; the antisolvent is not part of the fingerprint and always gives 0
    pub fn count(&self, role: Role) -> usize {
        role.fingerprint_slot().map(|i| self.counts[i]).unwrap_or(0)
    }

    /// (role, count) pairs in fingerprint order
    pub fn iter(&self) -> impl Iterator<Item = (Role, usize)> + '_ {
        Role::FINGERPRINT_ROLES
            .iter()
            .map(move |role| (*role, self.count(*role)))
    }
}

/// `organic%inorganic%solvent%acid`, e.g. `1%1%1%1`
impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self.counts.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("%"))
    }
}

/// Counts, per role, the distinct canonical chemicals of any dispense of that role in both vials.
pub fn fingerprint(reaction: &Reaction) -> Fingerprint {
    let mut sets: [BTreeSet<Arc<Chemical>>; 4] = Default::default();
    for event in reaction.events() {
        if let Some(slot) = event.role.fingerprint_slot() {
            sets[slot].insert(Arc::clone(&event.chemical));
        }
    }
    Fingerprint {
        counts: [sets[0].len(), sets[1].len(), sets[2].len(), sets[3].len()],
    }
}

/// True iff the reaction has exactly `count` distinct chemicals of `role`.
/// An absent role has count 0, so it never matches `count == 1`.
pub fn matches(reaction: &Reaction, role: Role, count: usize) -> bool {
    match role {
        Role::Antisolvent => {
            let antisolvents: BTreeSet<&str> = reaction
                .events()
                .filter(|e| e.role == Role::Antisolvent)
                .map(|e| e.chemical.inchikey.as_str())
                .collect();
            antisolvents.len() == count
        }
        Role::Organic | Role::Inorganic | Role::Solvent | Role::Acid => {
            fingerprint(reaction).count(role) == count
        }
    }
}
