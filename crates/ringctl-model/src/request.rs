//! Typed parameter bundles for pending per-node requests.
//!
//! A sum type, not a class hierarchy: each [`RequestKind`](ringctl_types::RequestKind)
//! carries exactly the parameters its operation needs, and every `match`
//! over [`RequestParam`] in the coordinator is total.

use std::collections::BTreeSet;

use ringctl_types::{Datacenter, NodeId};
use serde::{Deserialize, Serialize};

/// The parameter bundle for a pending per-node request. Persists in
/// `Topology::req_param` until the node reaches `normal` (join/replace/
/// rebuild) or `left` (remove/leave) — see the open question recorded in
/// `DESIGN.md` about why `left`, not `normal`, is the clearing point for
/// operations that never return to `normal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestParam {
    Join { num_tokens: u32 },
    Replace { replaced_id: NodeId, ignored_ids: BTreeSet<NodeId> },
    Remove { ignored_ids: BTreeSet<NodeId> },
    Rebuild { source_dc: Option<Datacenter> },
    Leave,
}

impl RequestParam {
    /// Iterates the declared `ignored_ids` for `replace`/`remove`
    /// requests; empty for all other kinds.
    pub fn ignored_ids_iter(&self) -> Box<dyn Iterator<Item = NodeId> + '_> {
        match self {
            Self::Replace { ignored_ids, .. } | Self::Remove { ignored_ids } => {
                Box::new(ignored_ids.iter().copied())
            }
            Self::Join { .. } | Self::Rebuild { .. } | Self::Leave => Box::new(std::iter::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_ids_iter_empty_for_join() {
        let param = RequestParam::Join { num_tokens: 16 };
        assert_eq!(param.ignored_ids_iter().count(), 0);
    }

    #[test]
    fn ignored_ids_iter_yields_replace_ignored_set() {
        let param = RequestParam::Replace {
            replaced_id: NodeId::new(1),
            ignored_ids: BTreeSet::from([NodeId::new(1)]),
        };
        let ids: Vec<_> = param.ignored_ids_iter().collect();
        assert_eq!(ids, vec![NodeId::new(1)]);
    }
}
