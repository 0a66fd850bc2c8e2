//! Resolving symbolic refs to concrete revisions
//!
//! A ref is resolved with a single remote listing. When the listing fails or
//! comes back empty the ref stays unresolved; that is not an error, it tells
//! the checkout manager to discover the revision by fetching instead.

use log::debug;

use crate::git::RemoteRef;
use crate::path::is_revision_like;
use crate::repository::GitOperations;

/// The ref names queried for `r#ref`, highest priority first
pub fn candidate_patterns(r#ref: &str) -> Vec<String> {
    vec![
        format!("refs/tags/{}^{{}}", r#ref),
        format!("refs/tags/{}", r#ref),
        format!("refs/heads/{}", r#ref),
        r#ref.to_string(),
    ]
}

/// Pick the revision for `r#ref` out of a remote listing.
///
/// A peeled annotated tag wins, then the first exact match in pattern order,
/// then whatever the remote listed first.
pub fn select_revision(r#ref: &str, refs: &[RemoteRef]) -> Option<String> {
    candidate_patterns(r#ref)
        .iter()
        .find_map(|pattern| refs.iter().find(|remote| &remote.name == pattern))
        .or_else(|| refs.first())
        .map(|remote| remote.revision.clone())
}

/// Resolve `r#ref` on `origin` to a revision, or `None` if it cannot be resolved.
pub fn resolve_ref(git: &dyn GitOperations, origin: &str, r#ref: &str) -> Option<String> {
    if is_revision_like(r#ref) {
        return Some(r#ref.to_string());
    }

    let refs = match git.list_remote_refs(origin, &candidate_patterns(r#ref)) {
        Ok(refs) => refs,
        Err(e) => {
            debug!("could not list refs of {}: {}", origin, e);
            return None;
        }
    };

    let revision = select_revision(r#ref, &refs);
    match &revision {
        Some(revision) => debug!("resolved {}@{} to {}", origin, r#ref, revision),
        None => debug!("{}@{} matched no remote refs", origin, r#ref),
    }
    revision
}
