//! Checkout key derivation and on-disk layout for preset-repo
//!
//! Canonical checkouts live at `<root>/<origin-hash>/<ref-or-revision>/`,
//! temporary ones at `<root>/<origin-hash>/tmp/<ref>-<random>/`.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Number of hex characters kept from the origin digest
pub const ORIGIN_HASH_LEN: usize = 12;

/// Name of the per-origin directory holding in-flight checkouts
pub const TEMP_DIR_NAME: &str = "tmp";

/// Derive the directory key for a repository origin.
///
/// This is a truncated SHA-256 of the origin string, so it is always
/// exactly 12 lowercase hex characters.
pub fn origin_hash(origin: &str) -> String {
    let digest = Sha256::digest(origin.as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(ORIGIN_HASH_LEN);
    hash
}

/// Make a ref or revision safe to use as a single path component
pub fn sanitize_path_component(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Directory holding every checkout of one origin
pub fn origin_dir(root: &Path, origin: &str) -> PathBuf {
    root.join(origin_hash(origin))
}

/// Canonical checkout directory for an origin at a ref or revision
pub fn canonical_checkout_dir(root: &Path, origin: &str, ref_or_revision: &str) -> PathBuf {
    origin_dir(root, origin).join(sanitize_path_component(ref_or_revision))
}

/// A fresh, uniquely suffixed temporary checkout directory.
///
/// The directory itself is not created.
pub fn temp_checkout_dir(root: &Path, origin: &str, r#ref: &str) -> PathBuf {
    let random = uuid::Uuid::new_v4().simple().to_string();
    origin_dir(root, origin).join(TEMP_DIR_NAME).join(format!(
        "{}-{}",
        sanitize_path_component(r#ref),
        &random[..8]
    ))
}

/// Whether a ref already names a commit (7 to 40 hex characters)
pub fn is_revision_like(r#ref: &str) -> bool {
    (7..=40).contains(&r#ref.len()) && r#ref.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_origin_hash_shape() {
        let hash = origin_hash("https://github.com/example/standards.git");
        assert_eq!(hash.len(), 12);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_origin_hash_empty_origin() {
        // sha256("") = e3b0c44298fc1c149afbf4c8996fb924...
        assert_eq!(origin_hash(""), "e3b0c44298fc");
    }

    #[test]
    fn test_origin_hash_no_collisions_in_sample() {
        let mut seen = HashSet::new();
        for i in 0..50_000 {
            let origin = format!("https://git.example.com/group-{}/repo-{}.git", i % 97, i);
            assert!(seen.insert(origin_hash(&origin)), "collision for {origin}");
        }
    }

    #[test]
    fn test_sanitize_path_component() {
        assert_eq!(sanitize_path_component("feature/foo"), "feature_foo");
        assert_eq!(sanitize_path_component(r#"a\b:c*d?e"f<g>h|i"#), "a_b_c_d_e_f_g_h_i");
        assert_eq!(sanitize_path_component("v1.2.3"), "v1.2.3");
    }

    #[test]
    fn test_canonical_checkout_dir_layout() {
        let root = PathBuf::from("/cache");
        let origin = "https://example.com/repo.git";
        let dir = canonical_checkout_dir(&root, origin, "release/1.0");
        assert_eq!(dir, root.join(origin_hash(origin)).join("release_1.0"));
    }

    #[test]
    fn test_temp_checkout_dir_is_unique() {
        let root = PathBuf::from("/cache");
        let origin = "https://example.com/repo.git";
        let a = temp_checkout_dir(&root, origin, "main");
        let b = temp_checkout_dir(&root, origin, "main");
        assert_ne!(a, b);
        assert_eq!(a.parent().unwrap(), root.join(origin_hash(origin)).join("tmp"));

        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        let suffix = name.strip_prefix("main-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_is_revision_like() {
        assert!(is_revision_like("abc1234"));
        assert!(is_revision_like("0123456789abcdef0123456789abcdef01234567"));
        assert!(!is_revision_like("abc123"));
        assert!(!is_revision_like("0123456789abcdef0123456789abcdef012345678"));
        assert!(!is_revision_like("main"));
        assert!(!is_revision_like("v1.0.0"));
    }
}
