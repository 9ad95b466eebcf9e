//! Turning user-supplied names into object IDs.
//!
//! A name may be `HEAD`, a hex ID prefix (4 to 40 characters), a full ref
//! name, or a short tag, branch or remote-branch name. Every interpretation
//! that matches contributes a candidate; the caller decides what one, none or
//! several candidates mean.

use bgit_store::{ObjectKind, ObjectStore, StoreError};
use bgit_types::{is_hex_prefix, ObjectId};
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;

/// Namespaces a short name is tried in, in order.
const SHORT_NAME_NAMESPACES: [&str; 3] = ["refs/tags/", "refs/heads/", "refs/remotes/"];

/// Every object ID `name` could denote, deduplicated, in lookup order.
///
/// `HEAD` resolves only as HEAD. Otherwise a hex-looking name is matched
/// against stored IDs, then tried as a full ref name and as a tag, branch
/// and remote branch.
pub fn resolve_candidates(
    refs: &dyn RefStore,
    objects: &dyn ObjectStore,
    name: &str,
) -> Result<Vec<ObjectId>> {
    if name.is_empty() {
        return Ok(Vec::new());
    }
    if name == "HEAD" {
        return Ok(refs.resolve("HEAD")?.into_iter().collect());
    }

    let mut candidates = Vec::new();
    if is_hex_prefix(name) {
        candidates.extend(objects.find_by_prefix(&name.to_ascii_lowercase())?);
    }

    let full = std::iter::once(name.to_string())
        .filter(|n| n.starts_with("refs/"))
        .chain(SHORT_NAME_NAMESPACES.iter().map(|ns| format!("{ns}{name}")));
    for ref_name in full {
        if validate_ref_name(&ref_name).is_err() {
            continue;
        }
        if let Some(id) = refs.resolve(&ref_name)? {
            if !candidates.contains(&id) {
                candidates.push(id);
            }
        }
    }

    debug!(name, count = candidates.len(), "resolved candidates");
    Ok(candidates)
}

/// Resolve `name` to exactly one object.
///
/// With `kind` set, the object must be of that kind. When `follow` is also
/// set, tags are peeled to their target and commits to their tree until the
/// kind matches.
pub fn find_object(
    refs: &dyn RefStore,
    objects: &dyn ObjectStore,
    name: &str,
    kind: Option<ObjectKind>,
    follow: bool,
) -> Result<ObjectId> {
    let candidates = resolve_candidates(refs, objects, name)?;
    let mut id = match candidates.as_slice() {
        [] => {
            return Err(RefError::NotFound {
                name: name.to_string(),
            })
        }
        [only] => *only,
        _ => {
            return Err(RefError::Ambiguous {
                name: name.to_string(),
                candidates,
            })
        }
    };

    let Some(expected) = kind else {
        return Ok(id);
    };

    loop {
        let object = objects.read(&id)?;
        let actual = object.kind();
        if actual == expected {
            return Ok(id);
        }
        let mismatch = || RefError::Store(StoreError::UnexpectedKind { expected, actual });
        if !follow {
            return Err(mismatch());
        }
        id = match actual {
            ObjectKind::Tag => object.into_tag()?.target()?,
            ObjectKind::Commit if expected == ObjectKind::Tree => object.into_commit()?.tree()?,
            _ => return Err(mismatch()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRefStore;
    use crate::types::RefValue;
    use bgit_store::{Blob, Commit, InMemoryObjectStore, Kvlm, Object, Tag, Tree, TreeEntry};

    struct Fixture {
        refs: InMemoryRefStore,
        objects: InMemoryObjectStore,
        blob: ObjectId,
        tree: ObjectId,
        commit: ObjectId,
        tag: ObjectId,
    }

    fn fixture() -> Fixture {
        let refs = InMemoryRefStore::with_default_head();
        let objects = InMemoryObjectStore::new();

        let blob = objects.write(&Object::from(Blob::new(b"hello\n".to_vec()))).unwrap();
        let tree = objects
            .write(&Object::from(Tree::new(vec![TreeEntry::new("100644", "hello.txt", blob)])))
            .unwrap();

        let mut kvlm = Kvlm::new();
        kvlm.push("tree", tree.to_hex());
        kvlm.set_message("init\n");
        let commit = objects.write(&Object::from(Commit::new(kvlm))).unwrap();

        let mut kvlm = Kvlm::new();
        kvlm.push("object", commit.to_hex());
        kvlm.push("type", "commit");
        kvlm.push("tag", "v1");
        let tag = objects.write(&Object::from(Tag::new(kvlm))).unwrap();

        refs.write_ref("refs/heads/master", &RefValue::Direct(commit)).unwrap();
        refs.write_ref("refs/tags/v1", &RefValue::Direct(tag)).unwrap();
        refs.write_ref("refs/tags/light", &RefValue::Direct(commit)).unwrap();

        Fixture { refs, objects, blob, tree, commit, tag }
    }

    #[test]
    fn head_resolves_through_branch() {
        let f = fixture();
        assert_eq!(resolve_candidates(&f.refs, &f.objects, "HEAD").unwrap(), vec![f.commit]);
    }

    #[test]
    fn short_names_and_full_names() {
        let f = fixture();
        assert_eq!(resolve_candidates(&f.refs, &f.objects, "master").unwrap(), vec![f.commit]);
        assert_eq!(resolve_candidates(&f.refs, &f.objects, "v1").unwrap(), vec![f.tag]);
        assert_eq!(
            resolve_candidates(&f.refs, &f.objects, "refs/heads/master").unwrap(),
            vec![f.commit]
        );
        assert!(resolve_candidates(&f.refs, &f.objects, "nope").unwrap().is_empty());
        assert!(resolve_candidates(&f.refs, &f.objects, "").unwrap().is_empty());
    }

    #[test]
    fn hex_prefix_lookup() {
        let f = fixture();
        let hex = f.blob.to_hex();
        assert_eq!(resolve_candidates(&f.refs, &f.objects, &hex[..7]).unwrap(), vec![f.blob]);
        assert_eq!(resolve_candidates(&f.refs, &f.objects, &hex).unwrap(), vec![f.blob]);
        assert_eq!(
            resolve_candidates(&f.refs, &f.objects, &hex[..7].to_uppercase()).unwrap(),
            vec![f.blob]
        );
        // Three characters is too short to be treated as a prefix.
        assert!(resolve_candidates(&f.refs, &f.objects, &hex[..3]).unwrap().is_empty());
    }

    #[test]
    fn non_hex_names_skip_prefix_search() {
        let f = fixture();
        // "cafe-x" is not hex, so only refs are consulted.
        f.refs.write_ref("refs/heads/cafe-x", &RefValue::Direct(f.tree)).unwrap();
        assert_eq!(resolve_candidates(&f.refs, &f.objects, "cafe-x").unwrap(), vec![f.tree]);
    }

    #[test]
    fn same_id_from_two_namespaces_is_one_candidate() {
        let f = fixture();
        f.refs.write_ref("refs/heads/light", &RefValue::Direct(f.commit)).unwrap();
        assert_eq!(resolve_candidates(&f.refs, &f.objects, "light").unwrap(), vec![f.commit]);
    }

    #[test]
    fn shared_four_char_prefix_is_ambiguous() {
        let objects = InMemoryObjectStore::new();
        let refs = InMemoryRefStore::new();

        // Write blobs until two IDs share their first four hex digits.
        let mut seen = std::collections::HashMap::new();
        let (a, b) = (0u32..)
            .find_map(|n| {
                let id = objects.write(&Object::from(Blob::new(n.to_string().into_bytes()))).ok()?;
                let key = id.to_hex()[..4].to_string();
                seen.insert(key, id).map(|prev| (prev, id))
            })
            .unwrap();
        let prefix = &a.to_hex()[..4];

        let mut found = resolve_candidates(&refs, &objects, prefix).unwrap();
        found.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(found, expected);

        match find_object(&refs, &objects, prefix, None, false) {
            Err(RefError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn find_object_peels_when_following() {
        let f = fixture();
        let find = |name, kind, follow| find_object(&f.refs, &f.objects, name, kind, follow);

        assert_eq!(find("v1", None, false).unwrap(), f.tag);
        assert_eq!(find("v1", Some(ObjectKind::Tag), false).unwrap(), f.tag);
        assert_eq!(find("v1", Some(ObjectKind::Commit), true).unwrap(), f.commit);
        assert_eq!(find("v1", Some(ObjectKind::Tree), true).unwrap(), f.tree);
        assert_eq!(find("master", Some(ObjectKind::Tree), true).unwrap(), f.tree);

        assert!(matches!(
            find("v1", Some(ObjectKind::Commit), false),
            Err(RefError::Store(StoreError::UnexpectedKind { .. }))
        ));
        // A commit never peels to a blob.
        assert!(matches!(
            find("master", Some(ObjectKind::Blob), true),
            Err(RefError::Store(StoreError::UnexpectedKind { .. }))
        ));
        assert!(matches!(find("missing", None, false), Err(RefError::NotFound { .. })));
    }
}
