use super::*;

fn classification(kind: FileKind) -> Classification {
    Classification {
        kind,
        size: 0,
        ctime: None,
        mtime: None,
        atime: None,
    }
}

#[test]
fn directory_without_recursive_is_skipped_with_diagnostic() {
    let policy = ExpertPolicy::new(TypePolicy::default(), false, false, false);
    let c = classification(FileKind::Directory);
    let (decision, msg) = policy.decide(Path::new("d"), &c, None);
    assert_eq!(decision, Decision::Skip);
    assert_eq!(msg.as_deref(), Some("Is a directory"));
}

#[test]
fn directory_with_recursive_descends() {
    let policy = ExpertPolicy::new(TypePolicy::default(), true, false, false);
    let c = classification(FileKind::Directory);
    let (decision, _) = policy.decide(Path::new("d"), &c, None);
    assert_eq!(decision, Decision::Recurse);
}

#[test]
fn regular_file_is_hashed_by_default_policy() {
    let policy = ExpertPolicy::new(TypePolicy::default(), false, false, false);
    let c = classification(FileKind::Regular);
    let (decision, _) = policy.decide(Path::new("f"), &c, None);
    assert_eq!(decision, Decision::Hash);
}

#[test]
fn non_expert_mode_hashes_other_kinds_too() {
    // Per `should_hash` in the original tool, the type bitmap only gates
    // anything once `-o` is given; plain default mode hashes everything
    // it can classify except directories and unknowns.
    let policy = ExpertPolicy::new(TypePolicy::default(), false, false, false);
    let c = classification(FileKind::Pipe);
    let (decision, _) = policy.decide(Path::new("p"), &c, None);
    assert_eq!(decision, Decision::Hash);
}

#[test]
fn non_expert_mode_skips_unknown_kind_with_diagnostic() {
    let policy = ExpertPolicy::new(TypePolicy::default(), false, false, false);
    let c = classification(FileKind::Unknown);
    let (decision, msg) = policy.decide(Path::new("u"), &c, None);
    assert_eq!(decision, Decision::Skip);
    assert_eq!(msg.as_deref(), Some("unknown file type"));
}

#[test]
fn expert_mode_disallowed_type_is_skipped_silently() {
    let policy = ExpertPolicy::new(TypePolicy::default(), false, false, true);
    let c = classification(FileKind::Pipe);
    let (decision, msg) = policy.decide(Path::new("p"), &c, None);
    assert_eq!(decision, Decision::Skip);
    assert!(msg.is_none());
}

#[test]
fn symlink_to_directory_applies_directory_rule_not_hash() {
    let policy = ExpertPolicy::new(TypePolicy::all(), true, false, true);
    let link = classification(FileKind::Symlink);
    let target = classification(FileKind::Directory);
    let (decision, _) = policy.decide(Path::new("l"), &link, Some(&target));
    assert_eq!(decision, Decision::Recurse);
}

#[test]
fn symlink_to_regular_file_is_hashed() {
    let policy = ExpertPolicy::new(TypePolicy::all(), true, false, true);
    let link = classification(FileKind::Symlink);
    let target = classification(FileKind::Regular);
    let (decision, _) = policy.decide(Path::new("l"), &link, Some(&target));
    assert_eq!(decision, Decision::Hash);
}

#[test]
fn non_expert_mode_follows_symlink_without_l_in_any_set() {
    // Non-expert mode never consults the allowed-type bitmap for symlinks.
    let policy = ExpertPolicy::new(TypePolicy::default(), true, false, false);
    let link = classification(FileKind::Symlink);
    let target = classification(FileKind::Regular);
    let (decision, _) = policy.decide(Path::new("l"), &link, Some(&target));
    assert_eq!(decision, Decision::Hash);
}

#[test]
fn expert_mode_symlink_not_in_allowed_set_is_skipped() {
    let policy = ExpertPolicy::new(TypePolicy::default(), true, false, true);
    let link = classification(FileKind::Symlink);
    let (decision, _) = policy.decide(Path::new("l"), &link, None);
    assert_eq!(decision, Decision::Skip);
}

#[test]
fn dangling_symlink_is_skipped_with_diagnostic() {
    let policy = ExpertPolicy::new(TypePolicy::default(), true, false, false);
    let link = classification(FileKind::Symlink);
    let (decision, msg) = policy.decide(Path::new("l"), &link, None);
    assert_eq!(decision, Decision::Skip);
    assert_eq!(msg.as_deref(), Some("dangling symlink"));
}

#[test]
fn from_letters_parses_each_flag() {
    let p = TypePolicy::from_letters("bcpfsld");
    assert!(p.block && p.character && p.pipe && p.regular && p.socket && p.door && p.symlink);
}
