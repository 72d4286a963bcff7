use super::*;

fn record(name: &str, size: u64, md5: &str) -> FileRecord {
    let mut r = FileRecord::new(name, size);
    r.hash_hex.insert(AlgorithmId::Md5, md5.to_string());
    r
}

#[test]
fn add_indexes_under_every_nonempty_hash() {
    let mut store = KnownHashStore::new();
    store.add(record("a.txt", 3, "900150983cd24fb0d6963f7d28e17f72"));
    assert_eq!(store.len(), 1);
    let found = store.find(
        AlgorithmId::Md5,
        "900150983cd24fb0d6963f7d28e17f72",
        "a.txt",
        7,
    );
    assert!(found.is_some());
    assert_eq!(
        found.unwrap().matched_file_number.load(Ordering::Relaxed),
        7
    );
}

#[test]
fn find_prefers_matching_file_name() {
    let mut store = KnownHashStore::new();
    store.add(record("other.txt", 3, "900150983cd24fb0d6963f7d28e17f72"));
    store.add(record("abc.txt", 3, "900150983cd24fb0d6963f7d28e17f72"));
    let hit = store
        .find(
            AlgorithmId::Md5,
            "900150983cd24fb0d6963f7d28e17f72",
            "abc.txt",
            1,
        )
        .unwrap();
    assert_eq!(hit.file_name, "abc.txt");
}

#[test]
fn search_exact_match() {
    let mut store = KnownHashStore::new();
    store.add(record("abc.txt", 3, "900150983cd24fb0d6963f7d28e17f72"));
    let candidate = record("abc.txt", 3, "900150983cd24fb0d6963f7d28e17f72");
    let verdict = store.search(&candidate, &[AlgorithmId::Md5]);
    assert_eq!(verdict, MatchVerdict::Match);
}

#[test]
fn search_file_name_mismatch_is_still_content_match() {
    let mut store = KnownHashStore::new();
    store.add(record("other.txt", 3, "900150983cd24fb0d6963f7d28e17f72"));
    let candidate = record("abc.txt", 3, "900150983cd24fb0d6963f7d28e17f72");
    let verdict = store.search(&candidate, &[AlgorithmId::Md5]);
    assert_eq!(verdict, MatchVerdict::FileNameMismatch);
}

#[test]
fn search_file_size_mismatch() {
    let mut store = KnownHashStore::new();
    store.add(record("abc.txt", 999, "900150983cd24fb0d6963f7d28e17f72"));
    let candidate = record("abc.txt", 3, "900150983cd24fb0d6963f7d28e17f72");
    let verdict = store.search(&candidate, &[AlgorithmId::Md5]);
    assert_eq!(verdict, MatchVerdict::FileSizeMismatch);
}

#[test]
fn search_partial_match_on_secondary_algorithm_disagreement() {
    let mut store = KnownHashStore::new();
    let mut known = record("abc.txt", 3, "900150983cd24fb0d6963f7d28e17f72");
    known.hash_hex.insert(
        AlgorithmId::Sha256,
        "b".repeat(64),
    );
    store.add(known);

    let mut candidate = record("abc.txt", 3, "900150983cd24fb0d6963f7d28e17f72");
    candidate.hash_hex.insert(
        AlgorithmId::Sha256,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".chars().take(64).collect(),
    );
    let verdict = store.search(&candidate, &[AlgorithmId::Md5, AlgorithmId::Sha256]);
    assert_eq!(verdict, MatchVerdict::PartialMatch);
}

#[test]
fn search_no_match_when_hash_absent() {
    let store = KnownHashStore::new();
    let candidate = record("abc.txt", 3, "900150983cd24fb0d6963f7d28e17f72");
    let verdict = store.search(&candidate, &[AlgorithmId::Md5]);
    assert_eq!(verdict, MatchVerdict::NoMatch);
}

#[test]
fn count_unused_skips_matched_records() {
    let mut store = KnownHashStore::new();
    store.add(record("a.txt", 3, "900150983cd24fb0d6963f7d28e17f72"));
    store.add(record("b.txt", 3, "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
    store.find(
        AlgorithmId::Md5,
        "900150983cd24fb0d6963f7d28e17f72",
        "a.txt",
        1,
    );
    let mut seen = Vec::new();
    let unused = store.count_unused(|r| seen.push(r.file_name.clone()));
    assert_eq!(unused, 1);
    assert_eq!(seen, vec!["b.txt".to_string()]);
}
