use super::*;

#[test]
fn parse_ignores_dashes_and_case() {
    assert_eq!(AlgorithmId::parse("SHA-256"), Some(AlgorithmId::Sha256));
    assert_eq!(AlgorithmId::parse("sha256"), Some(AlgorithmId::Sha256));
    assert_eq!(AlgorithmId::parse("Sha256"), Some(AlgorithmId::Sha256));
}

#[test]
fn parse_unknown_is_none() {
    assert_eq!(AlgorithmId::parse("crc32"), None);
}

#[test]
fn hex_len_matches_bit_length() {
    for id in ALL_IDS {
        assert_eq!(id.hex_len(), id.bit_length() / 4);
    }
}

#[test]
fn default_registry_enables_nothing() {
    let reg = AlgorithmRegistry::new();
    assert!(!reg.any_in_use());
    assert!(reg.in_use_ids().is_empty());
}

#[test]
fn enable_by_names_csv() {
    let mut reg = AlgorithmRegistry::new();
    reg.enable_by_names("md5,sha1").unwrap();
    assert_eq!(reg.in_use_ids(), vec![AlgorithmId::Md5, AlgorithmId::Sha1]);
}

#[test]
fn enable_by_names_all() {
    let mut reg = AlgorithmRegistry::new();
    reg.enable_by_names("all").unwrap();
    assert_eq!(reg.in_use_ids(), ALL_IDS.to_vec());
}

#[test]
fn enable_by_names_clears_previous() {
    let mut reg = AlgorithmRegistry::new();
    reg.enable_by_names("all").unwrap();
    reg.enable_by_names("md5").unwrap();
    assert_eq!(reg.in_use_ids(), vec![AlgorithmId::Md5]);
}

#[test]
fn enable_by_names_unknown_is_error() {
    let mut reg = AlgorithmRegistry::new();
    assert!(reg.enable_by_names("md5,bogus").is_err());
}

#[test]
fn valid_hash_checks_length_and_hex() {
    assert!(AlgorithmRegistry::valid_hash(
        AlgorithmId::Md5,
        "d41d8cd98f00b204e9800998ecf8427e"
    ));
    assert!(!AlgorithmRegistry::valid_hash(AlgorithmId::Md5, "d41d8cd9"));
    assert!(!AlgorithmRegistry::valid_hash(
        AlgorithmId::Md5,
        "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"
    ));
}

#[test]
fn set_column_order_updates_in_use() {
    let mut reg = AlgorithmRegistry::new();
    reg.set_column_order(vec![AlgorithmId::Sha256, AlgorithmId::Tiger]);
    assert_eq!(
        reg.column_order().to_vec(),
        vec![AlgorithmId::Sha256, AlgorithmId::Tiger]
    );
    assert!(reg.is_in_use(AlgorithmId::Sha256));
    assert!(reg.is_in_use(AlgorithmId::Tiger));
    assert!(!reg.is_in_use(AlgorithmId::Md5));
}
