use super::*;

#[test]
fn plain_digits_mean_bytes() {
    assert_eq!(parse_size_suffix("512").unwrap(), 512);
}

#[test]
fn suffixes_are_case_insensitive_powers_of_1024() {
    assert_eq!(parse_size_suffix("4k").unwrap(), 4 * 1024);
    assert_eq!(parse_size_suffix("4K").unwrap(), 4 * 1024);
    assert_eq!(parse_size_suffix("2m").unwrap(), 2 * 1024 * 1024);
    assert_eq!(parse_size_suffix("1g").unwrap(), 1024 * 1024 * 1024);
}

#[test]
fn bare_b_suffix_means_bytes() {
    assert_eq!(parse_size_suffix("100b").unwrap(), 100);
}

#[test]
fn rejects_garbage() {
    assert!(parse_size_suffix("").is_err());
    assert!(parse_size_suffix("abc").is_err());
}

#[test]
fn personalities_have_distinct_default_algorithms() {
    assert_eq!(MD5DEEP.default_algorithms, &[AlgorithmId::Md5]);
    assert_eq!(SHA256DEEP.default_algorithms, &[AlgorithmId::Sha256]);
    assert!(HASHDEEP.full);
    assert!(!MD5DEEP.full);
}
