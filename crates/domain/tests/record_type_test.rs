use dnstrap_domain::RecordType;
use std::str::FromStr;

#[test]
fn test_known_codes_map_to_variants() {
    assert_eq!(RecordType::from_u16(1), RecordType::A);
    assert_eq!(RecordType::from_u16(28), RecordType::AAAA);
    assert_eq!(RecordType::from_u16(5), RecordType::CNAME);
    assert_eq!(RecordType::from_u16(65), RecordType::HTTPS);
}

#[test]
fn test_unknown_code_is_preserved() {
    let rt = RecordType::from_u16(99);
    assert_eq!(rt, RecordType::Other(99));
    assert_eq!(rt.to_u16(), 99);
    assert_eq!(rt.to_string(), "TYPE99");
}

#[test]
fn test_from_str_accepts_generic_type_syntax() {
    assert_eq!(RecordType::from_str("aaaa").unwrap(), RecordType::AAAA);
    assert_eq!(RecordType::from_str("TYPE28").unwrap(), RecordType::AAAA);
    assert_eq!(RecordType::from_str("type4000").unwrap(), RecordType::Other(4000));
    assert!(RecordType::from_str("bogus").is_err());
}

#[test]
fn test_only_a_and_aaaa_are_address_types() {
    assert!(RecordType::A.is_address());
    assert!(RecordType::AAAA.is_address());
    assert!(!RecordType::MX.is_address());
    assert!(!RecordType::Other(1234).is_address());
}
