//! Unit tests for typed identifiers

use core_kernel::{ApplicationId, OfferId, PolicyId, ProductId, QuoteId, UnderwritingCaseId};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn test_each_entity_has_its_own_prefix() {
    assert!(ProductId::new_v7().to_string().starts_with("PRD-"));
    assert!(QuoteId::new_v7().to_string().starts_with("QTE-"));
    assert!(ApplicationId::new_v7().to_string().starts_with("APP-"));
    assert!(UnderwritingCaseId::new_v7().to_string().starts_with("UWC-"));
    assert!(OfferId::new_v7().to_string().starts_with("OFR-"));
    assert!(PolicyId::new_v7().to_string().starts_with("PID-"));
}

#[test]
fn test_parse_accepts_prefixed_and_bare() {
    let id = PolicyId::new_v7();
    let prefixed: PolicyId = id.to_string().parse().unwrap();
    let bare: PolicyId = id.as_uuid().to_string().parse().unwrap();
    assert_eq!(prefixed, id);
    assert_eq!(bare, id);
}

#[test]
fn test_parse_rejects_garbage() {
    assert!("OFR-not-a-uuid".parse::<OfferId>().is_err());
}

#[test]
fn test_v7_ids_sort_by_creation() {
    let first = QuoteId::new_v7();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = QuoteId::new_v7();
    assert!(first < second);
}

#[test]
fn test_ids_are_unique() {
    let ids: HashSet<OfferId> = (0..1000).map(|_| OfferId::new_v7()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn test_serializes_as_bare_uuid() {
    let uuid = Uuid::now_v7();
    let id = ApplicationId::from_uuid(uuid);
    assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{}\"", uuid));
}
