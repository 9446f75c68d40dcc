use chrono::{NaiveDate, TimeZone, Utc};
use field_domain::{parse_bool, parse_requested_at, parse_scheduled_date, AddressInput, CustomerInput, DomainError,
                   NewService, ServiceRequestPayload, WarrantyClaim, WarrantyLookup, WorkorderPatch, WorkorderPayload};
use serde_json::json;

fn payload(requested_at: &str) -> ServiceRequestPayload {
    ServiceRequestPayload { customer: CustomerInput::new("Ada", "Lovelace", "555-0100", "  A@X.com "),
                            address: AddressInput::new("1 Main St", "Springfield", "IL", "62701"),
                            service_id: 5,
                            description: "  leaking faucet ".into(),
                            requested_at: requested_at.into() }
}

#[test]
fn test_payload_validation_normalizes_fields() {
    let draft = payload("2025-10-22T14:00:00Z").validate().unwrap();
    assert_eq!(draft.customer.email, "a@x.com");
    assert_eq!(draft.description, "leaking faucet");
    assert_eq!(draft.requested_at, Utc.with_ymd_and_hms(2025, 10, 22, 14, 0, 0).unwrap());
}

#[test]
fn test_payload_rejects_unparsable_date() {
    let err = payload("tomorrow-ish").validate().unwrap_err();
    assert!(matches!(err, DomainError::ValidationError(ref m) if m.contains("requestedAt")));
}

#[test]
fn test_payload_rejects_non_positive_service() {
    let mut p = payload("2025-10-22T14:00:00Z");
    p.service_id = 0;
    assert!(p.validate().is_err());
}

#[test]
fn test_customer_requires_names_and_valid_email() {
    assert!(CustomerInput::new("", "B", "1", "a@x.com").validate().is_err());
    assert!(CustomerInput::new("A", "B", "1", "not-an-email").validate().is_err());
    assert!(CustomerInput::new("A", "B", "1", "a@@x.com").validate().is_err());
    assert!(AddressInput::new("street", "", "IL", "1").validate().is_err());
}

#[test]
fn test_requested_at_accepts_local_and_offset_forms() {
    let expected = Utc.with_ymd_and_hms(2025, 10, 22, 14, 0, 0).unwrap();
    assert_eq!(parse_requested_at("2025-10-22T14:00").unwrap(), expected);
    assert_eq!(parse_requested_at("2025-10-22 14:00:00").unwrap(), expected);
    assert_eq!(parse_requested_at("2025-10-22T09:00:00-05:00").unwrap(), expected);
    assert!(parse_requested_at("").is_err());
}

#[test]
fn test_payload_deserializes_legacy_field_names() {
    let p: ServiceRequestPayload = serde_json::from_value(json!({
        "customer": {"firstname": "A", "lastname": "B", "phone": "1", "email": "a@x.com"},
        "address": {"address": "1 Main", "city": "C", "state": "S", "zip_code": "00001"},
        "serviceId": 5,
        "preferred_datetime": "2025-10-22T14:00"
    })).unwrap();
    assert_eq!(p.address.zip, "00001");
    assert!(p.validate().is_ok());
}

#[test]
fn test_workorder_reports_every_missing_field() {
    let err = WorkorderPayload { workorder_id: Some(1), ..Default::default() }.validate().unwrap_err();
    assert_eq!(err.to_string(), "Missing required fields: requestId, customerId, scheduledDate, isCompleted");
}

#[test]
fn test_workorder_payload_snake_case_and_lenient_bool() {
    let p: WorkorderPayload = serde_json::from_value(json!({
        "workorder_id": 7, "request_id": 1, "customer_id": 2,
        "scheduled_date": "2025-10-03", "is_completed": "yes"
    })).unwrap();
    let wo = p.validate().unwrap();
    assert_eq!(wo.scheduled_date, NaiveDate::from_ymd_opt(2025, 10, 3).unwrap());
    assert!(wo.is_completed);
}

#[test]
fn test_parse_bool_variants() {
    assert!(parse_bool(Some(&json!(true)), false));
    assert!(parse_bool(Some(&json!(1)), false));
    assert!(parse_bool(Some(&json!("T")), false));
    assert!(!parse_bool(Some(&json!("no")), true));
    assert!(parse_bool(None, true));
    assert!(!parse_bool(Some(&json!(null)), false));
}

#[test]
fn test_scheduled_date_is_strict() {
    assert!(parse_scheduled_date("2025-10-03").is_ok());
    assert!(parse_scheduled_date("10/03/2025").is_err());
    assert!(parse_scheduled_date(" ").is_err());
}

#[test]
fn test_patch_emptiness() {
    assert!(WorkorderPatch::default().is_empty());
    assert!(!WorkorderPatch { is_completed: Some(true), ..Default::default() }.is_empty());
}

#[test]
fn test_warranty_lookup_requires_identifier() {
    assert!(WarrantyLookup { email: Some("  ".into()), phone: None }.validate().is_err());
    let ok = WarrantyLookup { email: Some(" A@X.com".into()), phone: Some("".into()) }.validate().unwrap();
    assert_eq!(ok.email.as_deref(), Some("a@x.com"));
    assert_eq!(ok.phone, None);
}

#[test]
fn test_new_service_validation() {
    let svc = NewService { name: " Drain cleaning ".into(),
                           category: "Plumbing".into(),
                           price_cents: 12_500,
                           duration_minutes: Some(90),
                           description: Some("   ".into()) };
    let v = svc.validate().unwrap();
    assert_eq!(v.name, "Drain cleaning");
    assert_eq!(v.description, None);
    assert!(NewService { price_cents: -1, ..svc.clone() }.validate().is_err());
    assert!(NewService { duration_minutes: Some(0), ..svc }.validate().is_err());
}

#[test]
fn test_warranty_claim_requires_ids_issue_and_description() {
    let full: WarrantyClaim = serde_json::from_value(json!({
        "warrantyId": 4, "workOrderId": 12, "email": " Ann@X.com ", "phone": "",
        "issueType": "Leak", "urgency": "high", "problemDescription": "  water under sink "
    })).unwrap();
    let claim = full.validate().unwrap();
    assert_eq!((claim.warranty_id, claim.work_order_id), (4, 12));
    assert_eq!(claim.email.as_deref(), Some("ann@x.com"));
    assert_eq!(claim.phone, None);
    assert_eq!(claim.problem_description, "water under sink");

    let err = |c: WarrantyClaim| c.validate().unwrap_err().to_string();
    assert_eq!(err(WarrantyClaim { work_order_id: None, ..full.clone() }), "Warranty ID and Work Order ID required");
    assert_eq!(err(WarrantyClaim { urgency: " ".into(), ..full.clone() }), "Issue type and urgency are required");
    assert_eq!(err(WarrantyClaim { problem_description: String::new(), ..full }), "Problem description is required");
}
