//! Smoke Screen Unit tests for the resource request components
//!
//! These tests span the codebase, testing behaviour in isolation from the
//! service scenarios. They are intended as a smoke-screen and mostly cover the
//! happy path plus the documented edge cases of each component.
//!

use grams_requests::{
    completion::{AfterImage, TaskCompletionDraft},
    draft::{ResourceKind, ResourceLine, ResourceRequestDraft},
    error::ValidationError,
    ledger::{BudgetState, ExpenseLedger},
    request::{Priority, RequestStatus, ResourceRequest, TimeStamp},
    review::{RefetchOrder, Rejection},
    status::{RequestStats, StatusBucket, aggregate, bucket},
    utils::{format_inr, new_uuid_to_bech32},
};

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// Test that new_uuid_to_bech32 generates valid bech32-encoded strings
    /// with the correct human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let encoded = new_uuid_to_bech32("expense_").unwrap();
        assert!(encoded.starts_with("expense_1"));
        assert!(encoded.len() > 10);
    }

    /// Empty prefixes are not valid bech32
    #[test]
    fn handles_empty_hrp() {
        assert!(new_uuid_to_bech32("").is_err());
    }

    /// Test that multiple calls generate unique identifiers
    #[test]
    fn generates_unique_ids() {
        let id1 = new_uuid_to_bech32("line_").unwrap();
        let id2 = new_uuid_to_bech32("line_").unwrap();
        assert_ne!(id1, id2);
    }

    #[test]
    fn rupee_formatting() {
        assert_eq!(format_inr(250000.0), "₹2,50,000.00");
    }
}

// STATUS MODULE TESTS
#[cfg(test)]
mod status_tests {
    use super::*;

    fn request(status: Option<&str>) -> ResourceRequest {
        ResourceRequest {
            id: new_uuid_to_bech32("req_").unwrap(),
            status: status.map(String::from),
            ..Default::default()
        }
    }

    /// Casing and whitespace are ignored; unknown and missing values count as approved
    #[test]
    fn documented_bucket_examples() {
        assert_eq!(bucket(Some("PENDING ")), StatusBucket::Pending);
        assert_eq!(bucket(Some("Rejected")), StatusBucket::Rejected);
        assert_eq!(bucket(Some("partially-approved")), StatusBucket::Approved);
        assert_eq!(bucket(Some("")), StatusBucket::Approved);
        assert_eq!(bucket(None), StatusBucket::Approved);
    }

    /// Every typed status string lands in the bucket its name suggests
    #[test]
    fn typed_statuses_round_through_classifier() {
        let cases = [
            (RequestStatus::Pending, StatusBucket::Pending),
            (RequestStatus::Approved, StatusBucket::Approved),
            (RequestStatus::PartiallyApproved, StatusBucket::Approved),
            (RequestStatus::Rejected, StatusBucket::Rejected),
            (RequestStatus::Delivered, StatusBucket::Approved),
            (RequestStatus::Refetched, StatusBucket::Approved),
        ];
        for (status, expected) in cases {
            assert_eq!(bucket(Some(status.as_str())), expected);
            assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn empty_aggregate() {
        let stats = aggregate(&Vec::<ResourceRequest>::new());
        assert_eq!(
            stats,
            RequestStats {
                total: 0,
                pending: 0,
                approved: 0,
                rejected: 0
            }
        );
    }

    #[test]
    fn mixed_aggregate() {
        let list = vec![
            request(Some("pending")),
            request(Some("Pending")),
            request(Some("delivered")),
            request(Some("rejected")),
            request(Some("archived")),
        ];
        let stats = aggregate(&list);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.approved, 2);
        assert_eq!(stats.rejected, 1);
    }
}

// LEDGER MODULE TESTS
#[cfg(test)]
mod ledger_tests {
    use super::*;

    fn ledger(allocated: f64, amounts: &[&str]) -> ExpenseLedger {
        let mut ledger = ExpenseLedger::new(allocated);
        for amount in amounts {
            let id = ledger.add_entry().unwrap();
            ledger.set_amount(&id, amount).unwrap();
        }
        ledger
    }

    /// 1000 allocated, 300 + 200 spent
    #[test]
    fn under_budget() {
        match ledger(1000.0, &["300", "200"]).summary() {
            BudgetState::Allocated(s) => {
                assert_eq!(s.total_used, 500.0);
                assert_eq!(s.remaining, 500.0);
                assert!(!s.is_over_budget);
            }
            BudgetState::Unallocated => panic!("budget was allocated"),
        }
    }

    /// 1000 allocated, 400 recorded, then 700 refused on the second entry
    #[test]
    fn edit_past_allocation_is_refused() {
        let mut ledger = ledger(1000.0, &["400"]);
        let id = ledger.add_entry().unwrap();
        ledger.set_amount(&id, "100").unwrap();

        let err = ledger.set_amount(&id, "700").unwrap_err();
        assert_eq!(
            err,
            ValidationError::ExceedsBudget {
                total: 1100.0,
                allocated: 1000.0
            }
        );
        assert_eq!(ledger.entries()[1].amount, "100");
    }

    #[test]
    fn unallocated_budget() {
        assert_eq!(ExpenseLedger::new(0.0).summary(), BudgetState::Unallocated);
    }
}

// DRAFT MODULE TESTS
#[cfg(test)]
mod draft_tests {
    use super::*;

    /// Test that the draft builder pattern produces a valid payload
    #[test]
    fn draft_builder_sets_fields() {
        let draft = ResourceRequestDraft::new()
            .for_grievance("g-77")
            .set_priority(Priority::Urgent)
            .set_description("Streetlight replacement, ward 4")
            .set_fund_amount("12000")
            .add_line(
                ResourceLine::new(ResourceKind::Equipment)
                    .unwrap()
                    .named("Cherry picker")
                    .with_reason("Lamp posts are 9m high")
                    .with_estimated_cost(9000.0),
            )
            .add_line(
                ResourceLine::new(ResourceKind::Material)
                    .unwrap()
                    .named("LED lamp")
                    .with_quantity(6)
                    .with_reason("Replace failed units")
                    .with_estimated_cost(3000.0),
            );

        let (hash, body) = draft.validate_and_finalise().unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(body.request_type, "mixed");
        assert_eq!(body.priority, Priority::Urgent);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["grievanceId"], "g-77");
        assert_eq!(json["equipment"][0]["name"], "Cherry picker");
        assert_eq!(json["materials"][0]["quantity"], 6);
    }

    /// A named resource with an empty reason stops the submission
    #[test]
    fn named_resource_needs_reason() {
        let draft = ResourceRequestDraft::new()
            .for_grievance("g-1")
            .set_description("Drain cleaning")
            .set_fund_amount("500")
            .add_line(
                ResourceLine::new(ResourceKind::Material)
                    .unwrap()
                    .named("Bleaching powder"),
            );
        assert_eq!(
            draft.validate(),
            Err(ValidationError::MissingReason("Bleaching powder".into()))
        );
    }
}

// REVIEW MODULE TESTS
#[cfg(test)]
mod review_tests {
    use super::*;

    fn allocated(remaining: f64) -> ResourceRequest {
        ResourceRequest {
            id: "r-9".into(),
            status: Some("approved".into()),
            allocated_amount: Some(2000.0),
            used_amount: 2000.0 - remaining,
            remaining_amount: remaining,
            ..Default::default()
        }
    }

    #[test]
    fn refetch_limits() {
        let req = allocated(800.0);
        assert_eq!(
            RefetchOrder::new(&req, 0.0, "", ""),
            Err(ValidationError::InvalidRefetchAmount)
        );
        assert!(matches!(
            RefetchOrder::new(&req, 801.0, "", ""),
            Err(ValidationError::RefetchExceedsRemaining { .. })
        ));
        assert!(RefetchOrder::new(&req, 800.0, "Returning unused funds", "work done").is_ok());
    }

    #[test]
    fn reject_requires_reason() {
        assert_eq!(
            Rejection::new("\n", Some("sorry")),
            Err(ValidationError::MissingRejectionReason)
        );
    }
}

// COMPLETION MODULE TESTS
#[cfg(test)]
mod completion_tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Nothing else matters when no budget was allocated
    #[test]
    fn zero_allocation_refuses_completion() {
        let mut draft = TaskCompletionDraft::new(0.0);
        draft.after_image = AfterImage::Uploaded {
            url: "https://cdn.example/done.jpg".into(),
        };
        draft.days_to_complete = "2".into();
        let id = draft.ledger.add_entry().unwrap();
        draft.ledger.set_description(&id, "Gravel").unwrap();
        draft.ledger.set_amount(&id, "300").unwrap();

        assert_eq!(
            draft.validate_and_finalise(),
            Err(ValidationError::NoBudgetAllocated)
        );
    }

    #[test]
    fn timestamps_serialise_as_rfc3339() {
        let ts = TimeStamp::from(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap());
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2024-06-15T10:30:00Z\""
        );
    }
}
