//! Display buckets and request tallies
use crate::request::ResourceRequest;
use serde::{Deserialize, Serialize};

/// Three-way view of the richer lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBucket {
    Pending,
    Approved,
    Rejected,
}

/// Classifies a raw lifecycle status.
///
/// Anything that is neither pending nor rejected lands in `Approved`, including
/// unknown, empty and missing values. Stats and filters rely on that fallback,
/// so any change to it belongs here and nowhere else.
pub fn bucket(status: Option<&str>) -> StatusBucket {
    let normalised = status.map(|s| s.trim().to_ascii_lowercase());

    match normalised.as_deref() {
        Some("pending") => StatusBucket::Pending,
        Some("rejected") => StatusBucket::Rejected,
        Some("approved" | "partially-approved" | "delivered" | "refetched") => {
            StatusBucket::Approved
        }
        // TODO: surface unknown statuses separately once product confirms the intended bucket
        _ => StatusBucket::Approved,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl RequestStats {
    pub fn record(&mut self, bucket: StatusBucket) {
        self.total += 1;
        match bucket {
            StatusBucket::Pending => self.pending += 1,
            StatusBucket::Approved => self.approved += 1,
            StatusBucket::Rejected => self.rejected += 1,
        }
    }

    pub fn count(&self, bucket: StatusBucket) -> usize {
        match bucket {
            StatusBucket::Pending => self.pending,
            StatusBucket::Approved => self.approved,
            StatusBucket::Rejected => self.rejected,
        }
    }
}

/// Folds requests into bucket counts.
pub fn aggregate<'a, I>(requests: I) -> RequestStats
where
    I: IntoIterator<Item = &'a ResourceRequest>,
{
    requests
        .into_iter()
        .fold(RequestStats::default(), |mut stats, request| {
            stats.record(bucket(request.status.as_deref()));
            stats
        })
}

/// Requests whose status falls in `wanted`, in their original order.
pub fn filter_by_bucket(requests: &[ResourceRequest], wanted: StatusBucket) -> Vec<&ResourceRequest> {
    requests
        .iter()
        .filter(|r| bucket(r.status.as_deref()) == wanted)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_status(status: Option<&str>) -> ResourceRequest {
        ResourceRequest {
            id: "r".into(),
            status: status.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn normalises_before_matching() {
        assert_eq!(bucket(Some("PENDING ")), StatusBucket::Pending);
        assert_eq!(bucket(Some("Rejected")), StatusBucket::Rejected);
        assert_eq!(bucket(Some("  Delivered\t")), StatusBucket::Approved);
    }

    #[test]
    fn approved_family() {
        for s in ["approved", "partially-approved", "delivered", "refetched"] {
            assert_eq!(bucket(Some(s)), StatusBucket::Approved, "{s}");
        }
    }

    #[test]
    fn unknown_falls_back_to_approved() {
        assert_eq!(bucket(Some("")), StatusBucket::Approved);
        assert_eq!(bucket(Some("   ")), StatusBucket::Approved);
        assert_eq!(bucket(Some("on-hold")), StatusBucket::Approved);
        assert_eq!(bucket(None), StatusBucket::Approved);
    }

    #[test]
    fn aggregate_counts_one_bucket_each() {
        let requests = vec![
            with_status(Some("pending")),
            with_status(Some("approved")),
            with_status(Some("rejected")),
            with_status(Some("refetched")),
            with_status(None),
        ];
        let stats = aggregate(&requests);
        assert_eq!(
            stats,
            RequestStats {
                total: 5,
                pending: 1,
                approved: 3,
                rejected: 1,
            }
        );
        assert_eq!(filter_by_bucket(&requests, StatusBucket::Approved).len(), 3);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate(&Vec::<ResourceRequest>::new()), RequestStats::default());
    }

    #[test]
    fn stats_decode_from_backend() {
        let stats: RequestStats =
            serde_json::from_str(r#"{"total": 4, "pending": 2, "approved": 1, "rejected": 1}"#)
                .unwrap();
        assert_eq!(stats.count(StatusBucket::Pending), 2);
    }
}
