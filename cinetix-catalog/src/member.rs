use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a single VIP application review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VipApproval {
    pub approved: bool,
    pub decided_at: DateTime<Utc>,
}

/// A registered member. VIP benefits require both the flag and at least
/// one approved application on file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub display_name: String,
    pub vip_status: bool,
    pub approvals: Vec<VipApproval>,
}

impl Member {
    pub fn is_approved(&self) -> bool {
        self.approvals.iter().any(|a| a.approved)
    }

    pub fn is_active_vip(&self) -> bool {
        self.vip_status && self.is_approved()
    }
}
