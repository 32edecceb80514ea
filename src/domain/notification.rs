// ==========================================
// 灾后修复项目管理系统 - 通知
// ==========================================
// 对齐: notification 表（按组织只读列表）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,
    pub org_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(org_id: &str, message: &str, now: DateTime<Utc>) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            org_id: org_id.to_string(),
            message: message.to_string(),
            created_at: now,
        }
    }
}
