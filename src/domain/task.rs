// ==========================================
// 灾后修复项目管理系统 - 任务/合规项领域模型
// ==========================================
// 合规任务与项目任务统一为 Task
// 合规项定义（ComplianceItem）只读,来自合规项定义接口
// ==========================================

use crate::domain::types::{TaskKind, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Task - 项目任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub kind: TaskKind,
    pub assigned_to: Option<String>,
    pub compliance_key: Option<String>, // 关联合规项（可选）
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(title: &str, description: &str, kind: TaskKind, now: DateTime<Utc>) -> Self {
        Self {
            task_id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            status: TaskStatus::Pending,
            kind,
            assigned_to: None,
            compliance_key: None,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

// ==========================================
// ComplianceItem - 合规项定义
// ==========================================
// 对齐: compliance_item 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceItem {
    pub key: String,         // 项目上对应的布尔字段键
    pub description: String, // 描述（如 "Initial inspection documented"）
    pub required: bool,      // false: 只在明细中展示,不参与合规判定
}

impl ComplianceItem {
    pub fn new(key: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            required: true,
        }
    }
}

// ==========================================
// Note - 项目备注
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub note_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(content: &str, now: DateTime<Utc>) -> Self {
        Self {
            note_id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at: now,
        }
    }
}
