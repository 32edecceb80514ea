// ==========================================
// 灾后修复项目管理系统 - 领域类型定义
// ==========================================
// 职责: 项目/任务/设备状态枚举、权限枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 项目状态 (Project Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    InProgress, // 进行中（立项默认）
    Completed,  // 已完成
    OnHold,     // 暂停
    Cancelled,  // 已取消
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::InProgress => write!(f, "IN_PROGRESS"),
            ProjectStatus::Completed => write!(f, "COMPLETED"),
            ProjectStatus::OnHold => write!(f, "ON_HOLD"),
            ProjectStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

// ==========================================
// 任务状态 (Task Status)
// ==========================================
// 合规检查项与项目任务统一为一种状态集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,   // 待处理
    Completed, // 已完成
}

impl TaskStatus {
    /// 切换状态（Pending ↔ Completed）
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ==========================================
// 任务来源 (Task Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    #[default]
    Manual,    // 人工创建
    Automatic, // 定时自动生成
}

// ==========================================
// 设备库存状态 (Equipment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    #[default]
    Available,   // 可用
    InUse,       // 使用中
    Maintenance, // 维护中
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquipmentStatus::Available => write!(f, "AVAILABLE"),
            EquipmentStatus::InUse => write!(f, "IN_USE"),
            EquipmentStatus::Maintenance => write!(f, "MAINTENANCE"),
        }
    }
}

impl EquipmentStatus {
    /// 从数据库字符串解析（未知值按 Available 处理）
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "IN_USE" => EquipmentStatus::InUse,
            "MAINTENANCE" => EquipmentStatus::Maintenance,
            _ => EquipmentStatus::Available,
        }
    }
}

// ==========================================
// 设备部署状态 (Assignment State)
// ==========================================
// 单向状态机: Active → Removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentState {
    Active,  // 运行中（removed_timestamp = None）
    Removed, // 已撤出
}

impl fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentState::Active => write!(f, "ACTIVE"),
            AssignmentState::Removed => write!(f, "REMOVED"),
        }
    }
}

// ==========================================
// 合规状态 (Compliance Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,          // 全部合规项已完成
    PartiallyCompliant, // 存在未完成项
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::Compliant => write!(f, "Compliant"),
            ComplianceStatus::PartiallyCompliant => write!(f, "Partially Compliant"),
        }
    }
}

// ==========================================
// 权限 (Permission)
// ==========================================
// 静态列表查找，不做鉴权
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    EditProject,
    ManageEquipment,
    UpdateCompliance,
    ViewCompliance,
    ViewComplianceDetails,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::EditProject => "edit_project",
            Permission::ManageEquipment => "manage_equipment",
            Permission::UpdateCompliance => "update_compliance",
            Permission::ViewCompliance => "view_compliance",
            Permission::ViewComplianceDetails => "view_compliance_details",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
