// ==========================================
// 灾后修复项目管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository/Engine 错误为用户可读的错误消息
// 约定: 不自动重试,失败时调用方本地状态保持不变
// ==========================================

use crate::domain::types::Permission;
use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ==========================================
// 拉取失败的作用域
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchScope {
    Project,
    Equipment,
    Notification,
    ComplianceItem,
}

impl fmt::Display for FetchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchScope::Project => write!(f, "projects"),
            FetchScope::Equipment => write!(f, "equipment"),
            FetchScope::Notification => write!(f, "notifications"),
            FetchScope::ComplianceItem => write!(f, "compliance items"),
        }
    }
}

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 表单校验失败（一次性报告全部缺失字段）
    #[error("表单校验失败: {}", format_violations(.violations))]
    ValidationFailed { violations: Vec<FieldViolation> },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("权限不足: 需要 {permission}")]
    PermissionDenied { permission: Permission },

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("乐观锁冲突: {0}")]
    OptimisticLockFailure(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("Failed to fetch {scope}: {message}")]
    FetchFailed { scope: FetchScope, message: String },

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 列表/读取类请求失败
    pub fn fetch_failed(scope: FetchScope, err: impl fmt::Display) -> Self {
        ApiError::FetchFailed {
            scope,
            message: err.to_string(),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                project_id,
                expected,
                actual,
            } => ApiError::OptimisticLockFailure(format!(
                "项目{}已被其他会话修改（期望revision={}，实际revision={}）",
                project_id, expected, actual
            )),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => {
                ApiError::InternalError(format!("文档序列化失败: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            EngineError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 字段校验违规详情
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// 字段名
    pub field: String,
    /// 违规原因
    pub message: String,
}

impl FieldViolation {
    pub fn required(field: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("{} is required", field),
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimistic_lock_maps_with_detail() {
        let err: ApiError = RepositoryError::OptimisticLockFailure {
            project_id: "p1".to_string(),
            expected: 2,
            actual: 3,
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("p1"));
        assert!(msg.contains("期望revision=2"));
    }

    #[test]
    fn test_engine_errors_map_to_api() {
        let err: ApiError = EngineError::not_found("Task", "t1").into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = EngineError::InvalidStateTransition {
            from: "REMOVED".to_string(),
            to: "REMOVED".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_validation_failed_lists_every_field() {
        let err = ApiError::ValidationFailed {
            violations: vec![FieldViolation::required("name"), FieldViolation::required("city")],
        };
        let msg = err.to_string();
        assert!(msg.contains("name is required"));
        assert!(msg.contains("city is required"));
    }

    #[test]
    fn test_fetch_failed_message() {
        let err = ApiError::fetch_failed(FetchScope::Project, "disk I/O error");
        assert_eq!(err.to_string(), "Failed to fetch projects: disk I/O error");

        let err = ApiError::fetch_failed(FetchScope::ComplianceItem, "no such table");
        assert_eq!(err.to_string(), "Failed to fetch compliance items: no such table");
    }
}
