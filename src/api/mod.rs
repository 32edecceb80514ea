// ==========================================
// 灾后修复项目管理系统 - API 层
// ==========================================
// 职责: 提供按会话隔离的业务 API（CRUD、copy-on-write 编辑、权限门禁）
// ==========================================

pub mod dashboard_api;
pub mod equipment_api;
pub mod error;
pub mod project_api;
pub mod validator;

// 重导出核心类型
pub use dashboard_api::{ComplianceOverview, DashboardApi};
pub use equipment_api::EquipmentApi;
pub use error::{ApiError, ApiResult, FetchScope, FieldViolation};
pub use project_api::ProjectApi;
pub use validator::{require_permission, IntakeValidator};
