// ==========================================
// 灾后修复项目管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 水损修复项目的聚合模型与派生计算
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 派生计算与周期任务
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与项目视图
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AssignmentState, ComplianceStatus, EquipmentStatus, Permission, ProjectStatus, TaskKind,
    TaskStatus,
};

// 领域实体
pub use domain::{
    AffectedRoom, DryingChamber, EquipmentAssignment, EquipmentUnit, MoistureReading, Project,
    ProjectIntake, Session, Task,
};

// 引擎
pub use engine::{
    Analytics, ComplianceTracker, DimensionCalculator, DryingProgressEstimator,
    EquipmentRuntimeTracker, MoistureLog, PeriodicJob,
};

// API
pub use api::{ApiError, ApiResult, DashboardApi, EquipmentApi, ProjectApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "灾后修复项目管理系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
