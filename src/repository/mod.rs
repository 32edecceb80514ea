// ==========================================
// 灾后修复项目管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,查询一律按 org_id 隔离
// ==========================================

pub mod compliance_item_repo;
pub mod equipment_repo;
pub mod error;
pub mod notification_repo;
pub mod project_repo;
pub mod store;

// 重导出核心仓储
pub use compliance_item_repo::ComplianceItemRepository;
pub use equipment_repo::EquipmentInventoryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use notification_repo::NotificationRepository;
pub use project_repo::ProjectRepository;
pub use store::ProjectStore;
