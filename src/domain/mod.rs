// ==========================================
// 灾后修复项目管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod chamber;
pub mod notification;
pub mod project;
pub mod reading;
pub mod room;
pub mod session;
pub mod task;
pub mod types;

// 重导出核心类型
pub use chamber::{DryingChamber, EquipmentAssignment, EquipmentUnit, SpecificationKey};
pub use notification::Notification;
pub use project::{Project, ProjectIntake};
pub use reading::{AmbientConditions, ChamberReading, MaterialReading, MoistureReading};
pub use room::{AffectedAreas, AffectedRoom, Material, RoomDimensions};
pub use session::Session;
pub use task::{ComplianceItem, Note, Task};
pub use types::{
    AssignmentState, ComplianceStatus, EquipmentStatus, Permission, ProjectStatus, TaskKind,
    TaskStatus,
};
