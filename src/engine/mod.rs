// ==========================================
// 灾后修复项目管理系统 - 引擎层
// ==========================================
// 职责: 派生计算规则（面积、运行时长、干燥进度、合规）与周期任务
// 红线: Engine 不拼 SQL, 派生缺失返回 None 而不是错误
// ==========================================

pub mod analytics;
pub mod compliance;
pub mod dimension;
pub mod drying_progress;
pub mod error;
pub mod moisture_log;
pub mod runtime;
pub mod scheduler;
pub mod timeline;

// 重导出核心引擎
pub use analytics::{Analytics, AnalyticsReport, DashboardCounts, EquipmentUsage, ProjectStats};
pub use compliance::{ComplianceItemState, ComplianceTracker, DEFAULT_AUTO_TASK_TITLE};
pub use dimension::{parse_dimension, DimensionCalculator};
pub use drying_progress::{DryingProgress, DryingProgressEstimator, SelectionMode, UnavailableReason};
pub use error::{EngineError, EngineResult};
pub use moisture_log::{MoistureLog, TrendSeries};
pub use runtime::{AvailableEquipmentPool, EquipmentRuntimeTracker};
pub use scheduler::PeriodicJob;
pub use timeline::{ProjectTimeline, TimelineEvent, TimelineEventKind};
