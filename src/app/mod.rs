// ==========================================
// 灾后修复项目管理系统 - 应用层
// ==========================================
// 职责: 组装仓储与 API,管理项目视图生命周期
// ==========================================

pub mod project_view;
pub mod state;

// 重导出
pub use project_view::ProjectView;
pub use state::{get_default_db_path, AppState};
