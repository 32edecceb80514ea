// ==========================================
// 灾后修复项目管理系统 - 配置层
// ==========================================
// 职责: 系统配置管理（周期任务间隔、自动任务标题等）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, ViewSettings};
