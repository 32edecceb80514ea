// ==========================================
// 灾后修复项目管理系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 派生计算的缺失输入返回 None,不走错误;这里只描述修改操作的失败
// ==========================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("无效输入: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
