// ==========================================
// 灾后修复项目管理系统 - 项目存储接口 Trait
// ==========================================
// 职责: 定义项目聚合的 CRUD 协作接口（按组织隔离）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::project::Project;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ProjectStore Trait
// ==========================================
// 用途: 项目聚合的持久化协作者
// 实现者: ProjectRepository（使用 rusqlite）
// 约定: 调用方必须 await 每次请求完成后再更新本地状态
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// 列出组织下的全部项目（按创建时间倒序）
    async fn list_projects(&self, org_id: &str) -> RepositoryResult<Vec<Project>>;

    /// 按ID读取项目（其他组织的项目视为不存在）
    async fn get_project(&self, org_id: &str, project_id: &str) -> RepositoryResult<Option<Project>>;

    /// 新建项目
    async fn create_project(&self, project: &Project) -> RepositoryResult<()>;

    /// 整体替换项目聚合（带乐观锁检查）
    ///
    /// # 参数
    /// - project: 新的聚合（project.revision 为调用方读到的版本号）
    ///
    /// # 返回
    /// - Ok(i32): 更新后的 revision
    /// - Err(OptimisticLockFailure): revision 不匹配，库中数据保持不变
    /// - Err(NotFound): 项目不存在或不属于该组织
    async fn update_project(&self, project: &Project) -> RepositoryResult<i32>;

    /// 删除项目
    async fn delete_project(&self, org_id: &str, project_id: &str) -> RepositoryResult<()>;
}
