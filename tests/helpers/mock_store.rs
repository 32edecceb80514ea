// ==========================================
// Mock 项目存储 - 用于集成测试
// ==========================================
// 所有请求都失败,用于验证失败路径不改变本地状态
// ==========================================

use async_trait::async_trait;
use restoration_pm::domain::Project;
use restoration_pm::repository::{ProjectStore, RepositoryError, RepositoryResult};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    fn fail<T>(&self) -> RepositoryResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::DatabaseQueryError("network unreachable".to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectStore for FailingStore {
    async fn list_projects(&self, _org_id: &str) -> RepositoryResult<Vec<Project>> {
        self.fail()
    }

    async fn get_project(&self, _org_id: &str, _project_id: &str) -> RepositoryResult<Option<Project>> {
        self.fail()
    }

    async fn create_project(&self, _project: &Project) -> RepositoryResult<()> {
        self.fail()
    }

    async fn update_project(&self, _project: &Project) -> RepositoryResult<i32> {
        self.fail()
    }

    async fn delete_project(&self, _org_id: &str, _project_id: &str) -> RepositoryResult<()> {
        self.fail()
    }
}
