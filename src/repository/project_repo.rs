// ==========================================
// 灾后修复项目管理系统 - 项目聚合仓储
// ==========================================
// 存储: project 表（document 列为整个聚合的 JSON）
// 并发控制: revision 列乐观锁，UPDATE ... WHERE revision = ?
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::project::Project;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::ProjectStore;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ProjectRepository - 项目仓储
// ==========================================
/// 项目仓储
/// 职责: 管理 project 表的 CRUD 操作
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    /// 创建新的 ProjectRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从行数据还原聚合（revision 以列值为准）
    fn decode(document: &str, revision: i32) -> RepositoryResult<Project> {
        let mut project: Project = serde_json::from_str(document)?;
        project.revision = revision;
        Ok(project)
    }

    /// 新建项目
    pub fn create(&self, project: &Project) -> RepositoryResult<()> {
        let document = serde_json::to_string(project)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO project (
                project_id, org_id, name, status, revision, document, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                project.project_id,
                project.org_id,
                project.name,
                project.status.to_string(),
                project.revision,
                document,
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询（限定组织）
    ///
    /// # 返回
    /// - Ok(Some(Project)): 找到项目
    /// - Ok(None): 未找到或不属于该组织
    /// - Err: 数据库错误 / 文档损坏
    pub fn find_by_id(&self, org_id: &str, project_id: &str) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT document, revision FROM project WHERE project_id = ?1 AND org_id = ?2",
                params![project_id, org_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)?)),
            )
            .optional()?;

        row.map(|(document, revision)| Self::decode(&document, revision))
            .transpose()
    }

    /// 查询组织的全部项目（创建时间倒序）
    pub fn list_by_org(&self, org_id: &str) -> RepositoryResult<Vec<Project>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT document, revision
            FROM project
            WHERE org_id = ?1
            ORDER BY created_at DESC, project_id
            "#,
        )?;

        let rows = stmt.query_map(params![org_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)?))
        })?;

        let mut projects = Vec::new();
        for row in rows {
            let (document, revision) = row?;
            projects.push(Self::decode(&document, revision)?);
        }
        Ok(projects)
    }

    /// 更新项目 (带乐观锁检查)
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: revision不匹配 (其他会话已更新)
    /// - `RepositoryError::NotFound`: project_id不存在或不属于该组织
    pub fn update(&self, project: &Project) -> RepositoryResult<i32> {
        let new_revision = project.revision + 1;
        let mut stored = project.clone();
        stored.revision = new_revision;
        let document = serde_json::to_string(&stored)?;

        let conn = self.get_conn()?;
        let rows_affected = conn.execute(
            r#"UPDATE project
               SET name = ?1, status = ?2, document = ?3, updated_at = ?4,
                   revision = revision + 1
               WHERE project_id = ?5 AND org_id = ?6 AND revision = ?7"#,
            params![
                stored.name,
                stored.status.to_string(),
                document,
                stored.updated_at.to_rfc3339(),
                stored.project_id,
                stored.org_id,
                project.revision,
            ],
        )?;

        if rows_affected == 0 {
            // 判断是记录不存在还是revision冲突
            let actual: Option<i32> = conn
                .query_row(
                    "SELECT revision FROM project WHERE project_id = ?1 AND org_id = ?2",
                    params![project.project_id, project.org_id],
                    |row| row.get(0),
                )
                .optional()?;

            return match actual {
                Some(actual) => Err(RepositoryError::OptimisticLockFailure {
                    project_id: project.project_id.clone(),
                    expected: project.revision,
                    actual,
                }),
                None => Err(RepositoryError::not_found("Project", &project.project_id)),
            };
        }

        Ok(new_revision)
    }

    /// 删除项目
    pub fn delete(&self, org_id: &str, project_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows_affected = conn.execute(
            "DELETE FROM project WHERE project_id = ?1 AND org_id = ?2",
            params![project_id, org_id],
        )?;
        if rows_affected == 0 {
            return Err(RepositoryError::not_found("Project", project_id));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn list_projects(&self, org_id: &str) -> RepositoryResult<Vec<Project>> {
        self.list_by_org(org_id)
    }

    async fn get_project(&self, org_id: &str, project_id: &str) -> RepositoryResult<Option<Project>> {
        self.find_by_id(org_id, project_id)
    }

    async fn create_project(&self, project: &Project) -> RepositoryResult<()> {
        self.create(project)
    }

    async fn update_project(&self, project: &Project) -> RepositoryResult<i32> {
        self.update(project)
    }

    async fn delete_project(&self, org_id: &str, project_id: &str) -> RepositoryResult<()> {
        self.delete(org_id, project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::ProjectIntake;
    use chrono::Utc;

    fn repo() -> ProjectRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ProjectRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn project(org_id: &str, name: &str) -> Project {
        let intake = ProjectIntake {
            name: name.to_string(),
            ..Default::default()
        };
        Project::from_intake(org_id, intake, Utc::now())
    }

    #[test]
    fn test_create_and_find_scoped_by_org() {
        let repo = repo();
        let p = project("org-1", "Smith Residence");
        repo.create(&p).unwrap();

        let found = repo.find_by_id("org-1", &p.project_id).unwrap().unwrap();
        assert_eq!(found, p);
        assert!(repo.find_by_id("org-2", &p.project_id).unwrap().is_none());
        assert!(repo.list_by_org("org-2").unwrap().is_empty());
    }

    #[test]
    fn test_update_bumps_revision_and_rejects_stale() {
        let repo = repo();
        let mut p = project("org-1", "Smith Residence");
        repo.create(&p).unwrap();

        p.name = "Smith Residence - Basement".to_string();
        assert_eq!(repo.update(&p).unwrap(), 1);

        // p.revision 仍为 0 → 过期
        p.name = "stale".to_string();
        let err = repo.update(&p).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::OptimisticLockFailure { expected: 0, actual: 1, .. }
        ));

        let stored = repo.find_by_id("org-1", &p.project_id).unwrap().unwrap();
        assert_eq!(stored.name, "Smith Residence - Basement");
        assert_eq!(stored.revision, 1);
    }

    #[test]
    fn test_update_and_delete_missing() {
        let repo = repo();
        let p = project("org-1", "Ghost");
        assert!(matches!(repo.update(&p), Err(RepositoryError::NotFound { .. })));
        assert!(matches!(
            repo.delete("org-1", &p.project_id),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
