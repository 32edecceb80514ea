// ==========================================
// 灾后修复项目管理系统 - 合规/任务状态跟踪
// ==========================================
// 规则:
// - 合规判定: 每个必需（required）合规项在项目上均为 true → Compliant, 否则 PartiallyCompliant
// - 非必需项只出现在明细中,不影响判定
// - 任务状态自由切换（Pending ↔ Completed）,无流程约束
// - 自动任务: 每次定时触发追加一条,不去重
// ==========================================

use crate::domain::project::Project;
use crate::domain::task::{ComplianceItem, Task};
use crate::domain::types::{ComplianceStatus, TaskKind, TaskStatus};
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 自动任务默认标题
pub const DEFAULT_AUTO_TASK_TITLE: &str = "Daily Dehumidifier Check";

/// 自动任务默认指派人
pub const AUTO_ASSIGNEE: &str = "auto-assigned";

// ==========================================
// ComplianceItemState - 单项合规状态（详情视图）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceItemState {
    pub key: String,
    pub description: String,
    pub required: bool,
    pub completed: bool,
}

// ==========================================
// ComplianceTracker
// ==========================================
pub struct ComplianceTracker;

impl ComplianceTracker {
    /// 判定项目合规状态
    pub fn evaluate(project: &Project, items: &[ComplianceItem]) -> ComplianceStatus {
        if items
            .iter()
            .filter(|item| item.required)
            .all(|item| project.compliance_flag(&item.key))
        {
            ComplianceStatus::Compliant
        } else {
            ComplianceStatus::PartiallyCompliant
        }
    }

    /// 逐项列出合规状态
    pub fn item_states(project: &Project, items: &[ComplianceItem]) -> Vec<ComplianceItemState> {
        items
            .iter()
            .map(|item| ComplianceItemState {
                key: item.key.clone(),
                description: item.description.clone(),
                required: item.required,
                completed: project.compliance_flag(&item.key),
            })
            .collect()
    }

    /// 设置合规项状态
    pub fn set_item(project: &mut Project, key: &str, completed: bool) {
        project.compliance.insert(key.to_string(), completed);
    }

    /// 任务视角的合规: 所有关联合规项的任务都已完成（无关联任务视为合规）
    pub fn task_compliance(tasks: &[Task]) -> ComplianceStatus {
        let all_done = tasks
            .iter()
            .filter(|t| t.compliance_key.is_some())
            .all(Task::is_completed);
        if all_done {
            ComplianceStatus::Compliant
        } else {
            ComplianceStatus::PartiallyCompliant
        }
    }

    // ===== 任务操作 =====

    /// 新增人工任务
    ///
    /// # 返回
    /// - Ok(task_id)
    /// - Err: 标题为空
    pub fn add_task(
        project: &mut Project,
        title: &str,
        description: &str,
        assigned_to: Option<&str>,
        compliance_key: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<String> {
        if title.trim().is_empty() {
            return Err(EngineError::InvalidInput("任务标题不能为空".to_string()));
        }
        let mut task = Task::new(title, description, TaskKind::Manual, now);
        task.assigned_to = assigned_to.map(str::to_string);
        task.compliance_key = compliance_key.map(str::to_string);
        let task_id = task.task_id.clone();
        project.tasks.push(task);
        Ok(task_id)
    }

    /// 设置任务状态（完成时记录完成时间,回退时清空）
    pub fn set_status(
        project: &mut Project,
        task_id: &str,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> EngineResult<TaskStatus> {
        let task = project
            .find_task_mut(task_id)
            .ok_or_else(|| EngineError::not_found("Task", task_id))?;
        task.status = status;
        task.completed_at = match status {
            TaskStatus::Completed => Some(now),
            TaskStatus::Pending => None,
        };
        Ok(status)
    }

    /// 切换任务状态
    pub fn toggle_status(
        project: &mut Project,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<TaskStatus> {
        let current = project
            .tasks
            .iter()
            .find(|t| t.task_id == task_id)
            .map(|t| t.status)
            .ok_or_else(|| EngineError::not_found("Task", task_id))?;
        Self::set_status(project, task_id, current.toggled(), now)
    }

    /// 指派任务
    pub fn assign(project: &mut Project, task_id: &str, assignee: Option<&str>) -> EngineResult<()> {
        let task = project
            .find_task_mut(task_id)
            .ok_or_else(|| EngineError::not_found("Task", task_id))?;
        task.assigned_to = assignee.map(str::to_string);
        Ok(())
    }

    /// 修改任务标题/描述
    pub fn update_text(
        project: &mut Project,
        task_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> EngineResult<()> {
        let task = project
            .find_task_mut(task_id)
            .ok_or_else(|| EngineError::not_found("Task", task_id))?;
        if let Some(title) = title {
            if title.trim().is_empty() {
                return Err(EngineError::InvalidInput("任务标题不能为空".to_string()));
            }
            task.title = title.to_string();
        }
        if let Some(description) = description {
            task.description = description.to_string();
        }
        Ok(())
    }

    /// 删除任务
    pub fn delete_task(project: &mut Project, task_id: &str) -> EngineResult<Task> {
        let idx = project
            .tasks
            .iter()
            .position(|t| t.task_id == task_id)
            .ok_or_else(|| EngineError::not_found("Task", task_id))?;
        Ok(project.tasks.remove(idx))
    }

    /// 追加一条自动生成的待办任务
    pub fn generate_automatic_task(project: &mut Project, title: &str, now: DateTime<Utc>) -> String {
        let mut task = Task::new(title, "", TaskKind::Automatic, now);
        task.assigned_to = Some(AUTO_ASSIGNEE.to_string());
        let task_id = task.task_id.clone();
        project.tasks.push(task);
        tracing::debug!(project_id = %project.project_id, title, "自动任务已生成");
        task_id
    }
}
