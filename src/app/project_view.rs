// ==========================================
// 灾后修复项目管理系统 - 项目视图生命周期
// ==========================================
// 项目视图打开期间持有三个周期任务:
// - 设备运行时长刷新（仅本地视图状态,不落库）
// - 自动任务生成（copy-on-write 保存,成功后替换本地聚合）
// - 组织通知拉取
// 视图关闭或 drop 时全部取消
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::api::dashboard_api::DashboardApi;
use crate::api::project_api::ProjectApi;
use crate::config::ViewSettings;
use crate::domain::notification::Notification;
use crate::domain::project::Project;
use crate::domain::session::Session;
use crate::engine::runtime::EquipmentRuntimeTracker;
use crate::engine::scheduler::PeriodicJob;

pub const RUNTIME_REFRESH_JOB: &str = "runtime_refresh";
pub const TASK_GENERATION_JOB: &str = "task_generation";
pub const NOTIFICATION_POLL_JOB: &str = "notification_poll";

// ==========================================
// ProjectView - 打开中的项目视图
// ==========================================
pub struct ProjectView {
    project: Arc<Mutex<Project>>,
    notifications: Arc<Mutex<Vec<Notification>>>,
    jobs: Vec<PeriodicJob>,
}

impl ProjectView {
    /// 打开项目视图并启动周期任务（需在 tokio 运行时内调用）
    ///
    /// 打开时先按当前时间重算一次运行时长
    pub fn open(
        session: Session,
        mut project: Project,
        settings: &ViewSettings,
        project_api: Arc<ProjectApi>,
        dashboard_api: Arc<DashboardApi>,
    ) -> Self {
        let active = EquipmentRuntimeTracker::refresh_project(&mut project, Utc::now());
        tracing::info!(project_id = %project.project_id, active, "项目视图已打开");

        let project = Arc::new(Mutex::new(project));
        let notifications = Arc::new(Mutex::new(Vec::new()));
        let session = Arc::new(session);

        // ===== 运行时长刷新 =====
        let runtime_job = {
            let project = project.clone();
            PeriodicJob::spawn(RUNTIME_REFRESH_JOB, settings.runtime_refresh_interval, move || {
                let project = project.clone();
                async move {
                    let mut guard = lock(&project);
                    let active = EquipmentRuntimeTracker::refresh_project(&mut guard, Utc::now());
                    tracing::trace!(active, "运行时长已刷新");
                }
            })
        };

        // ===== 自动任务生成 =====
        let task_job = {
            let project = project.clone();
            let session = session.clone();
            let title = settings.auto_task_title.clone();
            PeriodicJob::spawn(TASK_GENERATION_JOB, settings.task_generation_interval, move || {
                let project = project.clone();
                let session = session.clone();
                let project_api = project_api.clone();
                let title = title.clone();
                async move {
                    let snapshot = lock(&project).clone();
                    match project_api
                        .generate_automatic_task(&session, &snapshot, &title)
                        .await
                    {
                        Ok((saved, _task_id)) => {
                            let mut guard = lock(&project);
                            // 期间本地聚合已被替换时放弃本次结果
                            if guard.revision == snapshot.revision {
                                *guard = saved;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "自动任务生成失败,等待下个周期");
                        }
                    }
                }
            })
        };

        // ===== 通知拉取 =====
        let notification_job = {
            let notifications = notifications.clone();
            let session = session.clone();
            PeriodicJob::spawn(NOTIFICATION_POLL_JOB, settings.notification_poll_interval, move || {
                let notifications = notifications.clone();
                let session = session.clone();
                let dashboard_api = dashboard_api.clone();
                async move {
                    match dashboard_api.notifications(&session, None) {
                        Ok(list) => *lock(&notifications) = list,
                        Err(e) => tracing::warn!(error = %e, "通知拉取失败"),
                    }
                }
            })
        };

        Self {
            project,
            notifications,
            jobs: vec![runtime_job, task_job, notification_job],
        }
    }

    /// 当前本地聚合的副本
    pub fn snapshot(&self) -> Project {
        lock(&self.project).clone()
    }

    /// API 调用成功后替换本地聚合
    pub fn replace(&self, project: Project) {
        *lock(&self.project) = project;
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(PeriodicJob::name).collect()
    }

    /// 关闭视图并等待所有周期任务退出
    pub async fn close(mut self) {
        for job in self.jobs.drain(..) {
            job.shutdown().await;
        }
        tracing::info!("项目视图已关闭");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
