// ==========================================
// 灾后修复项目管理系统 - 看板 API
// ==========================================
// 职责: 只读聚合查询
// - 干燥进度、环境趋势曲线
// - 合规概览（状态 + 逐项明细）
// - 统计分析、组织通知
// - 项目时间线
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult, FetchScope};
use crate::api::validator::require_permission;
use crate::config::ConfigManager;
use crate::domain::notification::Notification;
use crate::domain::project::Project;
use crate::domain::session::Session;
use crate::domain::types::{ComplianceStatus, Permission};
use crate::engine::analytics::{Analytics, AnalyticsReport};
use crate::engine::compliance::{ComplianceItemState, ComplianceTracker};
use crate::engine::drying_progress::{DryingProgress, DryingProgressEstimator, SelectionMode};
use crate::engine::moisture_log::{MoistureLog, TrendSeries};
use crate::engine::runtime::EquipmentRuntimeTracker;
use crate::engine::timeline::{ProjectTimeline, TimelineEvent};
use crate::repository::compliance_item_repo::ComplianceItemRepository;
use crate::repository::equipment_repo::EquipmentInventoryRepository;
use crate::repository::notification_repo::NotificationRepository;
use crate::repository::store::ProjectStore;

/// 通知列表默认条数
pub const DEFAULT_NOTIFICATION_LIMIT: usize = 50;

// ==========================================
// ComplianceOverview - 合规概览
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceOverview {
    pub project_id: String,
    pub status: ComplianceStatus,
    /// 逐项明细（需要 view_compliance_details）
    pub items: Option<Vec<ComplianceItemState>>,
    /// 关联合规项任务的完成情况
    pub task_status: ComplianceStatus,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    store: Arc<dyn ProjectStore>,
    equipment_repo: Arc<EquipmentInventoryRepository>,
    compliance_item_repo: Arc<ComplianceItemRepository>,
    notification_repo: Arc<NotificationRepository>,
    config: Arc<ConfigManager>,
}

impl DashboardApi {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        equipment_repo: Arc<EquipmentInventoryRepository>,
        compliance_item_repo: Arc<ComplianceItemRepository>,
        notification_repo: Arc<NotificationRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            store,
            equipment_repo,
            compliance_item_repo,
            notification_repo,
            config,
        }
    }

    /// 材料干燥进度
    ///
    /// # 参数
    /// - goal: 目标含水率（None → Unavailable）
    pub fn drying_progress(
        &self,
        project: &Project,
        chamber_id: &str,
        material_id: &str,
        goal: Option<f64>,
        mode: SelectionMode,
    ) -> DryingProgress {
        DryingProgressEstimator::estimate(project, chamber_id, material_id, goal, mode)
    }

    /// 干燥区环境趋势曲线
    pub fn trend_series(
        &self,
        project: &Project,
        chamber_id: &str,
        material_id: Option<&str>,
    ) -> ApiResult<TrendSeries> {
        MoistureLog::trend_series(project, chamber_id, material_id)
            .ok_or_else(|| ApiError::NotFound(format!("DryingChamber(id={})不存在", chamber_id)))
    }

    /// 合规概览
    ///
    /// # 门禁
    /// - view_compliance: 查看状态
    /// - view_compliance_details: 额外返回逐项明细
    pub fn compliance_overview(&self, session: &Session, project: &Project) -> ApiResult<ComplianceOverview> {
        require_permission(session, Permission::ViewCompliance)?;

        let items = self
            .compliance_item_repo
            .list()
            .map_err(|e| ApiError::fetch_failed(FetchScope::ComplianceItem, e))?;
        let item_status = ComplianceTracker::evaluate(project, &items);
        let task_status = ComplianceTracker::task_compliance(&project.tasks);

        let requires_tasks = self
            .config
            .get_compliance_requires_all_tasks()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let status = if requires_tasks && task_status != ComplianceStatus::Compliant {
            ComplianceStatus::PartiallyCompliant
        } else {
            item_status
        };

        let items = session
            .has_permission(Permission::ViewComplianceDetails)
            .then(|| ComplianceTracker::item_states(project, &items));

        Ok(ComplianceOverview {
            project_id: project.project_id.clone(),
            status,
            items,
            task_status,
        })
    }

    /// 组织统计报表
    pub async fn analytics(&self, session: &Session) -> ApiResult<AnalyticsReport> {
        let mut projects = self
            .store
            .list_projects(&session.org_id)
            .await
            .map_err(|e| ApiError::fetch_failed(FetchScope::Project, e))?;
        let now = Utc::now();
        for project in projects.iter_mut() {
            EquipmentRuntimeTracker::refresh_project(project, now);
        }
        let inventory = self
            .equipment_repo
            .list_by_org(&session.org_id, None)
            .map_err(|e| ApiError::fetch_failed(FetchScope::Equipment, e))?;

        Ok(Analytics::report(&projects, &inventory))
    }

    /// 项目时间线（按日期排序）
    pub fn timeline(&self, project: &Project) -> Vec<TimelineEvent> {
        ProjectTimeline::build(project)
    }

    /// 组织通知（新的在前）
    pub fn notifications(&self, session: &Session, limit: Option<usize>) -> ApiResult<Vec<Notification>> {
        self.notification_repo
            .list_by_org(&session.org_id, limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT))
            .map_err(|e| ApiError::fetch_failed(FetchScope::Notification, e))
    }
}
