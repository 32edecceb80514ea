// ==========================================
// DashboardApi 集成测试
// ==========================================
// 测试范围:
// 1. 合规概览: 状态翻转、明细门禁、任务联动配置
// 2. 统计报表
// 3. 组织通知
// 4. 趋势曲线: 未知干燥区
// 5. 项目时间线与完成时间
// ==========================================

mod helpers;

use chrono::{Duration, Utc};
use helpers::api_test_helper::*;
use helpers::test_data_builder::{IntakeBuilder, ReadingBuilder};
use restoration_pm::api::ApiError;
use restoration_pm::config::config_keys;
use restoration_pm::domain::types::{ComplianceStatus, Permission, ProjectStatus};
use restoration_pm::engine::TimelineEventKind;
use restoration_pm::domain::{Notification, Session};
use restoration_pm::repository::compliance_item_repo::DEFAULT_COMPLIANCE_ITEMS;

// ==========================================
// 合规概览
// ==========================================

#[tokio::test]
async fn test_compliance_flips_when_all_items_completed() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let supervisor = env.supervisor();
    let mut project = env.create_project("Smith Residence").await;

    let overview = env.dashboard_api.compliance_overview(&supervisor, &project).unwrap();
    assert_eq!(overview.status, ComplianceStatus::PartiallyCompliant);

    for (key, _) in DEFAULT_COMPLIANCE_ITEMS {
        project = env
            .project_api
            .set_compliance_item(&supervisor, &project, key, true)
            .await
            .unwrap();
    }

    let overview = env.dashboard_api.compliance_overview(&supervisor, &project).unwrap();
    assert_eq!(overview.status, ComplianceStatus::Compliant);
    let items = overview.items.expect("supervisor 应看到明细");
    assert_eq!(items.len(), DEFAULT_COMPLIANCE_ITEMS.len());
    assert!(items.iter().all(|i| i.completed));

    // 任一项取消即回到部分合规
    let project = env
        .project_api
        .set_compliance_item(&supervisor, &project, "moisture_map", false)
        .await
        .unwrap();
    let overview = env.dashboard_api.compliance_overview(&supervisor, &project).unwrap();
    assert_eq!(overview.status, ComplianceStatus::PartiallyCompliant);
}

#[tokio::test]
async fn test_compliance_details_hidden_without_permission() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let project = env.create_project("Smith Residence").await;

    let overview = env.dashboard_api.compliance_overview(&env.admin(), &project).unwrap();
    assert!(overview.items.is_none());

    let no_view = Session::new("guest", TEST_ORG, "guest", vec![Permission::EditProject]);
    let err = env.dashboard_api.compliance_overview(&no_view, &project).unwrap_err();
    assert!(matches!(
        err,
        ApiError::PermissionDenied { permission: Permission::ViewCompliance }
    ));
}

#[tokio::test]
async fn test_compliance_requires_all_tasks_config() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let supervisor = env.supervisor();
    let mut project = env.create_project("Smith Residence").await;
    for (key, _) in DEFAULT_COMPLIANCE_ITEMS {
        project = env
            .project_api
            .set_compliance_item(&supervisor, &project, key, true)
            .await
            .unwrap();
    }
    let (project, task_id) = env
        .project_api
        .add_task(&supervisor, &project, "Customer signoff", "", None, Some("customer_signoff"))
        .await
        .unwrap();

    // 默认不考虑任务
    let overview = env.dashboard_api.compliance_overview(&supervisor, &project).unwrap();
    assert_eq!(overview.status, ComplianceStatus::Compliant);
    assert_eq!(overview.task_status, ComplianceStatus::PartiallyCompliant);

    env.config_manager
        .set_config_value(config_keys::COMPLIANCE_REQUIRES_ALL_TASKS, "true")
        .unwrap();
    let overview = env.dashboard_api.compliance_overview(&supervisor, &project).unwrap();
    assert_eq!(overview.status, ComplianceStatus::PartiallyCompliant);

    let (project, _) = env
        .project_api
        .toggle_task(&supervisor, &project, &task_id)
        .await
        .unwrap();
    let overview = env.dashboard_api.compliance_overview(&supervisor, &project).unwrap();
    assert_eq!(overview.status, ComplianceStatus::Compliant);
}

// ==========================================
// 统计报表
// ==========================================

#[tokio::test]
async fn test_analytics_report() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let session = env.admin();

    let project = env.create_project("Smith Residence").await;
    env.create_project("Jones Basement").await;
    let (project, chamber_id) = env
        .project_api
        .add_chamber(&session, &project, "Main", vec![])
        .await
        .unwrap();
    let dehu = env.create_equipment("Dehumidifier", "DH-1");
    env.create_equipment("Air Mover", "AM-1");
    env.project_api
        .assign_equipment(&session, &project, &chamber_id, &dehu.equipment_id, None)
        .await
        .unwrap();

    let report = env.dashboard_api.analytics(&session).await.unwrap();
    assert_eq!(report.project_stats.total, 2);
    assert_eq!(report.project_stats.in_progress, 2);
    assert_eq!(report.project_stats.completed, 0);
    assert_eq!(report.equipment_usage.len(), 1);
    assert_eq!(report.equipment_usage[0].equipment_type, "Dehumidifier");
    assert_eq!(report.equipment_usage[0].count, 1);
    assert_eq!(report.counts.active_projects, 2);
    assert_eq!(report.counts.equipment_in_use, 1);
    assert_eq!(report.counts.equipment_available, 1);

    // 其他组织看不到
    let other = env.dashboard_api.analytics(&env.other_org_admin()).await.unwrap();
    assert_eq!(other.project_stats.total, 0);
}

// ==========================================
// 通知
// ==========================================

#[tokio::test]
async fn test_notifications_newest_first_and_scoped() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let now = Utc::now();
    env.notification_repo
        .insert(&Notification::new(TEST_ORG, "older", now - Duration::hours(2)))
        .unwrap();
    env.notification_repo
        .insert(&Notification::new(TEST_ORG, "newer", now))
        .unwrap();
    env.notification_repo
        .insert(&Notification::new(OTHER_ORG, "foreign", now))
        .unwrap();

    let list = env.dashboard_api.notifications(&env.admin(), None).unwrap();
    let messages: Vec<&str> = list.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["newer", "older"]);

    let limited = env.dashboard_api.notifications(&env.admin(), Some(1)).unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].message, "newer");
}

// ==========================================
// 趋势曲线
// ==========================================

#[tokio::test]
async fn test_trend_series_unknown_chamber() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let project = env.create_project("Smith Residence").await;
    let err = env
        .dashboard_api
        .trend_series(&project, "missing-chamber", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 项目时间线
// ==========================================

#[tokio::test]
async fn test_timeline_tracks_readings_and_completion() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let session = env.admin();
    let project = env.create_project("Smith Residence").await;

    // 无干燥区时读数只需日期与室外条件
    let project = env
        .project_api
        .append_reading(&session, &project, ReadingBuilder::new("2099-01-03").build())
        .await
        .unwrap();
    let project = env
        .project_api
        .append_reading(&session, &project, ReadingBuilder::new("2099-01-02").build())
        .await
        .unwrap();

    let kinds: Vec<TimelineEventKind> = env.dashboard_api.timeline(&project).iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TimelineEventKind::ProjectCreated,
            TimelineEventKind::MoistureReading,
            TimelineEventKind::MoistureReading,
        ]
    );
    let events = env.dashboard_api.timeline(&project);
    assert_eq!(events[1].reference_id.as_deref(), Some(project.moisture_readings[1].reading_id.as_str()));
    assert_eq!(events[1].title, "Moisture Reading");

    let mut intake = IntakeBuilder::new("Smith Residence").build();
    intake.status = ProjectStatus::Completed;
    let project = env.project_api.update_project(&session, &project, intake).await.unwrap();
    let completed_at = project.completed_at.expect("完成时应记录完成时间");

    let events = env.dashboard_api.timeline(&project);
    let completed = events
        .iter()
        .find(|e| e.kind == TimelineEventKind::ProjectCompleted)
        .unwrap();
    assert_eq!(completed.date, Some(completed_at.date_naive()));

    // 再次保存不改变完成时间
    let stored = env.project_api.get_project(&session, &project.project_id).await.unwrap();
    assert_eq!(stored.completed_at, Some(completed_at));
    let mut intake = IntakeBuilder::new("Smith Residence").claim_number("CLM-7").build();
    intake.status = ProjectStatus::Completed;
    let project = env.project_api.update_project(&session, &stored, intake).await.unwrap();
    assert_eq!(project.completed_at, Some(completed_at));
}
