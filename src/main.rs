// ==========================================
// 灾后修复项目管理系统 - 命令行入口
// ==========================================
// 初始化日志 → 打开数据库（建表幂等）→ 输出组织项目摘要
// 用法: restoration-pm [org_id]
// ==========================================

use anyhow::Context;
use restoration_pm::app::{get_default_db_path, AppState};
use restoration_pm::domain::Session;
use restoration_pm::engine::ComplianceTracker;
use restoration_pm::logging;

const DEFAULT_ORG_ID: &str = "org-1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("RESTORATION_PM_LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{}", restoration_pm::APP_NAME);
    tracing::info!("系统版本: {}", restoration_pm::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let org_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ORG_ID.to_string());
    let session = Session::admin("cli", &org_id);

    let projects = state.project_api.list_projects(&session).await?;
    let report = state.dashboard_api.analytics(&session).await?;

    println!("组织 {}: 共 {} 个项目", org_id, report.project_stats.total);
    println!(
        "  进行中 {} / 已完成 {}",
        report.project_stats.in_progress, report.project_stats.completed
    );
    println!(
        "  设备: 使用中 {} / 可用 {} / 维护 {}",
        report.counts.equipment_in_use,
        report.counts.equipment_available,
        report.counts.equipment_maintenance
    );

    for (project, runtime) in projects.iter().zip(report.runtime_by_project.iter()) {
        let pending = project.tasks.iter().filter(|t| !t.is_completed()).count();
        println!(
            "- {} [{}] 房间 {} / 干燥区 {} / 设备运行 {}h / 待办 {} / 任务合规: {}",
            project.name,
            project.status,
            project.affected_rooms.len(),
            project.drying_chambers.len(),
            runtime.runtime_hours,
            pending,
            ComplianceTracker::task_compliance(&project.tasks),
        );
    }

    for usage in &report.equipment_usage {
        println!("  {} × {}", usage.equipment_type, usage.count);
    }

    Ok(())
}
