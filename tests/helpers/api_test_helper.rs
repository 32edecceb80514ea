// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;
use tempfile::NamedTempFile;

use restoration_pm::api::{DashboardApi, EquipmentApi, ProjectApi};
use restoration_pm::app::AppState;
use restoration_pm::config::ConfigManager;
use restoration_pm::domain::{EquipmentUnit, Project, Session};
use restoration_pm::domain::types::Permission;
use restoration_pm::repository::NotificationRepository;

use super::test_data_builder::IntakeBuilder;

pub const TEST_ORG: &str = "org-test";
pub const OTHER_ORG: &str = "org-other";

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,
    pub project_api: Arc<ProjectApi>,
    pub equipment_api: Arc<EquipmentApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub config_manager: Arc<ConfigManager>,
    pub notification_repo: Arc<NotificationRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    ///
    /// # 说明
    /// - 使用临时数据库文件
    /// - 通过 AppState 组装全部 Repository 和 API
    pub fn new() -> Result<Self, String> {
        restoration_pm::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let state = AppState::new(db_path.clone())?;

        Ok(Self {
            db_path,
            project_api: state.project_api.clone(),
            equipment_api: state.equipment_api.clone(),
            dashboard_api: state.dashboard_api.clone(),
            config_manager: state.config_manager.clone(),
            notification_repo: state.notification_repo.clone(),
            state,
            _temp_file: temp_file,
        })
    }

    /// 默认管理员会话（无 update_compliance / view_compliance_details）
    pub fn admin(&self) -> Session {
        Session::admin("admin-user", TEST_ORG)
    }

    /// 拥有全部权限的会话
    pub fn supervisor(&self) -> Session {
        Session::new(
            "supervisor-user",
            TEST_ORG,
            "supervisor",
            vec![
                Permission::EditProject,
                Permission::ManageEquipment,
                Permission::UpdateCompliance,
                Permission::ViewCompliance,
                Permission::ViewComplianceDetails,
            ],
        )
    }

    /// 只读会话
    pub fn viewer(&self) -> Session {
        Session::new("viewer-user", TEST_ORG, "viewer", vec![Permission::ViewCompliance])
    }

    pub fn other_org_admin(&self) -> Session {
        Session::admin("other-admin", OTHER_ORG)
    }

    /// 创建一个表单完整的项目
    pub async fn create_project(&self, name: &str) -> Project {
        self.project_api
            .create_project(&self.admin(), IntakeBuilder::new(name).build())
            .await
            .expect("创建项目失败")
    }

    /// 入库一台设备
    pub fn create_equipment(&self, equipment_type: &str, serial: &str) -> EquipmentUnit {
        self.equipment_api
            .create_equipment(&self.admin(), equipment_type, "MODEL-1", serial, None)
            .expect("设备入库失败")
    }
}
