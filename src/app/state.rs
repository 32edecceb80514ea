// ==========================================
// 灾后修复项目管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{DashboardApi, EquipmentApi, ProjectApi};
use crate::app::project_view::ProjectView;
use crate::config::config_manager::ConfigManager;
use crate::domain::project::Project;
use crate::domain::session::Session;
use crate::repository::{
    ComplianceItemRepository, EquipmentInventoryRepository, NotificationRepository,
    ProjectRepository, ProjectStore,
};

/// 默认数据库文件名
const DB_FILE_NAME: &str = "restoration_pm.db";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 项目API
    pub project_api: Arc<ProjectApi>,

    /// 设备库存API
    pub equipment_api: Arc<EquipmentApi>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 通知仓储（用于写入通知）
    pub notification_repo: Arc<NotificationRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并建表（幂等）
    /// 2. 初始化所有Repository,写入默认合规项
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let project_store: Arc<dyn ProjectStore> =
            Arc::new(ProjectRepository::from_connection(conn.clone()));
        let equipment_repo = Arc::new(EquipmentInventoryRepository::from_connection(conn.clone()));
        let compliance_item_repo = Arc::new(ComplianceItemRepository::from_connection(conn.clone()));
        let notification_repo = Arc::new(NotificationRepository::from_connection(conn.clone()));

        let seeded = compliance_item_repo
            .seed_defaults()
            .map_err(|e| format!("写入默认合规项失败: {}", e))?;
        if seeded > 0 {
            tracing::info!(seeded, "已写入默认合规项");
        }

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let project_api = Arc::new(ProjectApi::new(project_store.clone(), equipment_repo.clone()));
        let equipment_api = Arc::new(EquipmentApi::new(equipment_repo.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(
            project_store,
            equipment_repo,
            compliance_item_repo,
            notification_repo.clone(),
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            project_api,
            equipment_api,
            dashboard_api,
            config_manager,
            notification_repo,
        })
    }

    /// 打开项目视图（周期任务参数取自配置）
    pub fn open_project_view(&self, session: Session, project: Project) -> Result<ProjectView, String> {
        let settings = self
            .config_manager
            .load_view_settings()
            .map_err(|e| format!("读取配置失败: {}", e))?;
        Ok(ProjectView::open(
            session,
            project,
            &settings,
            self.project_api.clone(),
            self.dashboard_api.clone(),
        ))
    }
}

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 RESTORATION_PM_DB
/// 2. 用户数据目录/restoration-pm/restoration_pm.db
/// 3. ./restoration_pm.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("RESTORATION_PM_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("restoration-pm");
        // 目录创建失败时回退到当前目录
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join(DB_FILE_NAME),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}
