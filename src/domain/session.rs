// ==========================================
// 灾后修复项目管理系统 - 会话上下文
// ==========================================
// 当前用户 + 组织ID,显式传入每一次数据访问
// 权限判断为静态列表查找（不做鉴权）
// ==========================================

use crate::domain::types::Permission;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub org_id: String,
    pub role: String,
    pub permissions: Vec<Permission>,
}

impl Session {
    pub fn new(user_id: &str, org_id: &str, role: &str, permissions: Vec<Permission>) -> Self {
        Self {
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
            role: role.to_string(),
            permissions,
        }
    }

    /// 默认管理员角色的权限集
    ///
    /// 注意: 不含 update_compliance / view_compliance_details
    pub fn admin(user_id: &str, org_id: &str) -> Self {
        Self::new(
            user_id,
            org_id,
            "admin",
            vec![
                Permission::EditProject,
                Permission::ViewCompliance,
                Permission::ManageEquipment,
            ],
        )
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
