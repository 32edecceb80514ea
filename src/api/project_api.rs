// ==========================================
// 灾后修复项目管理系统 - 项目 API
// ==========================================
// 职责: 项目 CRUD、子实体编辑（房间/材料/干燥区/设备/读数/任务/合规/备注）
// 修改方式: copy-on-write
//   读取调用方持有的聚合 → clone → 修改 → 按 revision 保存
//   保存成功才返回新聚合;失败时调用方的聚合保持不变
// 门禁: edit_project / manage_equipment / update_compliance
// ==========================================

use std::sync::Arc;

use chrono::Utc;

use crate::api::error::{ApiError, ApiResult, FetchScope};
use crate::api::validator::{require_permission, IntakeValidator};
use crate::domain::chamber::{DryingChamber, EquipmentUnit};
use crate::domain::project::{Project, ProjectIntake};
use crate::domain::reading::MoistureReading;
use crate::domain::room::{AffectedRoom, Material, RoomDimensions};
use crate::domain::session::Session;
use crate::domain::task::Note;
use crate::domain::types::{EquipmentStatus, Permission, TaskStatus};
use crate::engine::compliance::ComplianceTracker;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::moisture_log::MoistureLog;
use crate::engine::runtime::EquipmentRuntimeTracker;
use crate::repository::equipment_repo::EquipmentInventoryRepository;
use crate::repository::error::RepositoryError;
use crate::repository::store::ProjectStore;

// ==========================================
// ProjectApi - 项目 API
// ==========================================
pub struct ProjectApi {
    store: Arc<dyn ProjectStore>,
    equipment_repo: Arc<EquipmentInventoryRepository>,
}

impl ProjectApi {
    pub fn new(store: Arc<dyn ProjectStore>, equipment_repo: Arc<EquipmentInventoryRepository>) -> Self {
        Self {
            store,
            equipment_repo,
        }
    }

    // ==========================================
    // 项目 CRUD
    // ==========================================

    /// 查询当前组织的全部项目
    pub async fn list_projects(&self, session: &Session) -> ApiResult<Vec<Project>> {
        let mut projects = self
            .store
            .list_projects(&session.org_id)
            .await
            .map_err(|e| {
                tracing::error!(org_id = %session.org_id, error = %e, "项目列表拉取失败");
                ApiError::fetch_failed(FetchScope::Project, e)
            })?;
        let now = Utc::now();
        for project in projects.iter_mut() {
            EquipmentRuntimeTracker::refresh_project(project, now);
        }
        Ok(projects)
    }

    /// 查询单个项目
    ///
    /// 在用设备的运行时长按当前时间重算（不保存）
    pub async fn get_project(&self, session: &Session, project_id: &str) -> ApiResult<Project> {
        if project_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目ID不能为空".to_string()));
        }
        let mut project = self
            .store
            .get_project(&session.org_id, project_id)
            .await
            .map_err(|e| ApiError::fetch_failed(FetchScope::Project, e))?
            .ok_or_else(|| ApiError::NotFound(format!("Project(id={})不存在", project_id)))?;
        EquipmentRuntimeTracker::refresh_project(&mut project, Utc::now());
        Ok(project)
    }

    /// 立项
    pub async fn create_project(&self, session: &Session, intake: ProjectIntake) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        IntakeValidator::validate(&intake)?;

        let project = Project::from_intake(&session.org_id, intake, Utc::now());
        self.store.create_project(&project).await?;

        tracing::info!(
            project_id = %project.project_id,
            org_id = %project.org_id,
            name = %project.name,
            "项目已创建"
        );
        Ok(project)
    }

    /// 更新描述字段
    pub async fn update_project(
        &self,
        session: &Session,
        current: &Project,
        intake: ProjectIntake,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        IntakeValidator::validate(&intake)?;
        let now = Utc::now();
        let (project, ()) = self
            .commit(session, current, "update_project", |p| {
                p.apply_intake(intake);
                p.sync_completion(now);
                Ok(())
            })
            .await?;
        Ok(project)
    }

    pub async fn delete_project(&self, session: &Session, project_id: &str) -> ApiResult<()> {
        require_permission(session, Permission::EditProject)?;
        self.store.delete_project(&session.org_id, project_id).await?;
        tracing::info!(project_id, "项目已删除");
        Ok(())
    }

    // ==========================================
    // 房间与材料
    // ==========================================

    /// 新增受损房间（面积由尺寸派生）
    ///
    /// # 返回
    /// - (新聚合, room_id)
    pub async fn add_room(
        &self,
        session: &Session,
        current: &Project,
        name: &str,
        floor_level: &str,
        dimensions: RoomDimensions,
    ) -> ApiResult<(Project, String)> {
        require_permission(session, Permission::EditProject)?;
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("房间名称不能为空".to_string()));
        }
        self.commit(session, current, "add_room", |p| {
            let room = AffectedRoom::new(name, floor_level, dimensions);
            let room_id = room.room_id.clone();
            p.affected_rooms.push(room);
            Ok(room_id)
        })
        .await
    }

    /// 修改房间名称/楼层
    pub async fn update_room(
        &self,
        session: &Session,
        current: &Project,
        room_id: &str,
        name: &str,
        floor_level: &str,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("房间名称不能为空".to_string()));
        }
        let (project, ()) = self
            .commit(session, current, "update_room", |p| {
                let room = p
                    .find_room_mut(room_id)
                    .ok_or_else(|| EngineError::not_found("AffectedRoom", room_id))?;
                room.name = name.to_string();
                room.floor_level = floor_level.to_string();
                Ok(())
            })
            .await?;
        Ok(project)
    }

    /// 修改房间尺寸（面积随之重算）
    pub async fn update_room_dimensions(
        &self,
        session: &Session,
        current: &Project,
        room_id: &str,
        dimensions: RoomDimensions,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, ()) = self
            .commit(session, current, "update_room_dimensions", |p| {
                let room = p
                    .find_room_mut(room_id)
                    .ok_or_else(|| EngineError::not_found("AffectedRoom", room_id))?;
                room.set_dimensions(dimensions);
                Ok(())
            })
            .await?;
        Ok(project)
    }

    /// 删除房间（同时从干燥区成员中移除;历史读数保持不变）
    pub async fn delete_room(&self, session: &Session, current: &Project, room_id: &str) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, ()) = self
            .commit(session, current, "delete_room", |p| {
                let idx = p
                    .affected_rooms
                    .iter()
                    .position(|r| r.room_id == room_id)
                    .ok_or_else(|| EngineError::not_found("AffectedRoom", room_id))?;
                p.affected_rooms.remove(idx);
                for chamber in p.drying_chambers.iter_mut() {
                    chamber.room_ids.retain(|r| r != room_id);
                }
                Ok(())
            })
            .await?;
        Ok(project)
    }

    /// 新增材料
    pub async fn add_material(
        &self,
        session: &Session,
        current: &Project,
        room_id: &str,
        material: Material,
    ) -> ApiResult<(Project, String)> {
        require_permission(session, Permission::EditProject)?;
        if material.material_type.trim().is_empty() {
            return Err(ApiError::InvalidInput("材料类型不能为空".to_string()));
        }
        self.commit(session, current, "add_material", |p| {
            let room = p
                .find_room_mut(room_id)
                .ok_or_else(|| EngineError::not_found("AffectedRoom", room_id))?;
            let material_id = material.material_id.clone();
            room.materials.push(material);
            Ok(material_id)
        })
        .await
    }

    /// 整体替换材料（按 material_id 定位）
    pub async fn update_material(
        &self,
        session: &Session,
        current: &Project,
        room_id: &str,
        material: Material,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        if material.material_type.trim().is_empty() {
            return Err(ApiError::InvalidInput("材料类型不能为空".to_string()));
        }
        let (project, ()) = self
            .commit(session, current, "update_material", |p| {
                let room = p
                    .find_room_mut(room_id)
                    .ok_or_else(|| EngineError::not_found("AffectedRoom", room_id))?;
                let slot = room
                    .materials
                    .iter_mut()
                    .find(|m| m.material_id == material.material_id)
                    .ok_or_else(|| EngineError::not_found("Material", &material.material_id))?;
                *slot = material;
                Ok(())
            })
            .await?;
        Ok(project)
    }

    /// 删除材料（历史读数保持不变）
    pub async fn delete_material(
        &self,
        session: &Session,
        current: &Project,
        room_id: &str,
        material_id: &str,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, ()) = self
            .commit(session, current, "delete_material", |p| {
                let room = p
                    .find_room_mut(room_id)
                    .ok_or_else(|| EngineError::not_found("AffectedRoom", room_id))?;
                let before = room.materials.len();
                room.materials.retain(|m| m.material_id != material_id);
                if room.materials.len() == before {
                    return Err(EngineError::not_found("Material", material_id));
                }
                Ok(())
            })
            .await?;
        Ok(project)
    }

    // ==========================================
    // 干燥区与设备
    // ==========================================

    /// 新增干燥区（房间必须属于本项目）
    pub async fn add_chamber(
        &self,
        session: &Session,
        current: &Project,
        name: &str,
        room_ids: Vec<String>,
    ) -> ApiResult<(Project, String)> {
        require_permission(session, Permission::EditProject)?;
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("干燥区名称不能为空".to_string()));
        }
        self.commit(session, current, "add_chamber", |p| {
            if let Some(missing) = room_ids.iter().find(|id| p.find_room(id).is_none()) {
                return Err(EngineError::not_found("AffectedRoom", missing));
            }
            let chamber = DryingChamber::new(name, room_ids);
            let chamber_id = chamber.chamber_id.clone();
            p.drying_chambers.push(chamber);
            Ok(chamber_id)
        })
        .await
    }

    /// 修改干燥区名称与房间成员（设备部署保持不变）
    pub async fn update_chamber(
        &self,
        session: &Session,
        current: &Project,
        chamber_id: &str,
        name: &str,
        room_ids: Vec<String>,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("干燥区名称不能为空".to_string()));
        }
        let (project, ()) = self
            .commit(session, current, "update_chamber", |p| {
                if let Some(missing) = room_ids.iter().find(|id| p.find_room(id).is_none()) {
                    return Err(EngineError::not_found("AffectedRoom", missing));
                }
                let chamber = p
                    .find_chamber_mut(chamber_id)
                    .ok_or_else(|| EngineError::not_found("DryingChamber", chamber_id))?;
                chamber.name = name.to_string();
                chamber.room_ids = room_ids;
                Ok(())
            })
            .await?;
        Ok(project)
    }

    /// 删除干燥区
    ///
    /// 仍有在用设备时拒绝,需先撤出设备
    pub async fn delete_chamber(&self, session: &Session, current: &Project, chamber_id: &str) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, ()) = self
            .commit(session, current, "delete_chamber", |p| {
                let idx = p
                    .drying_chambers
                    .iter()
                    .position(|c| c.chamber_id == chamber_id)
                    .ok_or_else(|| EngineError::not_found("DryingChamber", chamber_id))?;
                let active = p.drying_chambers[idx].active_equipment().count();
                if active > 0 {
                    return Err(EngineError::InvalidInput(format!(
                        "干燥区 {} 仍有 {} 台在用设备",
                        chamber_id, active
                    )));
                }
                p.drying_chambers.remove(idx);
                Ok(())
            })
            .await?;
        Ok(project)
    }

    /// 部署设备到干燥区
    ///
    /// 项目保存成功后,库存状态置为 IN_USE
    pub async fn assign_equipment(
        &self,
        session: &Session,
        current: &Project,
        chamber_id: &str,
        equipment_id: &str,
        room_id: Option<&str>,
    ) -> ApiResult<(Project, String)> {
        require_permission(session, Permission::ManageEquipment)?;

        let unit = self
            .equipment_repo
            .find_by_id(&session.org_id, equipment_id)
            .map_err(|e| ApiError::fetch_failed(FetchScope::Equipment, e))?
            .ok_or_else(|| ApiError::NotFound(format!("EquipmentUnit(id={})不存在", equipment_id)))?;
        if unit.status != EquipmentStatus::Available {
            return Err(ApiError::InvalidStateTransition {
                from: unit.status.to_string(),
                to: EquipmentStatus::InUse.to_string(),
            });
        }

        let now = Utc::now();
        let result = self
            .commit(session, current, "assign_equipment", |p| {
                EquipmentRuntimeTracker::assign(p, chamber_id, &unit, room_id, now)
            })
            .await?;

        // 项目已保存,库存同步失败不回滚,仅记录
        if let Err(e) = self
            .equipment_repo
            .update_status(&session.org_id, equipment_id, EquipmentStatus::InUse)
        {
            tracing::warn!(
                equipment_id,
                project_id = %result.0.project_id,
                error = %e,
                "库存状态同步失败"
            );
        }
        Ok(result)
    }

    /// 撤出设备（运行时长固定）,设备回到可用状态
    pub async fn remove_equipment(
        &self,
        session: &Session,
        current: &Project,
        chamber_id: &str,
        assignment_id: &str,
    ) -> ApiResult<(Project, EquipmentUnit)> {
        require_permission(session, Permission::ManageEquipment)?;

        let now = Utc::now();
        let (project, unit) = self
            .commit(session, current, "remove_equipment", |p| {
                EquipmentRuntimeTracker::remove(p, chamber_id, assignment_id, now)
            })
            .await?;

        match self
            .equipment_repo
            .update_status(&session.org_id, &unit.equipment_id, EquipmentStatus::Available)
        {
            Ok(()) => {}
            // 库存记录已被删除时仅记录
            Err(RepositoryError::NotFound { .. }) => {
                tracing::warn!(equipment_id = %unit.equipment_id, "撤出设备在库存中不存在");
            }
            Err(e) => return Err(e.into()),
        }
        Ok((project, unit))
    }

    /// 重算并保存全部设备运行时长
    pub async fn refresh_runtime(&self, session: &Session, current: &Project) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let now = Utc::now();
        let (project, _) = self
            .commit(session, current, "refresh_runtime", |p| {
                Ok(EquipmentRuntimeTracker::refresh_project(p, now))
            })
            .await?;
        Ok(project)
    }

    // ==========================================
    // 读数日志
    // ==========================================

    /// 按项目当前结构生成读数模板（不保存）
    pub fn seed_reading_template(&self, current: &Project, date: &str) -> MoistureReading {
        MoistureLog::seed_template(current, date)
    }

    /// 追加读数（历史记录不修改）
    ///
    /// 读数须与当前结构的模板一致且必填值齐全,否则 InvalidInput
    pub async fn append_reading(
        &self,
        session: &Session,
        current: &Project,
        reading: MoistureReading,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, _) = self
            .commit(session, current, "append_reading", |p| {
                MoistureLog::validate(p, &reading)?;
                Ok(MoistureLog::append(p, reading))
            })
            .await?;
        Ok(project)
    }

    // ==========================================
    // 任务
    // ==========================================

    pub async fn add_task(
        &self,
        session: &Session,
        current: &Project,
        title: &str,
        description: &str,
        assigned_to: Option<&str>,
        compliance_key: Option<&str>,
    ) -> ApiResult<(Project, String)> {
        require_permission(session, Permission::EditProject)?;
        let now = Utc::now();
        self.commit(session, current, "add_task", |p| {
            ComplianceTracker::add_task(p, title, description, assigned_to, compliance_key, now)
        })
        .await
    }

    /// 切换任务状态（Pending ↔ Completed）
    pub async fn toggle_task(
        &self,
        session: &Session,
        current: &Project,
        task_id: &str,
    ) -> ApiResult<(Project, TaskStatus)> {
        require_permission(session, Permission::EditProject)?;
        let now = Utc::now();
        self.commit(session, current, "toggle_task", |p| {
            ComplianceTracker::toggle_status(p, task_id, now)
        })
        .await
    }

    pub async fn set_task_status(
        &self,
        session: &Session,
        current: &Project,
        task_id: &str,
        status: TaskStatus,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let now = Utc::now();
        let (project, _) = self
            .commit(session, current, "set_task_status", |p| {
                ComplianceTracker::set_status(p, task_id, status, now)
            })
            .await?;
        Ok(project)
    }

    pub async fn assign_task(
        &self,
        session: &Session,
        current: &Project,
        task_id: &str,
        assignee: Option<&str>,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, ()) = self
            .commit(session, current, "assign_task", |p| {
                ComplianceTracker::assign(p, task_id, assignee)
            })
            .await?;
        Ok(project)
    }

    pub async fn update_task(
        &self,
        session: &Session,
        current: &Project,
        task_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, ()) = self
            .commit(session, current, "update_task", |p| {
                ComplianceTracker::update_text(p, task_id, title, description)
            })
            .await?;
        Ok(project)
    }

    pub async fn delete_task(&self, session: &Session, current: &Project, task_id: &str) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, _) = self
            .commit(session, current, "delete_task", |p| {
                ComplianceTracker::delete_task(p, task_id)
            })
            .await?;
        Ok(project)
    }

    /// 追加自动任务并保存
    pub async fn generate_automatic_task(
        &self,
        session: &Session,
        current: &Project,
        title: &str,
    ) -> ApiResult<(Project, String)> {
        let now = Utc::now();
        self.commit(session, current, "generate_automatic_task", |p| {
            Ok(ComplianceTracker::generate_automatic_task(p, title, now))
        })
        .await
    }

    // ==========================================
    // 合规与备注
    // ==========================================

    /// 设置合规项（需要 update_compliance 权限）
    pub async fn set_compliance_item(
        &self,
        session: &Session,
        current: &Project,
        key: &str,
        completed: bool,
    ) -> ApiResult<Project> {
        require_permission(session, Permission::UpdateCompliance)?;
        if key.trim().is_empty() {
            return Err(ApiError::InvalidInput("合规项键不能为空".to_string()));
        }
        let (project, ()) = self
            .commit(session, current, "set_compliance_item", |p| {
                ComplianceTracker::set_item(p, key, completed);
                Ok(())
            })
            .await?;
        Ok(project)
    }

    pub async fn add_note(&self, session: &Session, current: &Project, content: &str) -> ApiResult<(Project, String)> {
        require_permission(session, Permission::EditProject)?;
        if content.trim().is_empty() {
            return Err(ApiError::InvalidInput("备注内容不能为空".to_string()));
        }
        let now = Utc::now();
        self.commit(session, current, "add_note", |p| {
            let note = Note::new(content, now);
            let note_id = note.note_id.clone();
            p.notes.push(note);
            Ok(note_id)
        })
        .await
    }

    pub async fn delete_note(&self, session: &Session, current: &Project, note_id: &str) -> ApiResult<Project> {
        require_permission(session, Permission::EditProject)?;
        let (project, ()) = self
            .commit(session, current, "delete_note", |p| {
                let before = p.notes.len();
                p.notes.retain(|n| n.note_id != note_id);
                if p.notes.len() == before {
                    return Err(EngineError::not_found("Note", note_id));
                }
                Ok(())
            })
            .await?;
        Ok(project)
    }

    // ==========================================
    // copy-on-write 提交
    // ==========================================

    /// clone → 修改 → 按 revision 保存
    ///
    /// # 返回
    /// - Ok((新聚合, 修改结果)): 新聚合的 revision 已更新
    /// - Err: 修改失败或保存失败,current 不受影响
    async fn commit<T, F>(
        &self,
        session: &Session,
        current: &Project,
        operation: &str,
        mutate: F,
    ) -> ApiResult<(Project, T)>
    where
        F: FnOnce(&mut Project) -> EngineResult<T> + Send,
        T: Send,
    {
        // 跨组织的聚合视为不存在
        if current.org_id != session.org_id {
            return Err(ApiError::NotFound(format!("Project(id={})不存在", current.project_id)));
        }

        let mut next = current.clone();
        let value = mutate(&mut next)?;
        next.updated_at = Utc::now();

        match self.store.update_project(&next).await {
            Ok(revision) => {
                next.revision = revision;
                tracing::debug!(
                    project_id = %next.project_id,
                    operation,
                    revision,
                    "项目已保存"
                );
                Ok((next, value))
            }
            Err(e) => {
                tracing::warn!(
                    project_id = %current.project_id,
                    operation,
                    error = %e,
                    "项目保存失败,本地状态未变更"
                );
                Err(e.into())
            }
        }
    }
}
