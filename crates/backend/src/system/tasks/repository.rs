use chrono::{DateTime, Utc};
use contracts::system::tasks::aggregate::{ScheduledTask, ScheduledTaskId};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::Set, QueryOrder};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sys_scheduled_tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub description: String,
    pub task_type: String,
    pub schedule_cron: Option<String>,
    pub config_json: String,
    pub is_enabled: bool,
    pub last_run_at: Option<DateTimeUtc>,
    pub next_run_at: Option<DateTimeUtc>,
    pub last_run_status: Option<String>,
    pub last_run_log_file: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ScheduledTask {
    fn from(m: Model) -> Self {
        ScheduledTask {
            id: ScheduledTaskId(m.id),
            code: m.code,
            description: m.description,
            task_type: m.task_type,
            schedule_cron: m.schedule_cron,
            config_json: m.config_json,
            is_enabled: m.is_enabled,
            last_run_at: m.last_run_at,
            next_run_at: m.next_run_at,
            last_run_status: m.last_run_status,
            last_run_log_file: m.last_run_log_file,
        }
    }
}

fn db() -> Result<&'static DatabaseConnection, DbErr> {
    get_connection().map_err(|e| DbErr::Custom(e.to_string()))
}

pub async fn list_all() -> Result<Vec<ScheduledTask>, DbErr> {
    let models = Entity::find().order_by_asc(Column::Code).all(db()?).await?;
    Ok(models.into_iter().map(ScheduledTask::from).collect())
}

pub async fn list_enabled() -> Result<Vec<ScheduledTask>, DbErr> {
    let models = Entity::find()
        .filter(Column::IsEnabled.eq(true))
        .order_by_asc(Column::Code)
        .all(db()?)
        .await?;
    Ok(models.into_iter().map(ScheduledTask::from).collect())
}

pub async fn get_by_id(id: Uuid) -> Result<Option<ScheduledTask>, DbErr> {
    let model = Entity::find_by_id(id).one(db()?).await?;
    Ok(model.map(ScheduledTask::from))
}

pub async fn get_by_code(code: &str) -> Result<Option<ScheduledTask>, DbErr> {
    let model = Entity::find()
        .filter(Column::Code.eq(code))
        .one(db()?)
        .await?;
    Ok(model.map(ScheduledTask::from))
}

pub async fn insert(task: &ScheduledTask) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(task.id.0),
        code: Set(task.code.clone()),
        description: Set(task.description.clone()),
        task_type: Set(task.task_type.clone()),
        schedule_cron: Set(task.schedule_cron.clone()),
        config_json: Set(task.config_json.clone()),
        is_enabled: Set(task.is_enabled),
        last_run_at: Set(task.last_run_at),
        next_run_at: Set(task.next_run_at),
        last_run_status: Set(task.last_run_status.clone()),
        last_run_log_file: Set(task.last_run_log_file.clone()),
    };
    active.insert(db()?).await?;
    Ok(())
}

pub async fn set_enabled(id: Uuid, is_enabled: bool) -> Result<(), DbErr> {
    Entity::update_many()
        .col_expr(Column::IsEnabled, Expr::value(is_enabled))
        .filter(Column::Id.eq(id))
        .exec(db()?)
        .await?;
    Ok(())
}

pub async fn set_next_run(id: Uuid, next_run_at: Option<DateTime<Utc>>) -> Result<(), DbErr> {
    Entity::update_many()
        .col_expr(Column::NextRunAt, Expr::value(next_run_at))
        .filter(Column::Id.eq(id))
        .exec(db()?)
        .await?;
    Ok(())
}

/// Run bookkeeping. `log_file: None` keeps the stored path.
pub async fn update_run_status(
    id: Uuid,
    last_run_at: DateTime<Utc>,
    status: &str,
    log_file: Option<String>,
) -> Result<(), DbErr> {
    let mut update = Entity::update_many()
        .col_expr(Column::LastRunAt, Expr::value(Some(last_run_at)))
        .col_expr(Column::LastRunStatus, Expr::value(Some(status.to_string())));
    if let Some(path) = log_file {
        update = update.col_expr(Column::LastRunLogFile, Expr::value(Some(path)));
    }
    update.filter(Column::Id.eq(id)).exec(db()?).await?;
    Ok(())
}
