use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

/// Fixed primary key of the single status row
pub const STATUS_ROW_ID: &str = "rollover";

mod rollover_status {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "sys_rollover_status")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// "YYYY-MM" of the last month the counters were reset into
        pub last_reset_month: String,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub async fn get_last_reset_month<C: ConnectionTrait>(conn: &C) -> Result<Option<String>, DbErr> {
    let model = rollover_status::Entity::find_by_id(STATUS_ROW_ID.to_string())
        .one(conn)
        .await?;
    Ok(model.map(|m| m.last_reset_month))
}

/// Create the status row on the very first run.
///
/// Returns false when the row already exists, which means another instance
/// initialized concurrently; the existing value is left untouched.
pub async fn insert_status<C: ConnectionTrait>(conn: &C, month: &str) -> Result<bool, DbErr> {
    let active_model = rollover_status::ActiveModel {
        id: Set(STATUS_ROW_ID.to_string()),
        last_reset_month: Set(month.to_string()),
        updated_at: Set(Some(Utc::now())),
    };
    let result = rollover_status::Entity::insert(active_model)
        .on_conflict(
            OnConflict::column(rollover_status::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec(conn)
        .await;
    match result {
        Ok(_) => Ok(true),
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Compare-and-swap advance of the stored month.
///
/// Returns false when the stored value no longer equals `from`, which means
/// another rollover won the race; the caller must roll its transaction back.
pub async fn advance_month<C: ConnectionTrait>(
    conn: &C,
    from: &str,
    to: &str,
) -> Result<bool, DbErr> {
    let result = rollover_status::Entity::update_many()
        .col_expr(
            rollover_status::Column::LastResetMonth,
            Expr::value(to.to_string()),
        )
        .col_expr(rollover_status::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(rollover_status::Column::Id.eq(STATUS_ROW_ID))
        .filter(rollover_status::Column::LastResetMonth.eq(from))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}
