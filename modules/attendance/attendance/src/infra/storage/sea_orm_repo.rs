use std::collections::HashMap;

use async_trait::async_trait;
use attendance_sdk::{AttendanceQuery, AttendanceRecord};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use time::Date;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::AttendanceRepository;

use super::entity::{self, Column, Entity as AttendanceEntity};
use super::mapper::to_active_model;

pub struct SeaOrmAttendanceRepository {
    db: DatabaseConnection,
}

impl SeaOrmAttendanceRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_records(rows: Vec<entity::Model>) -> Result<Vec<AttendanceRecord>, DomainError> {
    rows.into_iter().map(AttendanceRecord::try_from).collect()
}

#[async_trait]
impl AttendanceRepository for SeaOrmAttendanceRepository {
    async fn find(
        &self,
        org_id: &str,
        query: &AttendanceQuery,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let mut select = AttendanceEntity::find().filter(Column::OrgId.eq(org_id));
        if let Some(class_id) = &query.class_id {
            select = select.filter(Column::ClassId.eq(class_id.as_str()));
        }
        if let Some(student_id) = &query.student_id {
            select = select.filter(Column::StudentId.eq(student_id.as_str()));
        }
        if let Some(date) = query.date {
            select = select.filter(Column::Date.eq(date));
        }

        let rows = select
            .order_by_asc(Column::Date)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await?;
        to_records(rows)
    }

    async fn get(&self, org_id: &str, id: Uuid) -> Result<Option<AttendanceRecord>, DomainError> {
        AttendanceEntity::find_by_id(id)
            .filter(Column::OrgId.eq(org_id))
            .one(&self.db)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn upsert_many(
        &self,
        org_id: &str,
        rows: Vec<AttendanceRecord>,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let students: Vec<&str> = rows.iter().map(|r| r.student_id.as_str()).collect();
        let mut dates: Vec<Date> = rows.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();

        let txn = self.db.begin().await?;

        // The conflict update below only touches rows of `org_id`, so a key
        // owned elsewhere would be silently skipped. Reject it instead.
        let foreign = AttendanceEntity::find()
            .filter(Column::OrgId.ne(org_id))
            .filter(Column::StudentId.is_in(students.clone()))
            .filter(Column::Date.is_in(dates.clone()))
            .all(&txn)
            .await?;
        if let Some(taken) = foreign
            .into_iter()
            .find(|m| rows.iter().any(|r| r.student_id == m.student_id && r.date == m.date))
        {
            return Err(DomainError::CrossOrgConflict {
                student_id: taken.student_id,
                date: taken.date,
            });
        }

        AttendanceEntity::insert_many(rows.iter().map(to_active_model))
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::Date])
                    .update_columns([
                        Column::ClassId,
                        Column::Status,
                        Column::Notes,
                        Column::RecordedBy,
                        Column::UpdatedAt,
                    ])
                    .action_and_where(Column::OrgId.eq(org_id))
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let stored = AttendanceEntity::find()
            .filter(Column::OrgId.eq(org_id))
            .filter(Column::StudentId.is_in(students))
            .filter(Column::Date.is_in(dates))
            .all(&txn)
            .await?;
        txn.commit().await?;

        let mut by_key: HashMap<(String, Date), entity::Model> = stored
            .into_iter()
            .map(|m| ((m.student_id.clone(), m.date), m))
            .collect();
        rows.iter()
            .map(|r| {
                by_key
                    .remove(&(r.student_id.clone(), r.date))
                    .ok_or_else(|| {
                        DomainError::database(format!(
                            "attendance for '{}' on {} missing after upsert",
                            r.student_id, r.date
                        ))
                    })
                    .and_then(AttendanceRecord::try_from)
            })
            .collect()
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, DomainError> {
        let active = entity::ActiveModel {
            id: Unchanged(record.id),
            class_id: Set(record.class_id.clone()),
            status: Set(record.status.as_str().to_owned()),
            notes: Set(record.notes.clone()),
            updated_at: Set(record.updated_at),
            ..entity::ActiveModel::default()
        };
        let updated = AttendanceEntity::update(active)
            .filter(Column::OrgId.eq(record.org_id.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => DomainError::NotFound { id: record.id },
                other => other.into(),
            })?;
        AttendanceRecord::try_from(updated)
    }

    async fn delete(&self, org_id: &str, id: Uuid) -> Result<bool, DomainError> {
        let result = AttendanceEntity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::OrgId.eq(org_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
