use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use resolveit_otp_schema::{otp_records, users};

use crate::domain::repository::{OtpRepository, PrincipalDirectory};
use crate::domain::types::{OtpRecord, Principal, PrincipalRecord, Purpose};
use crate::error::OtpServiceError;

// ── OTP repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn replace(&self, record: &OtpRecord) -> Result<(), OtpServiceError> {
        // One statement against the unique (identifier, purpose) index: concurrent
        // issuers serialise on the index entry and the last one to write wins.
        let on_conflict = OnConflict::columns([
            otp_records::Column::Identifier,
            otp_records::Column::Purpose,
        ])
        .update_columns([
            otp_records::Column::Id,
            otp_records::Column::Code,
            otp_records::Column::IssuedAt,
            otp_records::Column::ExpiresAt,
            otp_records::Column::Consumed,
        ])
        .to_owned();

        otp_records::Entity::insert(otp_record_model(record))
            .on_conflict(on_conflict)
            .exec_without_returning(&self.db)
            .await
            .context("replace otp record")?;
        Ok(())
    }

    async fn delete_for(
        &self,
        identifier: &str,
        purpose: Purpose,
    ) -> Result<u64, OtpServiceError> {
        let result = otp_records::Entity::delete_many()
            .filter(otp_records::Column::Identifier.eq(identifier))
            .filter(otp_records::Column::Purpose.eq(purpose.as_str()))
            .exec(&self.db)
            .await
            .context("delete otp records for pair")?;
        Ok(result.rows_affected)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), OtpServiceError> {
        otp_records::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete otp record by id")?;
        Ok(())
    }

    async fn consume(
        &self,
        identifier: &str,
        purpose: Purpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, OtpServiceError> {
        // UPDATE ... SET consumed = true WHERE ... AND consumed = false: the row
        // lock serialises concurrent verifiers and only one sees rows_affected = 1.
        let result = otp_records::Entity::update_many()
            .col_expr(otp_records::Column::Consumed, Expr::value(true))
            .filter(otp_records::Column::Identifier.eq(identifier))
            .filter(otp_records::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_records::Column::Code.eq(code))
            .filter(otp_records::Column::Consumed.eq(false))
            .filter(otp_records::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("consume otp record")?;
        Ok(result.rows_affected == 1)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, OtpServiceError> {
        let result = otp_records::Entity::delete_many()
            .filter(otp_records::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .context("delete expired otp records")?;
        Ok(result.rows_affected)
    }
}

fn otp_record_model(record: &OtpRecord) -> otp_records::ActiveModel {
    otp_records::ActiveModel {
        id: Set(record.id),
        identifier: Set(record.identifier.clone()),
        purpose: Set(record.purpose.as_str().to_owned()),
        code: Set(record.code.clone()),
        issued_at: Set(record.issued_at),
        expires_at: Set(record.expires_at),
        consumed: Set(record.consumed),
    }
}

// ── Principal directory ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPrincipalDirectory {
    pub db: DatabaseConnection,
}

impl PrincipalDirectory for DbPrincipalDirectory {
    async fn exists(&self, identifier: &str) -> Result<bool, OtpServiceError> {
        use sea_orm::PaginatorTrait;
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(identifier))
            .count(&self.db)
            .await
            .context("count users by email")?;
        Ok(count > 0)
    }

    async fn find(&self, identifier: &str) -> Result<Option<PrincipalRecord>, OtpServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(identifier))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(principal_from_model))
    }

    async fn create(&self, record: &PrincipalRecord) -> Result<bool, OtpServiceError> {
        let p = &record.principal;
        let result = users::ActiveModel {
            id: Set(p.id),
            first_name: Set(p.first_name.clone()),
            last_name: Set(p.last_name.clone()),
            email: Set(p.email.clone()),
            dob: Set(p.dob),
            password_hash: Set(record.password_hash.clone()),
            created_at: Set(p.created_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }
}

fn principal_from_model(model: users::Model) -> PrincipalRecord {
    PrincipalRecord {
        principal: Principal {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            dob: model.dob,
            created_at: model.created_at,
        },
        password_hash: model.password_hash,
    }
}
