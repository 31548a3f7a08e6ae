use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Keep only the newest record per pair so the unique index can be built.
        manager
            .get_connection()
            .execute_unprepared(
                "DELETE FROM otp_records older USING otp_records newer \
                 WHERE older.identifier = newer.identifier \
                   AND older.purpose = newer.purpose \
                   AND (older.issued_at, older.id) < (newer.issued_at, newer.id)",
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_otp_records_identifier_purpose")
                    .table(OtpRecords::Table)
                    .to_owned(),
            )
            .await?;

        // Upsert target for replace: one record per (identifier, purpose).
        manager
            .create_index(
                Index::create()
                    .table(OtpRecords::Table)
                    .col(OtpRecords::Identifier)
                    .col(OtpRecords::Purpose)
                    .name("uq_otp_records_identifier_purpose")
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_otp_records_identifier_purpose")
                    .table(OtpRecords::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpRecords::Table)
                    .col(OtpRecords::Identifier)
                    .col(OtpRecords::Purpose)
                    .name("idx_otp_records_identifier_purpose")
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum OtpRecords {
    Table,
    Identifier,
    Purpose,
}
