//! Create message and message vote tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Message::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Message::SenderId).string_len(32).not_null())
                    .col(ColumnDef::new(Message::DepartmentId).string_len(32))
                    .col(ColumnDef::new(Message::ProfessorId).string_len(32))
                    .col(ColumnDef::new(Message::ClassId).string_len(32))
                    .col(ColumnDef::new(Message::ParentId).string_len(32))
                    .col(ColumnDef::new(Message::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Message::Body).text().not_null())
                    .col(
                        ColumnDef::new(Message::MessageType)
                            .string_len(20)
                            .not_null()
                            .default("general"),
                    )
                    .col(
                        ColumnDef::new(Message::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Message::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_sender")
                            .from(Message::Table, Message::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_department")
                            .from(Message::Table, Message::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_professor")
                            .from(Message::Table, Message::ProfessorId)
                            .to(Professor::Table, Professor::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_class")
                            .from(Message::Table, Message::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_parent")
                            .from(Message::Table, Message::ParentId)
                            .to(Message::Table, Message::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (department_id, created_at) for department feeds
        manager
            .create_index(
                Index::create()
                    .name("idx_message_department_created_at")
                    .table(Message::Table)
                    .col(Message::DepartmentId)
                    .col(Message::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: parent_id (for comment lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_message_parent_id")
                    .table(Message::Table)
                    .col(Message::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MessageVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MessageVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MessageVote::MessageId).string_len(32).not_null())
                    .col(ColumnDef::new(MessageVote::UnityId).string_len(64).not_null())
                    .col(ColumnDef::new(MessageVote::Kind).string_len(20).not_null())
                    .col(
                        ColumnDef::new(MessageVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_vote_message")
                            .from(MessageVote::Table, MessageVote::MessageId)
                            .to(Message::Table, Message::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one vote per identity per message
        manager
            .create_index(
                Index::create()
                    .name("idx_message_vote_message_unity")
                    .table(MessageVote::Table)
                    .col(MessageVote::MessageId)
                    .col(MessageVote::UnityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MessageVote::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Message::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Message {
    Table,
    Id,
    SenderId,
    DepartmentId,
    ProfessorId,
    ClassId,
    ParentId,
    Title,
    Body,
    MessageType,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MessageVote {
    Table,
    Id,
    MessageId,
    UnityId,
    Kind,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Department {
    Table,
    Id,
}

#[derive(Iden)]
enum Professor {
    Table,
    Id,
}

#[derive(Iden)]
enum Classes {
    Table,
    Id,
}
