//! Create group chat, participant and group message tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GroupChat::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupChat::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupChat::GroupTitle).string_len(256).not_null())
                    .col(ColumnDef::new(GroupChat::LastMessageId).string_len(32))
                    .col(ColumnDef::new(GroupChat::LastMessageAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(GroupChat::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupChatParticipant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupChatParticipant::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GroupChatParticipant::GroupChatId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupChatParticipant::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupChatParticipant::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_chat_participant_chat")
                            .from(GroupChatParticipant::Table, GroupChatParticipant::GroupChatId)
                            .to(GroupChat::Table, GroupChat::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_chat_participant_user")
                            .from(GroupChatParticipant::Table, GroupChatParticipant::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: a user joins a chat once
        manager
            .create_index(
                Index::create()
                    .name("idx_group_chat_participant_chat_user")
                    .table(GroupChatParticipant::Table)
                    .col(GroupChatParticipant::GroupChatId)
                    .col(GroupChatParticipant::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's conversations)
        manager
            .create_index(
                Index::create()
                    .name("idx_group_chat_participant_user_id")
                    .table(GroupChatParticipant::Table)
                    .col(GroupChatParticipant::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMessage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GroupMessage::GroupChatId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(GroupMessage::SenderId).string_len(32).not_null())
                    .col(ColumnDef::new(GroupMessage::Content).text().not_null())
                    .col(
                        ColumnDef::new(GroupMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_message_chat")
                            .from(GroupMessage::Table, GroupMessage::GroupChatId)
                            .to(GroupChat::Table, GroupChat::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_message_sender")
                            .from(GroupMessage::Table, GroupMessage::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (group_chat_id, created_at) for chat history
        manager
            .create_index(
                Index::create()
                    .name("idx_group_message_chat_created_at")
                    .table(GroupMessage::Table)
                    .col(GroupMessage::GroupChatId)
                    .col(GroupMessage::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // group_message exists now, so the chat can point at its latest entry
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_group_chat_last_message")
                    .from(GroupChat::Table, GroupChat::LastMessageId)
                    .to(GroupMessage::Table, GroupMessage::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk_group_chat_last_message")
                    .table(GroupChat::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMessage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupChatParticipant::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupChat::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GroupChat {
    Table,
    Id,
    GroupTitle,
    LastMessageId,
    LastMessageAt,
    CreatedAt,
}

#[derive(Iden)]
enum GroupChatParticipant {
    Table,
    Id,
    GroupChatId,
    UserId,
    JoinedAt,
}

#[derive(Iden)]
enum GroupMessage {
    Table,
    Id,
    GroupChatId,
    SenderId,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
