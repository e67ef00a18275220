//! Create friendship and friend request tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Friendship::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Friendship::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Friendship::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Friendship::FriendId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Friendship::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendship_user")
                            .from(Friendship::Table, Friendship::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendship_friend")
                            .from(Friendship::Table, Friendship::FriendId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, friend_id) - each direction stored once
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_user_friend")
                    .table(Friendship::Table)
                    .col(Friendship::UserId)
                    .col(Friendship::FriendId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FriendRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FriendRequest::SenderId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(FriendRequest::ReceiverId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_sender")
                            .from(FriendRequest::Table, FriendRequest::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_receiver")
                            .from(FriendRequest::Table, FriendRequest::ReceiverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (sender_id, receiver_id) - prevent duplicate requests
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_sender_receiver")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::SenderId)
                    .col(FriendRequest::ReceiverId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: receiver_id (for listing incoming requests)
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_receiver_id")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::ReceiverId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FriendRequest::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Friendship::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Friendship {
    Table,
    Id,
    UserId,
    FriendId,
    CreatedAt,
}

#[derive(Iden)]
enum FriendRequest {
    Table,
    Id,
    SenderId,
    ReceiverId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
