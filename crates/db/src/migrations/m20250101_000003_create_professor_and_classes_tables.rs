//! Create professor, classes and class-professor tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Professor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Professor::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Professor::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Professor::Email).string_len(256))
                    .col(ColumnDef::new(Professor::DepartmentId).string_len(32))
                    .col(
                        ColumnDef::new(Professor::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_professor_department")
                            .from(Professor::Table, Professor::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Classes::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Classes::CourseTitle)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Classes::ChatEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Classes::DepartmentId).string_len(32))
                    .col(
                        ColumnDef::new(Classes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_classes_department")
                            .from(Classes::Table, Classes::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassProfessor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassProfessor::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassProfessor::ClassId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ClassProfessor::ProfessorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_professor_class")
                            .from(ClassProfessor::Table, ClassProfessor::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_professor_professor")
                            .from(ClassProfessor::Table, ClassProfessor::ProfessorId)
                            .to(Professor::Table, Professor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: a professor is assigned to a class at most once
        manager
            .create_index(
                Index::create()
                    .name("idx_class_professor_class_professor")
                    .table(ClassProfessor::Table)
                    .col(ClassProfessor::ClassId)
                    .col(ClassProfessor::ProfessorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: department_id (for listing classes by department)
        manager
            .create_index(
                Index::create()
                    .name("idx_classes_department_id")
                    .table(Classes::Table)
                    .col(Classes::DepartmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClassProfessor::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Professor::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Professor {
    Table,
    Id,
    Name,
    Email,
    DepartmentId,
    CreatedAt,
}

#[derive(Iden)]
enum Classes {
    Table,
    Id,
    CourseTitle,
    ChatEnabled,
    DepartmentId,
    CreatedAt,
}

#[derive(Iden)]
enum ClassProfessor {
    Table,
    Id,
    ClassId,
    ProfessorId,
}

#[derive(Iden)]
enum Department {
    Table,
    Id,
}
