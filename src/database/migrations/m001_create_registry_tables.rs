use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create information_systems table
        manager
            .create_table(
                Table::create()
                    .table(InformationSystems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InformationSystems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InformationSystems::Name).string().not_null())
                    .col(
                        ColumnDef::new(InformationSystems::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(InformationSystems::Description).text().not_null())
                    .col(ColumnDef::new(InformationSystems::Purpose).text().not_null())
                    .col(ColumnDef::new(InformationSystems::BusinessValue).text().not_null())
                    .col(ColumnDef::new(InformationSystems::Status).string().not_null())
                    .col(ColumnDef::new(InformationSystems::SystemType).string().not_null())
                    .col(
                        ColumnDef::new(InformationSystems::CriticalityClass)
                            .string()
                            .not_null()
                            .default("Business operational"),
                    )
                    .col(ColumnDef::new(InformationSystems::OwnerName).string().not_null())
                    .col(ColumnDef::new(InformationSystems::OwnerEmail).string().not_null())
                    .col(
                        ColumnDef::new(InformationSystems::OwnerDepartment)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InformationSystems::OwnerPhone).string())
                    .col(
                        ColumnDef::new(InformationSystems::TechnologyStack)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(InformationSystems::ProgrammingLanguages)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(InformationSystems::Databases)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(InformationSystems::Frameworks)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(InformationSystems::DeploymentModel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InformationSystems::HostingProvider).string())
                    .col(
                        ColumnDef::new(InformationSystems::BusinessFunctions)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(InformationSystems::CostCenter).string())
                    .col(
                        ColumnDef::new(InformationSystems::Version)
                            .string()
                            .not_null()
                            .default("1.0.0"),
                    )
                    .col(ColumnDef::new(InformationSystems::ParentSystemId).uuid())
                    .col(
                        ColumnDef::new(InformationSystems::DependentSystems)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(InformationSystems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InformationSystems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_information_systems_created_at_id")
                    .table(InformationSystems::Table)
                    .col(InformationSystems::CreatedAt)
                    .col(InformationSystems::Id)
                    .to_owned(),
            )
            .await?;

        // Create dataflows table
        manager
            .create_table(
                Table::create()
                    .table(Dataflows::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dataflows::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Dataflows::SourceSystemId).uuid().not_null())
                    .col(ColumnDef::new(Dataflows::TargetSystemId).uuid().not_null())
                    .col(ColumnDef::new(Dataflows::DataObjects).text().not_null())
                    .col(
                        ColumnDef::new(Dataflows::IntegrationTechnology)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Dataflows::Frequency)
                            .string()
                            .not_null()
                            .default("real-time"),
                    )
                    .col(ColumnDef::new(Dataflows::Description).text())
                    .col(
                        ColumnDef::new(Dataflows::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Dataflows::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dataflows_source_system_id")
                            .from(Dataflows::Table, Dataflows::SourceSystemId)
                            .to(InformationSystems::Table, InformationSystems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dataflows_target_system_id")
                            .from(Dataflows::Table, Dataflows::TargetSystemId)
                            .to(InformationSystems::Table, InformationSystems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dataflows_source_system_id")
                    .table(Dataflows::Table)
                    .col(Dataflows::SourceSystemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dataflows_target_system_id")
                    .table(Dataflows::Table)
                    .col(Dataflows::TargetSystemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Dataflows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InformationSystems::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum InformationSystems {
    Table,
    Id,
    Name,
    Code,
    Description,
    Purpose,
    BusinessValue,
    Status,
    SystemType,
    CriticalityClass,
    OwnerName,
    OwnerEmail,
    OwnerDepartment,
    OwnerPhone,
    TechnologyStack,
    ProgrammingLanguages,
    Databases,
    Frameworks,
    DeploymentModel,
    HostingProvider,
    BusinessFunctions,
    CostCenter,
    Version,
    ParentSystemId,
    DependentSystems,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Dataflows {
    Table,
    Id,
    SourceSystemId,
    TargetSystemId,
    DataObjects,
    IntegrationTechnology,
    Frequency,
    Description,
    CreatedAt,
    UpdatedAt,
}
