use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_annual_budgets_table::Migration),
            Box::new(m20250101_000002_create_program_of_works_table::Migration),
            Box::new(m20250101_000003_create_biddings_table::Migration),
            Box::new(m20250101_000004_create_contractors_table::Migration),
            Box::new(m20250101_000005_create_contract_histories_table::Migration),
            Box::new(m20250101_000006_create_performance_ratings_table::Migration),
            Box::new(m20250101_000007_create_document_sequences_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_annual_budgets_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_annual_budgets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AnnualBudgets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AnnualBudgets::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AnnualBudgets::FiscalYear).integer().not_null())
                        .col(
                            ColumnDef::new(AnnualBudgets::TotalBudget)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AnnualBudgets::AllocatedAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AnnualBudgets::RemainingAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(AnnualBudgets::Status).string().not_null())
                        .col(ColumnDef::new(AnnualBudgets::Description).string().null())
                        .col(ColumnDef::new(AnnualBudgets::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(AnnualBudgets::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_annual_budgets_fiscal_year")
                        .table(AnnualBudgets::Table)
                        .col(AnnualBudgets::FiscalYear)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AnnualBudgets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum AnnualBudgets {
        Table,
        Id,
        FiscalYear,
        TotalBudget,
        AllocatedAmount,
        RemainingAmount,
        Status,
        Description,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_program_of_works_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_program_of_works_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProgramOfWorks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProgramOfWorks::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProgramOfWorks::PowNumber).string().not_null())
                        .col(ColumnDef::new(ProgramOfWorks::Title).string().not_null())
                        .col(ColumnDef::new(ProgramOfWorks::BudgetId).uuid().null())
                        .col(
                            ColumnDef::new(ProgramOfWorks::EstimatedCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProgramOfWorks::FiscalYear)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProgramOfWorks::Status).string().not_null())
                        .col(ColumnDef::new(ProgramOfWorks::BiddingId).uuid().null())
                        .col(ColumnDef::new(ProgramOfWorks::ProjectId).uuid().null())
                        .col(ColumnDef::new(ProgramOfWorks::Description).string().null())
                        .col(
                            ColumnDef::new(ProgramOfWorks::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProgramOfWorks::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // POW numbers are unique per fiscal year
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_program_of_works_pow_number")
                        .table(ProgramOfWorks::Table)
                        .col(ProgramOfWorks::PowNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_program_of_works_fiscal_year")
                        .table(ProgramOfWorks::Table)
                        .col(ProgramOfWorks::FiscalYear)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProgramOfWorks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ProgramOfWorks {
        Table,
        Id,
        PowNumber,
        Title,
        BudgetId,
        EstimatedCost,
        FiscalYear,
        Status,
        BiddingId,
        ProjectId,
        Description,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_biddings_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_biddings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Biddings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Biddings::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Biddings::BiddingNumber).string().not_null())
                        .col(ColumnDef::new(Biddings::PowId).uuid().null())
                        .col(ColumnDef::new(Biddings::Abc).decimal().not_null().default(0))
                        .col(ColumnDef::new(Biddings::Status).string().not_null())
                        .col(ColumnDef::new(Biddings::ContractCost).decimal().null())
                        .col(ColumnDef::new(Biddings::WinningBidder).string().null())
                        .col(ColumnDef::new(Biddings::Description).string().null())
                        .col(ColumnDef::new(Biddings::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Biddings::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_biddings_bidding_number")
                        .table(Biddings::Table)
                        .col(Biddings::BiddingNumber)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Biddings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Biddings {
        Table,
        Id,
        BiddingNumber,
        PowId,
        Abc,
        Status,
        ContractCost,
        WinningBidder,
        Description,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_contractors_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_contractors_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Contractors::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Contractors::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Contractors::Name).string().not_null())
                        .col(ColumnDef::new(Contractors::Tin).string().null())
                        .col(ColumnDef::new(Contractors::Status).string().not_null())
                        .col(
                            ColumnDef::new(Contractors::TotalContracts)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Contractors::TotalContractValue)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Contractors::CompletedContracts)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Contractors::OngoingContracts)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Contractors::OverallRating)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Contractors::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Contractors::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Contractors::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Contractors {
        Table,
        Id,
        Name,
        Tin,
        Status,
        TotalContracts,
        TotalContractValue,
        CompletedContracts,
        OngoingContracts,
        OverallRating,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000005_create_contract_histories_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_contract_histories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ContractHistories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ContractHistories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ContractHistories::ContractorId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ContractHistories::ProjectName).string().null())
                        .col(
                            ColumnDef::new(ContractHistories::ContractAmount)
                                .decimal()
                                .null(),
                        )
                        .col(ColumnDef::new(ContractHistories::Status).string().not_null())
                        .col(
                            ColumnDef::new(ContractHistories::PerformanceRating)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ContractHistories::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ContractHistories::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_contract_histories_contractor_id")
                        .table(ContractHistories::Table)
                        .col(ContractHistories::ContractorId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ContractHistories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ContractHistories {
        Table,
        Id,
        ContractorId,
        ProjectName,
        ContractAmount,
        Status,
        PerformanceRating,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000006_create_performance_ratings_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_performance_ratings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PerformanceRatings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PerformanceRatings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::ContractorId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::ContractHistoryId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::QualityRating)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::TimelinessRating)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::SafetyRating)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::ResourceRating)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::CommunicationRating)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::OverallRating)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::EvaluatedBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PerformanceRatings::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_performance_ratings_contractor_id")
                        .table(PerformanceRatings::Table)
                        .col(PerformanceRatings::ContractorId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PerformanceRatings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PerformanceRatings {
        Table,
        Id,
        ContractorId,
        ContractHistoryId,
        QualityRating,
        TimelinessRating,
        SafetyRating,
        ResourceRating,
        CommunicationRating,
        OverallRating,
        EvaluatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000007_create_document_sequences_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_document_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DocumentSequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DocumentSequences::Scope)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentSequences::Value)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DocumentSequences::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum DocumentSequences {
        Table,
        Scope,
        Value,
    }
}
