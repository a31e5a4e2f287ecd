use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240115_000001_create_master_tables::Migration),
            Box::new(m20240115_000002_create_document_sequences_table::Migration),
            Box::new(m20240115_000003_create_inventory_movements_table::Migration),
            Box::new(m20240115_000004_create_ledger_tables::Migration),
            Box::new(m20240115_000005_create_sales_invoices_table::Migration),
            Box::new(m20240115_000006_create_outbox_notifications_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240115_000001_create_master_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000001_create_master_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Items::Sku).string().not_null())
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::TrackingType).string().not_null())
                        .col(
                            ColumnDef::new(Items::DefaultUnitCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_sku")
                        .table(Items::Table)
                        .col(Items::Sku)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Counterparties::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Counterparties::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Counterparties::Kind).string().not_null())
                        .col(ColumnDef::new(Counterparties::Name).string().not_null())
                        .col(ColumnDef::new(Counterparties::Email).string().null())
                        .col(ColumnDef::new(Counterparties::Phone).string().null())
                        .col(
                            ColumnDef::new(Counterparties::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Counterparties::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
        Sku,
        Name,
        TrackingType,
        DefaultUnitCost,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Counterparties {
        Table,
        Id,
        Kind,
        Name,
        Email,
        Phone,
        CreatedAt,
    }
}

mod m20240115_000002_create_document_sequences_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000002_create_document_sequences_table"
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
                            ColumnDef::new(DocumentSequences::DocumentType)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DocumentSequences::Prefix).string().not_null())
                        .col(
                            ColumnDef::new(DocumentSequences::NextNumber)
                                .big_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(DocumentSequences::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
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
    enum DocumentSequences {
        Table,
        DocumentType,
        Prefix,
        NextNumber,
        UpdatedAt,
    }
}

mod m20240115_000003_create_inventory_movements_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000003_create_inventory_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::OccurredAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::MovementType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::WarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryMovements::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(InventoryMovements::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::UnitCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::ReferenceType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::ReferenceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::ReferenceLineId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::BatchNumber)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::SerialNumber)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_movements_warehouse_item_occurred")
                        .table(InventoryMovements::Table)
                        .col(InventoryMovements::WarehouseId)
                        .col(InventoryMovements::ItemId)
                        .col(InventoryMovements::OccurredAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_movements_item_batch")
                        .table(InventoryMovements::Table)
                        .col(InventoryMovements::ItemId)
                        .col(InventoryMovements::BatchNumber)
                        .to_owned(),
                )
                .await?;

            // Not unique: a serial repeats across transfer-out/transfer-in pairs
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_movements_item_serial")
                        .table(InventoryMovements::Table)
                        .col(InventoryMovements::ItemId)
                        .col(InventoryMovements::SerialNumber)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryMovements {
        Table,
        Id,
        OccurredAt,
        MovementType,
        WarehouseId,
        ItemId,
        Quantity,
        UnitCost,
        ReferenceType,
        ReferenceId,
        ReferenceLineId,
        BatchNumber,
        SerialNumber,
        CreatedAt,
    }
}

mod m20240115_000004_create_ledger_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000004_create_ledger_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(LedgerEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LedgerEntries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                        .col(
                            ColumnDef::new(LedgerEntries::CounterpartyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LedgerEntries::ReferenceType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(LedgerEntries::ReferenceId).uuid().not_null())
                        .col(ColumnDef::new(LedgerEntries::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(LedgerEntries::Outstanding)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LedgerEntries::PostedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LedgerEntries::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LedgerEntries::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ledger_entries_counterparty_kind")
                        .table(LedgerEntries::Table)
                        .col(LedgerEntries::CounterpartyId)
                        .col(LedgerEntries::Kind)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ledger_entries_reference")
                        .table(LedgerEntries::Table)
                        .col(LedgerEntries::ReferenceType)
                        .col(LedgerEntries::ReferenceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Payments::ReferenceNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::Direction).string().not_null())
                        .col(
                            ColumnDef::new(Payments::CounterpartyKind)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::CounterpartyId).uuid().not_null())
                        .col(ColumnDef::new(Payments::CurrencyCode).string().not_null())
                        .col(
                            ColumnDef::new(Payments::ExchangeRate)
                                .decimal()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Payments::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(Payments::PaidAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CreditNotes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CreditNotes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditNotes::ReferenceNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditNotes::CounterpartyKind)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CreditNotes::CounterpartyId).uuid().not_null())
                        .col(ColumnDef::new(CreditNotes::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(CreditNotes::RemainingAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditNotes::IssuedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditNotes::SourceReferenceType)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(CreditNotes::SourceReferenceId).uuid().null())
                        .col(
                            ColumnDef::new(CreditNotes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditNotes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DebitNotes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DebitNotes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DebitNotes::ReferenceNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DebitNotes::CounterpartyKind)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DebitNotes::CounterpartyId).uuid().not_null())
                        .col(ColumnDef::new(DebitNotes::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(DebitNotes::RemainingAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DebitNotes::IssuedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DebitNotes::SourceReferenceType)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(DebitNotes::SourceReferenceId).uuid().null())
                        .col(
                            ColumnDef::new(DebitNotes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Allocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Allocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Allocations::PaymentId).uuid().null())
                        .col(ColumnDef::new(Allocations::CreditNoteId).uuid().null())
                        .col(ColumnDef::new(Allocations::ReceivableEntryId).uuid().null())
                        .col(ColumnDef::new(Allocations::PayableEntryId).uuid().null())
                        .col(ColumnDef::new(Allocations::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(Allocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_allocations_payment")
                                .from(Allocations::Table, Allocations::PaymentId)
                                .to(Payments::Table, Payments::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_allocations_credit_note")
                                .from(Allocations::Table, Allocations::CreditNoteId)
                                .to(CreditNotes::Table, CreditNotes::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_allocations_receivable_entry")
                                .from(Allocations::Table, Allocations::ReceivableEntryId)
                                .to(LedgerEntries::Table, LedgerEntries::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_allocations_payable_entry")
                                .from(Allocations::Table, Allocations::PayableEntryId)
                                .to(LedgerEntries::Table, LedgerEntries::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_allocations_payment_id")
                        .table(Allocations::Table)
                        .col(Allocations::PaymentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_allocations_credit_note_id")
                        .table(Allocations::Table)
                        .col(Allocations::CreditNoteId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_allocations_receivable_entry_id")
                        .table(Allocations::Table)
                        .col(Allocations::ReceivableEntryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_allocations_payable_entry_id")
                        .table(Allocations::Table)
                        .col(Allocations::PayableEntryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Allocations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DebitNotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CreditNotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum LedgerEntries {
        Table,
        Id,
        Kind,
        CounterpartyId,
        ReferenceType,
        ReferenceId,
        Amount,
        Outstanding,
        PostedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        ReferenceNumber,
        Direction,
        CounterpartyKind,
        CounterpartyId,
        CurrencyCode,
        ExchangeRate,
        Amount,
        PaidAt,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum CreditNotes {
        Table,
        Id,
        ReferenceNumber,
        CounterpartyKind,
        CounterpartyId,
        Amount,
        RemainingAmount,
        IssuedAt,
        SourceReferenceType,
        SourceReferenceId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DebitNotes {
        Table,
        Id,
        ReferenceNumber,
        CounterpartyKind,
        CounterpartyId,
        Amount,
        RemainingAmount,
        IssuedAt,
        SourceReferenceType,
        SourceReferenceId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Allocations {
        Table,
        Id,
        PaymentId,
        CreditNoteId,
        ReceivableEntryId,
        PayableEntryId,
        Amount,
        CreatedAt,
    }
}

mod m20240115_000005_create_sales_invoices_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000005_create_sales_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesInvoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesInvoices::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesInvoices::InvoiceNumber).string().null())
                        .col(ColumnDef::new(SalesInvoices::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(SalesInvoices::CurrencyCode)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesInvoices::TotalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesInvoices::Status).string().not_null())
                        .col(
                            ColumnDef::new(SalesInvoices::PostedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SalesInvoices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesInvoices::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_invoices_customer_id")
                        .table(SalesInvoices::Table)
                        .col(SalesInvoices::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesInvoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SalesInvoices {
        Table,
        Id,
        InvoiceNumber,
        CustomerId,
        CurrencyCode,
        TotalAmount,
        Status,
        PostedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240115_000006_create_outbox_notifications_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000006_create_outbox_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OutboxNotifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboxNotifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboxNotifications::AggregateType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboxNotifications::AggregateId).uuid().null())
                        .col(
                            ColumnDef::new(OutboxNotifications::EventType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboxNotifications::Payload).json().not_null())
                        .col(ColumnDef::new(OutboxNotifications::Status).string().not_null())
                        .col(
                            ColumnDef::new(OutboxNotifications::Attempts)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OutboxNotifications::AvailableAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboxNotifications::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboxNotifications::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_outbox_notifications_status_available")
                        .table(OutboxNotifications::Table)
                        .col(OutboxNotifications::Status)
                        .col(OutboxNotifications::AvailableAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OutboxNotifications::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OutboxNotifications {
        Table,
        Id,
        AggregateType,
        AggregateId,
        EventType,
        Payload,
        Status,
        Attempts,
        AvailableAt,
        CreatedAt,
        UpdatedAt,
    }
}
