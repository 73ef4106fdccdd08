//! Initial database migration.
//!
//! Creates the enums, tenant tables, service records and the indexes the
//! reconciliation and calendar queries rely on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: DIRECTORY
        // ============================================================
        db.execute_unprepared(CLIENTS_SQL).await?;
        db.execute_unprepared(TECHNICIANS_SQL).await?;

        // ============================================================
        // PART 4: SERVICE RECORDS
        // ============================================================
        db.execute_unprepared(SERVICE_RECORDS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('admin', 'member');

CREATE TYPE service_status AS ENUM (
    'pendente',
    'em_andamento',
    'concluido',
    'cancelado'
);

CREATE TYPE payment_status AS ENUM (
    'pendente',
    'pago',
    'parcial',
    'cancelado'
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id                  UUID PRIMARY KEY,
    name                VARCHAR(255) NOT NULL,
    slug                VARCHAR(63) NOT NULL UNIQUE,
    timezone            VARCHAR(64) NOT NULL DEFAULT 'America/Sao_Paulo',
    is_active           BOOLEAN NOT NULL DEFAULT true,
    onboarding_completo BOOLEAN NOT NULL DEFAULT false,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_slug_format CHECK (slug ~ '^[a-z0-9]([a-z0-9-]*[a-z0-9])?$')
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id              UUID PRIMARY KEY,
    display_name    VARCHAR(255) NOT NULL,
    email           VARCHAR(255),
    phone           VARCHAR(32),
    organization_id UUID REFERENCES organizations(id) ON DELETE SET NULL,
    role            user_role NOT NULL DEFAULT 'member',
    is_active       BOOLEAN NOT NULL DEFAULT true,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE UNIQUE INDEX idx_users_email ON users (LOWER(email)) WHERE email IS NOT NULL;
CREATE INDEX idx_users_organization ON users (organization_id) WHERE organization_id IS NOT NULL;
";

const CLIENTS_SQL: &str = r"
CREATE TABLE clients (
    id              UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    name            VARCHAR(255) NOT NULL,
    email           VARCHAR(255),
    phone           VARCHAR(32),
    is_active       BOOLEAN NOT NULL DEFAULT true,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_clients_organization ON clients (organization_id, name);
";

const TECHNICIANS_SQL: &str = r"
CREATE TABLE technicians (
    id              UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    full_name       VARCHAR(255) NOT NULL,
    nickname        VARCHAR(100),
    phone           VARCHAR(32),
    is_active       BOOLEAN NOT NULL DEFAULT true,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_technicians_organization ON technicians (organization_id, full_name);
";

const SERVICE_RECORDS_SQL: &str = r"
CREATE TABLE service_records (
    id              UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    client_id       UUID NOT NULL REFERENCES clients(id),
    technician_id   UUID NOT NULL REFERENCES technicians(id),
    date            DATE NOT NULL,
    gross_value     NUMERIC(15, 2) NOT NULL,
    status          service_status NOT NULL DEFAULT 'pendente',
    payment_status  payment_status NOT NULL DEFAULT 'pendente',
    payment_date    TIMESTAMPTZ,
    completed_date  TIMESTAMPTZ,
    has_invoice     BOOLEAN NOT NULL DEFAULT false,
    description     TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_gross_value_non_negative CHECK (gross_value >= 0)
);

CREATE INDEX idx_service_records_org_date ON service_records (organization_id, date);

-- Drift candidates: paid, open, never completed
CREATE INDEX idx_service_records_drift ON service_records (organization_id, date)
    WHERE payment_status = 'pago'
      AND status IN ('pendente', 'em_andamento')
      AND completed_date IS NULL;
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION prevent_organization_reparent()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.organization_id <> OLD.organization_id THEN
        RAISE EXCEPTION 'organization_id is immutable on %', TG_TABLE_NAME;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_service_records_immutable_org
    BEFORE UPDATE ON service_records
    FOR EACH ROW EXECUTE FUNCTION prevent_organization_reparent();

CREATE TRIGGER trg_clients_immutable_org
    BEFORE UPDATE ON clients
    FOR EACH ROW EXECUTE FUNCTION prevent_organization_reparent();

CREATE TRIGGER trg_technicians_immutable_org
    BEFORE UPDATE ON technicians
    FOR EACH ROW EXECUTE FUNCTION prevent_organization_reparent();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_technicians_immutable_org ON technicians;
DROP TRIGGER IF EXISTS trg_clients_immutable_org ON clients;
DROP TRIGGER IF EXISTS trg_service_records_immutable_org ON service_records;
DROP FUNCTION IF EXISTS prevent_organization_reparent();

DROP TABLE IF EXISTS service_records CASCADE;
DROP TABLE IF EXISTS technicians CASCADE;
DROP TABLE IF EXISTS clients CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;

DROP TYPE IF EXISTS payment_status CASCADE;
DROP TYPE IF EXISTS service_status CASCADE;
DROP TYPE IF EXISTS user_role CASCADE;
";
