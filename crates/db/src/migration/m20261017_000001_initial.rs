//! Initial database migration.
//!
//! Creates the reconciliation tables, the single-pending-proposal index and
//! the triggers that keep decisions and ledger entries append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_REQUESTS_SQL).await?;

        // ============================================================
        // PART 2: BANK TRANSACTIONS
        // ============================================================
        db.execute_unprepared(BANK_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 3: PROPOSALS & SPLITS
        // ============================================================
        db.execute_unprepared(PROPOSALS_SQL).await?;
        db.execute_unprepared(SPLIT_LINES_SQL).await?;

        // ============================================================
        // PART 4: DECISIONS & LEDGER
        // ============================================================
        db.execute_unprepared(APPROVAL_DECISIONS_SQL).await?;
        db.execute_unprepared(LEDGER_SQL).await?;

        // ============================================================
        // PART 5: LEARNING
        // ============================================================
        db.execute_unprepared(RULES_SQL).await?;
        db.execute_unprepared(HISTORY_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
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

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(30) NOT NULL,
    name VARCHAR(200) NOT NULL,
    account_type VARCHAR(20) NOT NULL,
    nature VARCHAR(10) NOT NULL,
    analytical BOOLEAN NOT NULL DEFAULT true,
    active BOOLEAN NOT NULL DEFAULT true,
    parent_code VARCHAR(30),
    UNIQUE (tenant_id, code),
    CONSTRAINT chk_account_type CHECK (
        account_type IN ('asset', 'liability', 'equity', 'revenue', 'expense')
    ),
    CONSTRAINT chk_account_nature CHECK (nature IN ('debit', 'credit'))
);

CREATE INDEX idx_accounts_tenant ON accounts(tenant_id);
";

const ACCOUNT_REQUESTS_SQL: &str = r"
CREATE TABLE account_requests (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(30) NOT NULL,
    name VARCHAR(200) NOT NULL,
    account_type VARCHAR(20) NOT NULL,
    nature VARCHAR(10) NOT NULL,
    justification TEXT NOT NULL,
    requested_by UUID NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_request_status CHECK (
        status IN ('pending', 'approved', 'rejected', 'superseded')
    )
);

CREATE UNIQUE INDEX idx_account_requests_pending_code
    ON account_requests(tenant_id, code) WHERE status = 'pending';
";

const BANK_TRANSACTIONS_SQL: &str = r"
CREATE TABLE bank_transactions (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    external_id VARCHAR(255) NOT NULL,
    date DATE NOT NULL,
    amount BIGINT NOT NULL,
    description TEXT NOT NULL,
    memo TEXT,
    reference VARCHAR(100),
    counterpart_id UUID,
    status VARCHAR(20) NOT NULL DEFAULT 'imported',
    imported_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, external_id),
    CONSTRAINT chk_bank_transaction_status CHECK (
        status IN ('imported', 'matched', 'classified', 'pending_approval', 'approved', 'rejected')
    )
);

CREATE INDEX idx_bank_transactions_tenant_date ON bank_transactions(tenant_id, date);
CREATE INDEX idx_bank_transactions_tenant_status ON bank_transactions(tenant_id, status);
";

const PROPOSALS_SQL: &str = r"
CREATE TABLE classification_proposals (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    transaction_id UUID NOT NULL REFERENCES bank_transactions(id) ON DELETE CASCADE,
    kind VARCHAR(20) NOT NULL,
    lines JSONB NOT NULL,
    confidence NUMERIC(5, 4) NOT NULL,
    source JSONB NOT NULL,
    justification TEXT,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    superseded_by UUID REFERENCES classification_proposals(id) DEFERRABLE INITIALLY DEFERRED,
    CONSTRAINT chk_proposal_kind CHECK (kind IN ('classification', 'reclassification')),
    CONSTRAINT chk_proposal_status CHECK (
        status IN ('pending', 'approved', 'rejected', 'superseded')
    ),
    CONSTRAINT chk_proposal_confidence CHECK (confidence >= 0 AND confidence <= 1)
);

CREATE INDEX idx_proposals_tenant_status ON classification_proposals(tenant_id, status);
CREATE INDEX idx_proposals_transaction ON classification_proposals(transaction_id);

-- At most one pending proposal per transaction
CREATE UNIQUE INDEX idx_proposals_single_pending
    ON classification_proposals(transaction_id) WHERE status = 'pending';
";

const SPLIT_LINES_SQL: &str = r"
CREATE TABLE split_lines (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    transaction_id UUID NOT NULL REFERENCES bank_transactions(id) ON DELETE CASCADE,
    proposal_id UUID NOT NULL REFERENCES classification_proposals(id),
    account_id UUID NOT NULL REFERENCES accounts(id),
    amount BIGINT NOT NULL,
    position INTEGER NOT NULL,
    memo TEXT,
    UNIQUE (transaction_id, position),
    CONSTRAINT chk_split_amount_nonzero CHECK (amount <> 0),
    CONSTRAINT chk_split_position CHECK (position >= 1)
);
";

const APPROVAL_DECISIONS_SQL: &str = r"
CREATE TABLE approval_decisions (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    subject_type VARCHAR(20) NOT NULL,
    subject_id UUID NOT NULL,
    reviewer UUID NOT NULL,
    decision VARCHAR(10) NOT NULL,
    decided_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    comment TEXT,
    CONSTRAINT chk_subject_type CHECK (subject_type IN ('proposal', 'account_request')),
    CONSTRAINT chk_decision CHECK (decision IN ('approve', 'reject')),
    CONSTRAINT chk_reject_comment CHECK (
        decision = 'approve' OR (comment IS NOT NULL AND length(trim(comment)) > 0)
    )
);

CREATE INDEX idx_decisions_tenant ON approval_decisions(tenant_id, decided_at);
CREATE INDEX idx_decisions_subject ON approval_decisions(subject_id);
";

const LEDGER_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    transaction_id UUID NOT NULL REFERENCES bank_transactions(id),
    proposal_id UUID NOT NULL REFERENCES classification_proposals(id),
    date DATE NOT NULL,
    description TEXT NOT NULL,
    approved_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (transaction_id)
);

CREATE TABLE ledger_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES ledger_entries(id),
    account_id UUID NOT NULL REFERENCES accounts(id),
    account_code VARCHAR(30) NOT NULL,
    entry_type VARCHAR(10) NOT NULL,
    amount BIGINT NOT NULL,
    memo TEXT,
    position INTEGER NOT NULL,
    CONSTRAINT chk_ledger_entry_type CHECK (entry_type IN ('debit', 'credit')),
    CONSTRAINT chk_ledger_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_ledger_entries_tenant ON ledger_entries(tenant_id, date);
CREATE INDEX idx_ledger_lines_entry ON ledger_lines(entry_id);
";

const RULES_SQL: &str = r"
CREATE TABLE classification_rules (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    name VARCHAR(200) NOT NULL,
    keywords JSONB NOT NULL,
    direction VARCHAR(10) NOT NULL,
    min_amount BIGINT,
    max_amount BIGINT,
    account_id UUID NOT NULL REFERENCES accounts(id),
    status VARCHAR(20) NOT NULL DEFAULT 'learning',
    times_applied INTEGER NOT NULL DEFAULT 0,
    times_approved INTEGER NOT NULL DEFAULT 0,
    times_rejected INTEGER NOT NULL DEFAULT 0,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rule_direction CHECK (direction IN ('credit', 'debit', 'both')),
    CONSTRAINT chk_rule_counters CHECK (
        times_applied >= 0 AND times_approved >= 0 AND times_rejected >= 0
    )
);

CREATE INDEX idx_rules_tenant ON classification_rules(tenant_id);
";

const HISTORY_SQL: &str = r"
CREATE TABLE classification_history (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    description TEXT NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    direction VARCHAR(10) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_history_direction CHECK (direction IN ('credit', 'debit'))
);

CREATE INDEX idx_history_tenant ON classification_history(tenant_id, created_at DESC);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_append_only_modification
-- Decisions and ledger rows are never updated or deleted
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_append_only_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Table % is append-only', TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_decisions_append_only
BEFORE UPDATE OR DELETE ON approval_decisions
FOR EACH ROW EXECUTE FUNCTION prevent_append_only_modification();

CREATE TRIGGER trg_ledger_entries_append_only
BEFORE UPDATE OR DELETE ON ledger_entries
FOR EACH ROW EXECUTE FUNCTION prevent_append_only_modification();

CREATE TRIGGER trg_ledger_lines_append_only
BEFORE UPDATE OR DELETE ON ledger_lines
FOR EACH ROW EXECUTE FUNCTION prevent_append_only_modification();

-- ============================================================
-- FUNCTION: prevent_approved_modification
-- An approved bank transaction is final
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_approved_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'approved' THEN
        RAISE EXCEPTION 'Cannot modify approved bank transaction %', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_approved_mod
BEFORE UPDATE ON bank_transactions
FOR EACH ROW EXECUTE FUNCTION prevent_approved_modification();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TRIGGER IF EXISTS trg_prevent_approved_mod ON bank_transactions;
DROP TRIGGER IF EXISTS trg_ledger_lines_append_only ON ledger_lines;
DROP TRIGGER IF EXISTS trg_ledger_entries_append_only ON ledger_entries;
DROP TRIGGER IF EXISTS trg_decisions_append_only ON approval_decisions;

DROP FUNCTION IF EXISTS prevent_approved_modification();
DROP FUNCTION IF EXISTS prevent_append_only_modification();

DROP TABLE IF EXISTS classification_history CASCADE;
DROP TABLE IF EXISTS classification_rules CASCADE;
DROP TABLE IF EXISTS ledger_lines CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS approval_decisions CASCADE;
DROP TABLE IF EXISTS split_lines CASCADE;
DROP TABLE IF EXISTS classification_proposals CASCADE;
DROP TABLE IF EXISTS bank_transactions CASCADE;
DROP TABLE IF EXISTS account_requests CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
";
