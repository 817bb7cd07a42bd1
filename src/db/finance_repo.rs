// src/db/finance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{
        DocumentKind, DocumentStatus, ExpenseCategory, FinanceAccount, FinanceDocument,
        LedgerEntry, OriginKind, PaymentMethod,
    },
};

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  DOCUMENTOS (Contas a Pagar / Receber)
    // =========================================================================

    pub async fn create_document<'e, E>(
        &self,
        executor: E,
        kind: DocumentKind,
        description: &str,
        total_amount: Decimal,
        customer_id: Option<Uuid>,
        supplier_name: Option<&str>,
        origin: Option<(OriginKind, Uuid)>,
    ) -> Result<FinanceDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (origin_kind, origin_id) = match origin {
            Some((k, id)) => (Some(k), Some(id)),
            None => (None, None),
        };

        sqlx::query_as::<_, FinanceDocument>(
            r#"
            INSERT INTO finance_documents (
                kind, description, total_amount,
                customer_id, supplier_name,
                origin_kind, origin_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(description)
        .bind(total_amount)
        .bind(customer_id)
        .bind(supplier_name)
        .bind(origin_kind)
        .bind(origin_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // O índice único de (origin_kind, origin_id, kind) fecha a janela
            // entre o pré-cheque e a inserção.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateOrigin;
                }
            }
            e.into()
        })
    }

    pub async fn get_document<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
    ) -> Result<Option<FinanceDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document =
            sqlx::query_as::<_, FinanceDocument>("SELECT * FROM finance_documents WHERE id = $1")
                .bind(document_id)
                .fetch_optional(executor)
                .await?;
        Ok(document)
    }

    pub async fn has_document_for_origin<'e, E>(
        &self,
        executor: E,
        origin_kind: OriginKind,
        origin_id: Uuid,
        kind: DocumentKind,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM finance_documents
                WHERE origin_kind = $1 AND origin_id = $2 AND kind = $3
            )
            "#,
        )
        .bind(origin_kind)
        .bind(origin_id)
        .bind(kind)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn update_document_status<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
        status: DocumentStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE finance_documents SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(document_id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  LANÇAMENTOS (Parcelas)
    // =========================================================================

    pub async fn create_entry<'e, E>(
        &self,
        executor: E,
        document_id: Option<Uuid>,
        customer_id: Option<Uuid>,
        kind: DocumentKind,
        description: &str,
        amount: Decimal,
        due_date: NaiveDate,
        payment_method: Option<&str>,
        expense_category_id: Option<Uuid>,
        expense_category_parent_id: Option<Uuid>,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (
                document_id, customer_id, kind, description,
                amount, due_date, payment_method,
                expense_category_id, expense_category_parent_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(document_id)
        .bind(customer_id)
        .bind(kind)
        .bind(description)
        .bind(amount)
        .bind(due_date)
        .bind(payment_method)
        .bind(expense_category_id)
        .bind(expense_category_parent_id)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    pub async fn get_entry<'e, E>(
        &self,
        executor: E,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LedgerEntry>("SELECT * FROM ledger_entries WHERE id = $1")
            .bind(entry_id)
            .fetch_optional(executor)
            .await?;
        Ok(entry)
    }

    /// Baixa da parcela: data de pagamento + rótulo do meio/conta.
    /// Rebaixar uma parcela já paga sobrescreve os dados anteriores.
    pub async fn settle_entry<'e, E>(
        &self,
        executor: E,
        entry_id: Uuid,
        paid_on: NaiveDate,
        payment_method: Option<&str>,
    ) -> Result<Option<LedgerEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            UPDATE ledger_entries
            SET paid_on = $2, payment_method = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(entry_id)
        .bind(paid_on)
        .bind(payment_method)
        .fetch_optional(executor)
        .await?;
        Ok(entry)
    }

    /// (total de parcelas, parcelas pagas) de um documento.
    pub async fn settlement_counts<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
    ) -> Result<(i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COUNT(paid_on)
            FROM ledger_entries
            WHERE document_id = $1
            "#,
        )
        .bind(document_id)
        .fetch_one(executor)
        .await?;
        Ok(counts)
    }

    /// Parcelas de um tipo (CR/CP). A ordenação final por status de exibição
    /// é feita no serviço; aqui só garantimos o desempate estável.
    pub async fn list_entries_by_kind(
        &self,
        kind: DocumentKind,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            "SELECT * FROM ledger_entries WHERE kind = $1 ORDER BY due_date ASC, id ASC",
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Parcelas pagas, filtradas por conta (nome) e período — base do extrato.
    pub async fn list_paid_entries(
        &self,
        payment_method: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE paid_on IS NOT NULL
              AND ($1::TEXT IS NULL OR payment_method = $1)
              AND ($2::DATE IS NULL OR paid_on >= $2)
              AND ($3::DATE IS NULL OR paid_on <= $3)
            ORDER BY paid_on ASC, id ASC
            "#,
        )
        .bind(payment_method)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Totais pagos casados pelo NOME da conta em `payment_method`:
    /// (entradas CR, saídas CP).
    pub async fn paid_totals_for_method(
        &self,
        payment_method: &str,
    ) -> Result<(Decimal, Decimal), AppError> {
        let totals = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE kind = $2), 0)::NUMERIC(14, 2),
                COALESCE(SUM(amount) FILTER (WHERE kind = $3), 0)::NUMERIC(14, 2)
            FROM ledger_entries
            WHERE payment_method = $1 AND paid_on IS NOT NULL
            "#,
        )
        .bind(payment_method)
        .bind(DocumentKind::Receivable)
        .bind(DocumentKind::Payable)
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    // =========================================================================
    //  CATEGORIAS DE DESPESA (árvore de dois níveis)
    // =========================================================================

    pub async fn create_expense_category<'e, E>(
        &self,
        executor: E,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<ExpenseCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ExpenseCategory>(
            r#"
            INSERT INTO expense_categories (name, parent_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(parent_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::CategoryNameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn get_expense_category<'e, E>(
        &self,
        executor: E,
        category_id: Uuid,
    ) -> Result<Option<ExpenseCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category =
            sqlx::query_as::<_, ExpenseCategory>("SELECT * FROM expense_categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(executor)
                .await?;
        Ok(category)
    }

    pub async fn list_expense_categories(&self) -> Result<Vec<ExpenseCategory>, AppError> {
        let categories = sqlx::query_as::<_, ExpenseCategory>(
            "SELECT * FROM expense_categories ORDER BY parent_id NULLS FIRST, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    // =========================================================================
    //  CONTAS (Caixa) E MEIOS DE PAGAMENTO
    // =========================================================================

    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        name: &str,
        kind: &str,
    ) -> Result<FinanceAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, FinanceAccount>(
            r#"
            INSERT INTO finance_accounts (name, kind)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(kind)
        .fetch_one(executor)
        .await?;
        Ok(account)
    }

    pub async fn get_account<'e, E>(
        &self,
        executor: E,
        account_id: Uuid,
    ) -> Result<Option<FinanceAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account =
            sqlx::query_as::<_, FinanceAccount>("SELECT * FROM finance_accounts WHERE id = $1")
                .bind(account_id)
                .fetch_optional(executor)
                .await?;
        Ok(account)
    }

    pub async fn list_accounts(&self) -> Result<Vec<FinanceAccount>, AppError> {
        let accounts = sqlx::query_as::<_, FinanceAccount>(
            "SELECT * FROM finance_accounts WHERE is_active ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    pub async fn create_payment_method<'e, E>(
        &self,
        executor: E,
        name: &str,
        kind: &str,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let method = sqlx::query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_methods (name, kind)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(kind)
        .fetch_one(executor)
        .await?;
        Ok(method)
    }

    pub async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT * FROM payment_methods WHERE is_active ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(methods)
    }
}
