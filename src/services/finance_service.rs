// src/services/finance_service.rs

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, money::quantize2},
    db::{FinanceRepository, InventoryRepository, SalesRepository},
    models::finance::{
        AccountBalance, CashbookLine, DocumentKind, DocumentStatus, EntryDisplayStatus,
        ExpenseCategory, FinanceAccount, FinanceDocument, LedgerEntry, LedgerEntryView,
        OriginKind, PaymentMethod,
    },
};

// ---
// Payload: criação manual de documento (CR/CP) com parcelas
// ---
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub kind: DocumentKind,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    pub total_amount: Decimal,

    // Coagido para 1 quando <= 0 (leniência herdada do fluxo manual)
    #[serde(default = "default_installments")]
    pub installments: i32,

    // Se ausente, vence hoje
    pub first_due_date: Option<NaiveDate>,

    #[serde(default = "default_interval_days")]
    pub interval_days: i64,

    pub customer_id: Option<Uuid>,     // CR
    pub supplier_name: Option<String>, // CP
    pub payment_method: Option<String>,
    pub expense_category_id: Option<Uuid>,
    pub expense_category_parent_id: Option<Uuid>,
}

fn default_installments() -> i32 {
    1
}

fn default_interval_days() -> i64 {
    30
}

// ---
// Regras puras de parcelamento e status
// ---

/// Rateio do total em N parcelas: cada parcela é total/N arredondado a
/// 2 casas (meio-para-cima); o resíduo do arredondamento vai para a
/// ÚLTIMA parcela, de modo que a soma sempre fecha com o total.
/// Vencimentos: primeiro vencimento + i x intervalo.
pub(crate) fn installment_schedule(
    total_amount: Decimal,
    installments: i32,
    first_due_date: NaiveDate,
    interval_days: i64,
) -> Vec<(Decimal, NaiveDate)> {
    let count = installments.max(1);
    let interval = if interval_days <= 0 { 30 } else { interval_days };

    let total = quantize2(total_amount);
    let base = quantize2(total / Decimal::from(count));

    let mut schedule = Vec::with_capacity(count as usize);
    let mut due_date = first_due_date;
    for i in 0..count {
        let amount = if i == count - 1 {
            total - base * Decimal::from(count - 1)
        } else {
            base
        };
        schedule.push((amount, due_date));
        due_date = due_date + Duration::days(interval);
    }
    schedule
}

/// Status agregado do documento: paid sse todas as parcelas pagas;
/// partial se alguma (mas não todas); open caso contrário.
/// `canceled` nunca é derivado aqui (é um estado manual).
pub(crate) fn derive_document_status(total_entries: i64, paid_entries: i64) -> DocumentStatus {
    if total_entries > 0 && paid_entries == total_entries {
        DocumentStatus::Paid
    } else if paid_entries > 0 {
        DocumentStatus::Partial
    } else {
        DocumentStatus::Open
    }
}

pub(crate) fn display_status(entry: &LedgerEntry, today: NaiveDate) -> EntryDisplayStatus {
    if entry.paid_on.is_some() {
        EntryDisplayStatus::Paid
    } else if entry.due_date < today {
        EntryDisplayStatus::Overdue
    } else if entry.due_date == today {
        EntryDisplayStatus::DueToday
    } else {
        EntryDisplayStatus::Open
    }
}

fn sort_rank(status: EntryDisplayStatus) -> u8 {
    match status {
        EntryDisplayStatus::Overdue => 0,
        EntryDisplayStatus::DueToday => 1,
        EntryDisplayStatus::Open => 2,
        EntryDisplayStatus::Paid => 3,
    }
}

/// Ordena para exibição: vencidas, vencendo hoje, a vencer, pagas;
/// empate por vencimento e id dentro de cada grupo.
pub(crate) fn annotate_and_sort(entries: Vec<LedgerEntry>, today: NaiveDate) -> Vec<LedgerEntryView> {
    let mut views: Vec<LedgerEntryView> = entries
        .into_iter()
        .map(|entry| {
            let status = display_status(&entry, today);
            LedgerEntryView { entry, status }
        })
        .collect();
    views.sort_by_key(|v| (sort_rank(v.status), v.entry.due_date, v.entry.id));
    views
}

// ---
// Serviço
// ---

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    sales_repo: SalesRepository,
    inventory_repo: InventoryRepository,
    pool: PgPool,
}

impl FinanceService {
    pub fn new(
        repo: FinanceRepository,
        sales_repo: SalesRepository,
        inventory_repo: InventoryRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            sales_repo,
            inventory_repo,
            pool,
        }
    }

    /// Cria um documento financeiro e gera as parcelas associadas, tudo na
    /// mesma transação: ou o documento sai completo, ou nada é gravado.
    pub async fn create_document(&self, input: NewDocument) -> Result<FinanceDocument, AppError> {
        input.validate()?;

        // Cliente só faz sentido em CR; fornecedor, em CP.
        let customer_id = match input.kind {
            DocumentKind::Receivable => input.customer_id,
            DocumentKind::Payable => None,
        };
        let supplier_name = match input.kind {
            DocumentKind::Payable => input.supplier_name.as_deref(),
            DocumentKind::Receivable => None,
        };

        let first_due = input
            .first_due_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let schedule =
            installment_schedule(input.total_amount, input.installments, first_due, input.interval_days);

        let mut tx = self.pool.begin().await?;

        let document = self
            .repo
            .create_document(
                &mut *tx,
                input.kind,
                &input.description,
                quantize2(input.total_amount),
                customer_id,
                supplier_name,
                None,
            )
            .await?;

        let count = schedule.len();
        for (i, (amount, due_date)) in schedule.iter().enumerate() {
            let description = format!("{} ({}/{})", input.description, i + 1, count);
            self.repo
                .create_entry(
                    &mut *tx,
                    Some(document.id),
                    customer_id,
                    input.kind,
                    &description,
                    *amount,
                    *due_date,
                    input.payment_method.as_deref(),
                    input.expense_category_id,
                    input.expense_category_parent_id,
                )
                .await?;
        }

        tx.commit().await?;
        Ok(document)
    }

    /// Gera o documento CR (com parcelas) a partir de um pedido de venda.
    /// O total é o líquido do pedido; o documento fica vinculado à origem.
    /// Recusa com `DuplicateOrigin` se o pedido já tem CR gerado.
    pub async fn generate_receivable_from_order(
        &self,
        order_id: Uuid,
        installments: i32,
        first_due_date: Option<NaiveDate>,
        interval_days: i64,
        payment_method: Option<&str>,
    ) -> Result<FinanceDocument, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .sales_repo
            .get_order_summary(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if self
            .repo
            .has_document_for_origin(&mut *tx, OriginKind::SalesOrder, order_id, DocumentKind::Receivable)
            .await?
        {
            return Err(AppError::DuplicateOrigin);
        }

        let description = format!("Pedido #{} - {}", order.display_id, order.customer_name);

        let document = self
            .repo
            .create_document(
                &mut *tx,
                DocumentKind::Receivable,
                &description,
                order.net_total,
                Some(order.customer_id),
                None,
                Some((OriginKind::SalesOrder, order_id)),
            )
            .await?;

        let first_due = first_due_date.unwrap_or_else(|| Utc::now().date_naive());
        let schedule = installment_schedule(order.net_total, installments, first_due, interval_days);
        let count = schedule.len();
        for (i, (amount, due_date)) in schedule.iter().enumerate() {
            self.repo
                .create_entry(
                    &mut *tx,
                    Some(document.id),
                    Some(order.customer_id),
                    DocumentKind::Receivable,
                    &format!("{} ({}/{})", description, i + 1, count),
                    *amount,
                    *due_date,
                    payment_method,
                    None,
                    None,
                )
                .await?;
        }

        tx.commit().await?;
        Ok(document)
    }

    /// Gera o documento CP (com parcelas) a partir de uma entrada de estoque.
    /// O total é quantidade x custo unitário da movimentação.
    pub async fn generate_payable_from_stock_entry(
        &self,
        movement_id: Uuid,
        installments: i32,
        first_due_date: Option<NaiveDate>,
        interval_days: i64,
        supplier_name: Option<&str>,
        expense_category_id: Option<Uuid>,
        expense_category_parent_id: Option<Uuid>,
    ) -> Result<FinanceDocument, AppError> {
        let mut tx = self.pool.begin().await?;

        let movement = self
            .inventory_repo
            .get_movement_summary(&mut *tx, movement_id)
            .await?
            .ok_or(AppError::MovementNotFound)?;

        if self
            .repo
            .has_document_for_origin(&mut *tx, OriginKind::StockMovement, movement_id, DocumentKind::Payable)
            .await?
        {
            return Err(AppError::DuplicateOrigin);
        }

        let description = format!("Entrada de estoque - {}", movement.product_name);

        let document = self
            .repo
            .create_document(
                &mut *tx,
                DocumentKind::Payable,
                &description,
                movement.total_cost,
                None,
                supplier_name,
                Some((OriginKind::StockMovement, movement_id)),
            )
            .await?;

        let first_due = first_due_date.unwrap_or_else(|| Utc::now().date_naive());
        let schedule =
            installment_schedule(movement.total_cost, installments, first_due, interval_days);
        let count = schedule.len();
        for (i, (amount, due_date)) in schedule.iter().enumerate() {
            self.repo
                .create_entry(
                    &mut *tx,
                    Some(document.id),
                    None,
                    DocumentKind::Payable,
                    &format!("{} ({}/{})", description, i + 1, count),
                    *amount,
                    *due_date,
                    None,
                    expense_category_id,
                    expense_category_parent_id,
                )
                .await?;
        }

        tx.commit().await?;
        Ok(document)
    }

    pub async fn has_document_for_origin(
        &self,
        origin_kind: OriginKind,
        origin_id: Uuid,
        kind: DocumentKind,
    ) -> Result<bool, AppError> {
        self.repo
            .has_document_for_origin(&self.pool, origin_kind, origin_id, kind)
            .await
    }

    /// Baixa de uma parcela (CR/CP).
    ///
    /// - Seta `paid_on` com a data informada.
    /// - Preenche `payment_method` com o NOME da conta escolhida (o extrato
    ///   casa pelo nome); sem conta, vale o rótulo informado.
    /// - Rebaixar uma parcela já paga sobrescreve os dados de pagamento
    ///   (re-baixa idempotente, sem erro).
    /// - Atualiza o status do documento (open/partial/paid) apenas se mudou;
    ///   documentos cancelados não são reavaliados.
    ///
    /// Devolve `false` quando a parcela não existe.
    pub async fn settle_installment(
        &self,
        entry_id: Uuid,
        paid_on: NaiveDate,
        payment_method: Option<&str>,
        account_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let account_name = match account_id {
            Some(id) => self.repo.get_account(&mut *tx, id).await?.map(|a| a.name),
            None => None,
        };
        let label = account_name.as_deref().or(payment_method);

        let entry = match self.repo.settle_entry(&mut *tx, entry_id, paid_on, label).await? {
            Some(entry) => entry,
            None => return Ok(false),
        };

        if let Some(document_id) = entry.document_id {
            let document = self
                .repo
                .get_document(&mut *tx, document_id)
                .await?
                .ok_or(AppError::DocumentNotFound)?;

            if document.status != DocumentStatus::Canceled {
                let (total, paid) = self.repo.settlement_counts(&mut *tx, document_id).await?;
                let new_status = derive_document_status(total, paid);
                if document.status != new_status {
                    self.repo
                        .update_document_status(&mut *tx, document_id, new_status)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Lista as parcelas de um tipo (CR/CP) com status de exibição derivado,
    /// ordenadas: vencidas, vencendo hoje, a vencer, pagas.
    pub async fn list_entries(&self, kind: DocumentKind) -> Result<Vec<LedgerEntryView>, AppError> {
        let entries = self.repo.list_entries_by_kind(kind).await?;
        let today = Utc::now().date_naive();
        Ok(annotate_and_sort(entries, today))
    }

    // --- CATEGORIAS DE DESPESA ---

    /// Cria categoria de despesa. A árvore é estrita de dois níveis:
    /// o pai, quando informado, precisa ser uma categoria raiz.
    pub async fn create_expense_category(
        &self,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<ExpenseCategory, AppError> {
        if let Some(parent_id) = parent_id {
            let parent = self
                .repo
                .get_expense_category(&self.pool, parent_id)
                .await?
                .ok_or(AppError::CategoryNotFound)?;
            if parent.parent_id.is_some() {
                return Err(AppError::CategoryParentNotRoot);
            }
        }
        self.repo
            .create_expense_category(&self.pool, name, parent_id)
            .await
    }

    pub async fn list_expense_categories(&self) -> Result<Vec<ExpenseCategory>, AppError> {
        self.repo.list_expense_categories().await
    }

    // --- CONTAS E MEIOS DE PAGAMENTO ---

    pub async fn create_account(&self, name: &str, kind: &str) -> Result<FinanceAccount, AppError> {
        self.repo.create_account(&self.pool, name, kind).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<FinanceAccount>, AppError> {
        self.repo.list_accounts().await
    }

    pub async fn create_payment_method(
        &self,
        name: &str,
        kind: &str,
    ) -> Result<PaymentMethod, AppError> {
        self.repo.create_payment_method(&self.pool, name, kind).await
    }

    pub async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
        self.repo.list_payment_methods().await
    }

    /// Totais de uma conta: entradas (CR pagas), saídas (CP pagas) e saldo.
    pub async fn account_balance(&self, account_id: Uuid) -> Result<AccountBalance, AppError> {
        let account = self
            .repo
            .get_account(&self.pool, account_id)
            .await?
            .ok_or(AppError::AccountNotFound)?;

        let (total_in, total_out) = self.repo.paid_totals_for_method(&account.name).await?;
        Ok(AccountBalance {
            total_in,
            total_out,
            balance: total_in - total_out,
        })
    }

    /// Extrato de caixa: somente parcelas pagas, por conta e período,
    /// ordenadas pela data de pagamento.
    pub async fn list_cashbook(
        &self,
        account_id: Option<Uuid>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CashbookLine>, AppError> {
        let accounts = self.repo.list_accounts().await?;

        let account_name = match account_id {
            Some(id) => Some(
                accounts
                    .iter()
                    .find(|a| a.id == id)
                    .map(|a| a.name.clone())
                    .ok_or(AppError::AccountNotFound)?,
            ),
            None => None,
        };

        let entries = self
            .repo
            .list_paid_entries(account_name.as_deref(), start, end)
            .await?;

        let lines = entries
            .into_iter()
            .filter_map(|entry| {
                let date = entry.paid_on?;
                let account_id = entry
                    .payment_method
                    .as_deref()
                    .and_then(|method| accounts.iter().find(|a| a.name == method))
                    .map(|a| a.id);
                Some(CashbookLine {
                    date,
                    account_id,
                    kind: entry.kind,
                    description: entry.description,
                    amount: entry.amount,
                })
            })
            .collect();

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(id: u128, due_date: NaiveDate, paid_on: Option<NaiveDate>) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::from_u128(id),
            document_id: None,
            customer_id: None,
            kind: DocumentKind::Receivable,
            description: format!("Parcela {}", id),
            amount: dec("10.00"),
            due_date,
            paid_on,
            payment_method: None,
            expense_category_id: None,
            expense_category_parent_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn schedule_collects_rounding_remainder_in_last_installment() {
        let schedule = installment_schedule(dec("100.00"), 3, date("2024-01-01"), 30);

        let amounts: Vec<Decimal> = schedule.iter().map(|(a, _)| *a).collect();
        assert_eq!(amounts, vec![dec("33.33"), dec("33.33"), dec("33.34")]);

        let dates: Vec<NaiveDate> = schedule.iter().map(|(_, d)| *d).collect();
        assert_eq!(
            dates,
            vec![date("2024-01-01"), date("2024-01-31"), date("2024-03-01")]
        );

        let sum: Decimal = amounts.iter().sum();
        assert_eq!(sum, dec("100.00"));
    }

    #[test]
    fn schedule_with_exact_division_has_equal_installments() {
        let schedule = installment_schedule(dec("90.00"), 3, date("2024-06-10"), 15);
        for (amount, _) in &schedule {
            assert_eq!(*amount, dec("30.00"));
        }
        assert_eq!(schedule[2].1, date("2024-07-10"));
    }

    #[test]
    fn schedule_sum_always_matches_total() {
        for (total, count) in [("0.01", 3), ("99.99", 7), ("1000.00", 12), ("0.10", 4)] {
            let schedule = installment_schedule(dec(total), count, date("2024-01-01"), 30);
            let sum: Decimal = schedule.iter().map(|(a, _)| *a).sum();
            assert_eq!(sum, dec(total), "total {} em {} parcelas", total, count);
            assert_eq!(schedule.len(), count as usize);
        }
    }

    #[test]
    fn schedule_clamps_nonpositive_count_to_one() {
        let schedule = installment_schedule(dec("50.00"), 0, date("2024-01-01"), 30);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].0, dec("50.00"));

        let schedule = installment_schedule(dec("50.00"), -3, date("2024-01-01"), 30);
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn schedule_defaults_nonpositive_interval_to_thirty_days() {
        let schedule = installment_schedule(dec("20.00"), 2, date("2024-01-01"), 0);
        assert_eq!(schedule[1].1, date("2024-01-31"));
    }

    #[test]
    fn document_status_follows_settled_installments() {
        // open -> partial -> paid conforme as baixas avançam
        assert_eq!(derive_document_status(3, 0), DocumentStatus::Open);
        assert_eq!(derive_document_status(3, 1), DocumentStatus::Partial);
        assert_eq!(derive_document_status(3, 2), DocumentStatus::Partial);
        assert_eq!(derive_document_status(3, 3), DocumentStatus::Paid);
        assert_eq!(derive_document_status(0, 0), DocumentStatus::Open);
    }

    #[test]
    fn display_status_is_relative_to_today() {
        let today = date("2024-05-15");

        let paid = entry(1, date("2024-01-01"), Some(date("2024-01-05")));
        assert_eq!(display_status(&paid, today), EntryDisplayStatus::Paid);

        let overdue = entry(2, date("2024-05-14"), None);
        assert_eq!(display_status(&overdue, today), EntryDisplayStatus::Overdue);

        let due_today = entry(3, date("2024-05-15"), None);
        assert_eq!(display_status(&due_today, today), EntryDisplayStatus::DueToday);

        let open = entry(4, date("2024-05-16"), None);
        assert_eq!(display_status(&open, today), EntryDisplayStatus::Open);
    }

    #[test]
    fn listing_orders_overdue_due_today_open_paid() {
        let today = date("2024-05-15");
        let entries = vec![
            entry(1, date("2024-01-01"), Some(date("2024-01-05"))), // paga
            entry(2, date("2024-06-01"), None),                     // a vencer
            entry(3, date("2024-05-15"), None),                     // vence hoje
            entry(4, date("2024-05-01"), None),                     // vencida
            entry(5, date("2024-04-01"), None),                     // vencida (mais antiga)
        ];

        let views = annotate_and_sort(entries, today);
        let statuses: Vec<EntryDisplayStatus> = views.iter().map(|v| v.status).collect();
        assert_eq!(
            statuses,
            vec![
                EntryDisplayStatus::Overdue,
                EntryDisplayStatus::Overdue,
                EntryDisplayStatus::DueToday,
                EntryDisplayStatus::Open,
                EntryDisplayStatus::Paid,
            ]
        );

        // Dentro de "vencidas", vencimento mais antigo primeiro
        assert_eq!(views[0].entry.due_date, date("2024-04-01"));
        assert_eq!(views[1].entry.due_date, date("2024-05-01"));
    }

    #[test]
    fn listing_breaks_ties_by_id() {
        let today = date("2024-05-15");
        let due = date("2024-05-01");
        let entries = vec![entry(9, due, None), entry(2, due, None), entry(5, due, None)];

        let views = annotate_and_sort(entries, today);
        let ids: Vec<Uuid> = views.iter().map(|v| v.entry.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(2), Uuid::from_u128(5), Uuid::from_u128(9)]
        );
    }
}
