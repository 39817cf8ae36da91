// src/services/checkout_service.rs
//
// Fechamento de comanda. Tudo roda numa única transação: se qualquer passo
// falhar, nenhuma transação financeira sobrevive e a comanda continua aberta.

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, CommandRepository, FinanceRepository, PaymentRepository},
    models::{
        checkout::{Checkout, CheckoutRequest, CheckoutSummary, FinalizeRequest, FinalizeResponse, PlannedPayment, SettlementPlan},
        command::{Command, CommandItem, CommandSettlement},
        finance::{PaymentRegistration, TransactionType, CATEGORY_SERVICES},
    },
    services::command_service::ensure_open,
};

/// Passos de escrita do fechamento. A implementação real usa a transação
/// aberta; nos testes, uma versão em memória simula falhas.
pub(crate) trait SettlementStore {
    async fn register_payment(&mut self, registration: &PaymentRegistration) -> Result<Uuid, AppError>;
    async fn link_transaction(&mut self, command_id: Uuid, transaction_id: Uuid) -> Result<(), AppError>;
    async fn deduct_stock(&mut self, product_id: Uuid, quantity: Decimal) -> Result<(), AppError>;
    async fn close_command(&mut self, command_id: Uuid, total: Decimal, discount: Decimal) -> Result<Command, AppError>;
}

struct PgSettlementStore<'a> {
    conn: &'a mut PgConnection,
    studio_id: Uuid,
    command_repo: &'a CommandRepository,
    finance_repo: &'a FinanceRepository,
    catalog_repo: &'a CatalogRepository,
}

impl SettlementStore for PgSettlementStore<'_> {
    async fn register_payment(&mut self, registration: &PaymentRegistration) -> Result<Uuid, AppError> {
        self.finance_repo.register_payment(&mut *self.conn, registration).await
    }

    async fn link_transaction(&mut self, command_id: Uuid, transaction_id: Uuid) -> Result<(), AppError> {
        self.command_repo.link_transaction(&mut *self.conn, command_id, transaction_id).await
    }

    async fn deduct_stock(&mut self, product_id: Uuid, quantity: Decimal) -> Result<(), AppError> {
        self.catalog_repo
            .adjust_stock(&mut *self.conn, self.studio_id, product_id, -quantity)
            .await?;
        Ok(())
    }

    async fn close_command(&mut self, command_id: Uuid, total: Decimal, discount: Decimal) -> Result<Command, AppError> {
        self.command_repo
            .close_command(&mut *self.conn, self.studio_id, command_id, total, discount)
            .await
    }
}

/// Dados da transação financeira de um pagamento do plano.
pub fn registration_for(command: &Command, planned: &PlannedPayment) -> PaymentRegistration {
    let entry = &planned.entry;
    let short_id: String = command.id.simple().to_string().chars().take(8).collect();

    let mut description = format!("Comanda #{short_id} - {}", entry.method.as_str());
    if let Some(brand) = &entry.brand {
        description.push_str(&format!(" {brand}"));
    }
    if let Some(installments) = entry.installments.filter(|n| *n > 1) {
        description.push_str(&format!(" {installments}x"));
    }
    if planned.count > 1 {
        description.push_str(&format!(" ({}/{})", planned.position, planned.count));
    }

    PaymentRegistration {
        amount: entry.amount,
        net_amount: entry.net_amount,
        tax_rate: entry.fee_percentage,
        description,
        transaction_type: TransactionType::Income,
        category: CATEGORY_SERVICES.to_string(),
        studio_id: command.studio_id,
        professional_id: command.professional_id,
        client_id: Some(command.client_id),
        payment_method_id: entry.payment_method_id,
    }
}

fn settlement_failure(planned: &PlannedPayment, err: AppError) -> AppError {
    tracing::error!(
        position = planned.position,
        count = planned.count,
        error = ?err,
        "Falha ao registrar pagamento do fechamento"
    );
    AppError::SettlementFailed {
        position: planned.position,
        count: planned.count,
        reason: err.to_string(),
    }
}

/// Grava o plano em ordem: cada pagamento vira uma transação ligada à comanda,
/// os produtos saem do estoque e só então a comanda é fechada.
pub(crate) async fn apply_settlement<S: SettlementStore>(
    store: &mut S,
    command: &Command,
    items: &[CommandItem],
    plan: &SettlementPlan,
) -> Result<(Command, Vec<Uuid>), AppError> {
    let mut transaction_ids = Vec::with_capacity(plan.payments.len());

    for planned in &plan.payments {
        let registration = registration_for(command, planned);

        let transaction_id = store
            .register_payment(&registration)
            .await
            .map_err(|e| settlement_failure(planned, e))?;
        store
            .link_transaction(command.id, transaction_id)
            .await
            .map_err(|e| settlement_failure(planned, e))?;

        transaction_ids.push(transaction_id);
    }

    // Estoque é checado por último e o erro segue como está (INSUFFICIENT_STOCK):
    // não é falha de gravação de pagamento, e a transação desfaz os pagamentos.
    for item in items {
        if let Some(product_id) = item.product_id {
            store.deduct_stock(product_id, item.quantity).await?;
        }
    }

    let closed = store.close_command(command.id, plan.total, plan.discount).await?;
    Ok((closed, transaction_ids))
}

/// Chave já usada: devolve o fechamento gravado sem escrever nada.
/// A mesma chave em outra comanda é conflito.
pub fn replay_settlement(
    previous: Option<CommandSettlement>,
    command: &Command,
) -> Result<Option<FinalizeResponse>, AppError> {
    match previous {
        None => Ok(None),
        Some(previous) if previous.command_id != command.id => {
            Err(AppError::UniqueConstraintViolation("chave de idempotência".into()))
        }
        Some(previous) => Ok(Some(FinalizeResponse {
            command: command.clone(),
            transaction_ids: previous.transaction_ids,
            replayed: true,
        })),
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    command_repo: CommandRepository,
    payment_repo: PaymentRepository,
    finance_repo: FinanceRepository,
    catalog_repo: CatalogRepository,
}

impl CheckoutService {
    pub fn new(
        command_repo: CommandRepository,
        payment_repo: PaymentRepository,
        finance_repo: FinanceRepository,
        catalog_repo: CatalogRepository,
    ) -> Self {
        Self { command_repo, payment_repo, finance_repo, catalog_repo }
    }

    /// Calcula o fechamento sem gravar nada.
    pub async fn preview(
        &self,
        conn: &mut PgConnection,
        studio_id: Uuid,
        command_id: Uuid,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSummary, AppError> {
        let command = self.command_repo.get_command(&mut *conn, studio_id, command_id).await?;
        ensure_open(&command)?;

        let items = self.command_repo.list_items(&mut *conn, command.id).await?;
        let rates = self.payment_repo.list_rates(&mut *conn, studio_id).await?;

        let checkout = Checkout::with_payments(&items, request.discount, &request.payments, &rates)?;
        Ok(checkout.summary())
    }

    pub async fn finalize<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        command_id: Uuid,
        request: &FinalizeRequest,
    ) -> Result<FinalizeResponse, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A trava vem antes da checagem da chave: um segundo pedido concorrente
        // espera aqui e depois enxerga o fechamento já gravado.
        let command = self.command_repo.lock_command(&mut *tx, studio_id, command_id).await?;

        let previous = self.command_repo
            .find_settlement(&mut *tx, studio_id, request.idempotency_key)
            .await?;
        if let Some(replayed) = replay_settlement(previous, &command)? {
            tracing::info!(command_id = %command.id, key = %request.idempotency_key, "Fechamento repetido, devolvendo o original");
            return Ok(replayed);
        }

        ensure_open(&command)?;

        let items = self.command_repo.list_items(&mut *tx, command.id).await?;
        let rates = self.payment_repo.list_rates(&mut *tx, studio_id).await?;
        let plan = Checkout::with_payments(&items, request.discount, &request.payments, &rates)?.settle()?;

        let (closed, transaction_ids) = {
            let mut store = PgSettlementStore {
                conn: &mut *tx,
                studio_id,
                command_repo: &self.command_repo,
                finance_repo: &self.finance_repo,
                catalog_repo: &self.catalog_repo,
            };
            apply_settlement(&mut store, &command, &items, &plan).await?
        };

        self.command_repo
            .record_settlement(&mut *tx, studio_id, request.idempotency_key, closed.id, closed.total_amount, &transaction_ids)
            .await?;

        tx.commit().await?;

        tracing::info!(
            command_id = %closed.id,
            total = %closed.total_amount,
            payments = transaction_ids.len(),
            "Comanda fechada"
        );

        Ok(FinalizeResponse {
            command: closed,
            transaction_ids,
            replayed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::error::ErrorKind,
        models::{
            checkout::PaymentInput,
            command::CommandStatus,
            payment::{PaymentMethodKind, PaymentRate},
        },
    };
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Loja em memória: grava o que recebe e falha no pagamento `fail_on` (1-based).
    struct FakeStore {
        command: Command,
        fail_on: Option<usize>,
        registered: Vec<PaymentRegistration>,
        links: Vec<(Uuid, Uuid)>,
        stock: Vec<(Uuid, Decimal)>,
        out_of_stock: Option<Uuid>,
        closed: bool,
    }

    impl FakeStore {
        fn new(command: &Command, fail_on: Option<usize>) -> Self {
            Self {
                command: command.clone(),
                fail_on,
                registered: Vec::new(),
                links: Vec::new(),
                stock: Vec::new(),
                out_of_stock: None,
                closed: false,
            }
        }
    }

    impl SettlementStore for FakeStore {
        async fn register_payment(&mut self, registration: &PaymentRegistration) -> Result<Uuid, AppError> {
            if self.fail_on == Some(self.registered.len() + 1) {
                return Err(AppError::DatabaseError(sqlx::Error::Protocol("conexão perdida".into())));
            }
            self.registered.push(registration.clone());
            Ok(Uuid::new_v4())
        }

        async fn link_transaction(&mut self, command_id: Uuid, transaction_id: Uuid) -> Result<(), AppError> {
            self.links.push((command_id, transaction_id));
            Ok(())
        }

        async fn deduct_stock(&mut self, product_id: Uuid, quantity: Decimal) -> Result<(), AppError> {
            if self.out_of_stock == Some(product_id) {
                return Err(AppError::InsufficientStock(product_id));
            }
            self.stock.push((product_id, quantity));
            Ok(())
        }

        async fn close_command(&mut self, _command_id: Uuid, total: Decimal, discount: Decimal) -> Result<Command, AppError> {
            self.closed = true;
            Ok(Command {
                status: CommandStatus::Paid,
                total_amount: total,
                discount_amount: discount,
                closed_at: Some(Utc::now()),
                ..self.command.clone()
            })
        }
    }

    fn open_command() -> Command {
        Command {
            id: Uuid::new_v4(),
            studio_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            professional_id: Some(Uuid::new_v4()),
            appointment_id: None,
            status: CommandStatus::Open,
            total_amount: dec("150.00"),
            discount_amount: Decimal::ZERO,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    fn item(command: &Command, price: &str, qty: &str, product_id: Option<Uuid>) -> CommandItem {
        CommandItem {
            id: Uuid::new_v4(),
            command_id: command.id,
            title: "Item".into(),
            unit_price: dec(price),
            quantity: dec(qty),
            product_id,
            service_id: None,
            professional_id: None,
            created_at: Utc::now(),
        }
    }

    fn visa_credit() -> Vec<PaymentRate> {
        vec![PaymentRate {
            id: Uuid::new_v4(),
            studio_id: Uuid::nil(),
            payment_method_id: Uuid::new_v4(),
            kind: PaymentMethodKind::CartaoCredito,
            brand: Some("visa".into()),
            installments: Some(1),
            fee_percentage: dec("3.5"),
            created_at: Utc::now(),
        }]
    }

    fn three_way_split(command: &Command) -> (Vec<CommandItem>, SettlementPlan) {
        let items = vec![item(command, "150.00", "1", None)];
        let inputs = vec![
            PaymentInput { method: PaymentMethodKind::Pix, amount: dec("50.00"), brand: None, installments: None },
            PaymentInput { method: PaymentMethodKind::Dinheiro, amount: dec("50.00"), brand: None, installments: None },
            PaymentInput {
                method: PaymentMethodKind::CartaoCredito,
                amount: dec("50.00"),
                brand: Some("Visa".into()),
                installments: Some(1),
            },
        ];
        let plan = Checkout::with_payments(&items, Decimal::ZERO, &inputs, &visa_credit())
            .unwrap()
            .settle()
            .unwrap();
        (items, plan)
    }

    #[tokio::test]
    async fn failure_on_second_of_three_payments_keeps_command_open() {
        let command = open_command();
        let (items, plan) = three_way_split(&command);
        let mut store = FakeStore::new(&command, Some(2));

        let result = apply_settlement(&mut store, &command, &items, &plan).await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::SettlementFailed { position: 2, count: 3, .. }));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_ne!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), "SETTLEMENT_FAILED");

        assert!(!store.closed, "a comanda não pode ser fechada");
        assert_eq!(store.registered.len(), 1);
        assert_eq!(store.links.len(), 1);
    }

    #[tokio::test]
    async fn successful_settlement_registers_every_payment_in_order() {
        let command = open_command();
        let (items, plan) = three_way_split(&command);
        let mut store = FakeStore::new(&command, None);

        let (closed, ids) = apply_settlement(&mut store, &command, &items, &plan).await.unwrap();

        assert_eq!(ids.len(), 3);
        assert!(store.closed);
        assert_eq!(closed.status, CommandStatus::Paid);
        assert_eq!(closed.total_amount, dec("150.00"));
        assert!(closed.closed_at.is_some());

        let card = &store.registered[2];
        assert_eq!(card.amount, dec("50.00"));
        assert_eq!(card.tax_rate, dec("3.5"));
        assert_eq!(card.net_amount, dec("48.25"));
        assert_eq!(card.professional_id, command.professional_id);
        assert_eq!(card.client_id, Some(command.client_id));
        assert_eq!(card.transaction_type, TransactionType::Income);
        assert!(card.description.ends_with("(3/3)"));

        let linked: Vec<Uuid> = store.links.iter().map(|(_, t)| *t).collect();
        assert_eq!(linked, ids);
    }

    #[tokio::test]
    async fn product_items_leave_stock() {
        let command = open_command();
        let product_id = Uuid::new_v4();
        let items = vec![
            item(&command, "100.00", "1", None),
            item(&command, "25.00", "2", Some(product_id)),
        ];
        let inputs = vec![PaymentInput { method: PaymentMethodKind::Pix, amount: dec("150.00"), brand: None, installments: None }];
        let plan = Checkout::with_payments(&items, Decimal::ZERO, &inputs, &[]).unwrap().settle().unwrap();
        let mut store = FakeStore::new(&command, None);

        apply_settlement(&mut store, &command, &items, &plan).await.unwrap();

        assert_eq!(store.stock, vec![(product_id, dec("2"))]);
    }

    #[tokio::test]
    async fn missing_stock_aborts_after_payments_without_closing() {
        let command = open_command();
        let product_id = Uuid::new_v4();
        let items = vec![item(&command, "25.00", "2", Some(product_id))];
        let inputs = vec![PaymentInput { method: PaymentMethodKind::Pix, amount: dec("50.00"), brand: None, installments: None }];
        let plan = Checkout::with_payments(&items, Decimal::ZERO, &inputs, &[]).unwrap().settle().unwrap();
        let mut store = FakeStore::new(&command, None);
        store.out_of_stock = Some(product_id);

        let err = apply_settlement(&mut store, &command, &items, &plan).await.unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock(id) if id == product_id));
        assert_eq!(err.code(), "INSUFFICIENT_STOCK");
        assert!(!store.closed);
    }

    fn settlement(command_id: Uuid, transaction_ids: Vec<Uuid>) -> CommandSettlement {
        CommandSettlement {
            studio_id: Uuid::nil(),
            idempotency_key: Uuid::new_v4(),
            command_id,
            total_amount: dec("150.00"),
            transaction_ids,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unused_key_proceeds_with_settlement() {
        let command = open_command();
        assert!(replay_settlement(None, &command).unwrap().is_none());
    }

    #[test]
    fn repeated_key_returns_original_transactions() {
        let command = Command { status: CommandStatus::Paid, ..open_command() };
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];

        let response = replay_settlement(Some(settlement(command.id, ids.clone())), &command)
            .unwrap()
            .expect("fechamento repetido");

        assert!(response.replayed);
        assert_eq!(response.transaction_ids, ids);
        assert_eq!(response.command.id, command.id);
        assert_eq!(response.command.status, CommandStatus::Paid);
    }

    #[test]
    fn key_from_another_command_is_a_conflict() {
        let command = open_command();
        let other = settlement(Uuid::new_v4(), vec![Uuid::new_v4()]);

        let err = replay_settlement(Some(other), &command).unwrap_err();

        assert_eq!(err.code(), "UNIQUE_VIOLATION");
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn fully_discounted_command_closes_without_transactions() {
        let command = open_command();
        let items = vec![item(&command, "50.00", "1", None)];
        let plan = Checkout::for_items(&items, dec("50.00")).unwrap().settle().unwrap();
        let mut store = FakeStore::new(&command, None);

        let (closed, ids) = apply_settlement(&mut store, &command, &items, &plan).await.unwrap();

        assert!(ids.is_empty());
        assert!(store.registered.is_empty());
        assert_eq!(closed.total_amount, Decimal::ZERO);
        assert_eq!(closed.discount_amount, dec("50.00"));
    }

    #[test]
    fn registration_describes_the_payment() {
        let command = open_command();
        let (_, plan) = three_way_split(&command);
        let reg = registration_for(&command, &plan.payments[0]);
        assert!(reg.description.starts_with("Comanda #"));
        assert!(reg.description.contains("pix"));
        assert_eq!(reg.category, CATEGORY_SERVICES);
        assert_eq!(reg.payment_method_id, None);
    }
}
