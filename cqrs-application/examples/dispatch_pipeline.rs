//! 运行：`RUST_LOG=debug cargo run -p cqrs-application --example dispatch_pipeline`
use async_trait::async_trait;
use cqrs_application::command_bus::CommandBus;
use cqrs_application::command_handler::CommandHandler;
use cqrs_application::context::AppContext;
use cqrs_application::dto::Dto;
use cqrs_application::error::{AppError, AppResult};
use cqrs_application::query_bus::QueryBus;
use cqrs_application::query_handler::QueryHandler;
use cqrs_application::services::PipelineServices;
use cqrs_application::unit_of_work::UnitOfWork;
use cqrs_application::{InMemoryCommandBus, InMemoryQueryBus};
use cqrs_domain::domain_event::{BusinessContext, EventEnvelope};
use cqrs_domain::eventing::{
    DispatchMode, EventDispatchConfig, EventDispatchEngine, EventHandler, SubscriptionRegistry,
};
use cqrs_macros::{Command, DomainEvent, Marked, Query};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

type Accounts = Arc<Mutex<HashMap<String, u64>>>;

#[derive(Debug, DomainEvent)]
#[event(event_type = "bank.deposited")]
struct Deposited {
    account: String,
    amount: u64,
}

#[derive(Debug, Serialize, Command)]
#[command(name = "bank.deposit", transactional, log)]
struct Deposit {
    account: String,
    amount: u64,
}

#[derive(Debug, Serialize, Command)]
#[command(name = "bank.withdraw", transactional, log)]
struct Withdraw {
    account: String,
    amount: u64,
}

#[derive(Debug, thiserror::Error, Marked)]
#[error("account {account} has only {balance}")]
#[marked(event_listener)]
struct InsufficientFunds {
    account: String,
    balance: u64,
}

#[derive(Debug, Serialize)]
struct BalanceDto {
    account: String,
    balance: u64,
}

impl Dto for BalanceDto {}

#[derive(Debug, Serialize, Query)]
#[query(dto = BalanceDto, name = "bank.balance", log)]
struct GetBalance {
    account: String,
}

struct BankHandler {
    accounts: Accounts,
}

#[async_trait]
impl CommandHandler<Deposit> for BankHandler {
    async fn handle(&self, ctx: &AppContext, cmd: &Deposit) -> AppResult<Vec<EventEnvelope>> {
        *self.accounts.lock().unwrap().entry(cmd.account.clone()).or_default() += cmd.amount;

        if let Some(post_actions) = ctx.post_actions() {
            let account = cmd.account.clone();
            post_actions.defer(move || async move {
                tracing::info!(%account, "send receipt");
                Ok(())
            });
        }

        Ok(vec![EventEnvelope::new(Deposited {
            account: cmd.account.clone(),
            amount: cmd.amount,
        })])
    }
}

#[async_trait]
impl CommandHandler<Withdraw> for BankHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: &Withdraw) -> AppResult<Vec<EventEnvelope>> {
        let mut accounts = self.accounts.lock().unwrap();
        let balance = accounts.entry(cmd.account.clone()).or_default();
        if *balance < cmd.amount {
            return Err(AppError::business(InsufficientFunds {
                account: cmd.account.clone(),
                balance: *balance,
            }));
        }
        *balance -= cmd.amount;
        Ok(Vec::new())
    }
}

#[async_trait]
impl QueryHandler<GetBalance> for BankHandler {
    async fn handle(&self, _ctx: &AppContext, q: &GetBalance) -> AppResult<BalanceDto> {
        let balance = self.accounts.lock().unwrap().get(&q.account).copied().unwrap_or(0);
        Ok(BalanceDto {
            account: q.account.clone(),
            balance,
        })
    }
}

struct Notifier;

#[async_trait]
impl EventHandler<Deposited> for Notifier {
    async fn handle(&self, event: &Deposited) -> anyhow::Result<()> {
        println!("notify: {} +{}", event.account, event.amount);
        Ok(())
    }
}

#[async_trait]
impl EventHandler<InsufficientFunds> for Notifier {
    async fn handle(&self, event: &InsufficientFunds) -> anyhow::Result<()> {
        println!("alert: {} overdraft attempt (balance {})", event.account, event.balance);
        Ok(())
    }
}

struct LoggingUnitOfWork;

#[async_trait]
impl UnitOfWork for LoggingUnitOfWork {
    async fn clear(&self) -> AppResult<()> {
        tracing::debug!("unit of work cleared");
        Ok(())
    }

    async fn commit(&self) -> AppResult<()> {
        tracing::debug!("unit of work committed");
        Ok(())
    }
}

fn unit_of_work() -> Arc<dyn UnitOfWork> {
    Arc::new(LoggingUnitOfWork)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let notifier = Arc::new(Notifier);
    let registry = SubscriptionRegistry::builder()
        .subscribe::<Deposited, _>(notifier.clone())
        .subscribe::<InsufficientFunds, _>(notifier)
        .build();
    let engine = Arc::new(EventDispatchEngine::new(
        registry,
        EventDispatchConfig {
            mode: DispatchMode::Background,
        },
    ));
    let services = PipelineServices::builder()
        .event_engine(engine.clone())
        .unit_of_work_factory(Arc::new(unit_of_work))
        .build();

    let bank = Arc::new(BankHandler {
        accounts: Accounts::default(),
    });

    let mut commands = InMemoryCommandBus::builder(services.clone());
    commands
        .register::<Deposit, _>(bank.clone())?
        .register::<Withdraw, _>(bank.clone())?;
    let commands = commands.build();

    let mut queries = InMemoryQueryBus::builder(services);
    queries.register::<GetBalance, _>(bank)?;
    let queries = queries.build();

    let ctx = AppContext::new(
        BusinessContext::builder()
            .maybe_correlation_id(Some("cor-1".into()))
            .maybe_actor_type(Some("user".into()))
            .maybe_actor_id(Some("u-1".into()))
            .build(),
    )
    .with_idempotency_key("idem-1");

    commands
        .dispatch(
            &ctx,
            Deposit {
                account: "alice".into(),
                amount: 100,
            },
        )
        .await?;

    let overdraft = commands
        .dispatch(
            &ctx,
            Withdraw {
                account: "alice".into(),
                amount: 500,
            },
        )
        .await;
    println!("withdraw result: {overdraft:?}");

    commands
        .dispatch_async(
            ctx.clone(),
            Withdraw {
                account: "alice".into(),
                amount: 30,
            },
        )
        .await?;

    let balance = queries
        .dispatch(
            &ctx,
            GetBalance {
                account: "alice".into(),
            },
        )
        .await?;
    println!("balance: {} = {}", balance.account, balance.balance);

    engine.wait_idle().await;
    Ok(())
}
