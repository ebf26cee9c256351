//! Command dispatch over a reconciliation workflow.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::{Value, json};
use tracing::info;

use conciliar_ai::GeminiClient;
use conciliar_core::account::NewAccountInput;
use conciliar_core::import::parse_boletos;
use conciliar_core::matching::{BoletoGroup, Counterpart, group_boletos};
use conciliar_core::reconciliation::{
    ProposalRequest, ReconciliationWorkflow, WorkflowContext, WorkflowSettings,
};
use conciliar_core::store::WorkflowStore;
use conciliar_core::workflow::ProposedLine;
use conciliar_shared::AppConfig;
use conciliar_shared::types::{Amount, UserId};

use crate::args::{AccountsCommands, Commands, SplitArg};
use crate::chart::parse_chart;

/// Builds the workflow, attaching the AI service when it is enabled.
///
/// # Errors
///
/// Fails if the AI service is enabled without an API key.
pub fn build_workflow<S: WorkflowStore>(
    store: S,
    config: &AppConfig,
) -> anyhow::Result<ReconciliationWorkflow<S>> {
    let workflow = ReconciliationWorkflow::new(store, WorkflowSettings::from(&config.workflow));
    if !config.ai.enabled {
        return Ok(workflow);
    }
    let client = GeminiClient::from_config(&config.ai)?;
    info!(model = %client.model(), "AI suggestions enabled");
    Ok(workflow.with_ai(Arc::new(client)))
}

/// One invocation: a workflow and the context it acts in.
pub struct Session<S> {
    workflow: ReconciliationWorkflow<S>,
    ctx: WorkflowContext,
}

impl<S: WorkflowStore> Session<S> {
    /// Creates a session.
    #[must_use]
    pub fn new(workflow: ReconciliationWorkflow<S>, ctx: WorkflowContext) -> Self {
        Self { workflow, ctx }
    }

    /// Continues the session as another user.
    #[must_use]
    pub fn as_actor(mut self, actor: UserId) -> Self {
        self.ctx = WorkflowContext::new(self.ctx.tenant_id, actor);
        self
    }

    /// Returns the workflow.
    #[must_use]
    pub fn workflow(&self) -> &ReconciliationWorkflow<S> {
        &self.workflow
    }

    /// Runs a command and returns its JSON result.
    ///
    /// # Errors
    ///
    /// Propagates input, workflow and store failures.
    pub async fn run(&self, command: Commands) -> anyhow::Result<Value> {
        let ctx = &self.ctx;
        let workflow = &self.workflow;
        let value = match command {
            Commands::Accounts { command } => self.run_accounts(command).await?,
            Commands::Import { file } => {
                let content = read(&file)?;
                serde_json::to_value(workflow.import_statement(ctx, &content).await?)?
            }
            Commands::Match { boletos } => {
                let counterparts = counterparts(&read(&boletos)?)?;
                serde_json::to_value(workflow.match_transactions(ctx, &counterparts).await?)?
            }
            Commands::Classify { transaction } => {
                serde_json::to_value(workflow.classify(ctx, transaction).await?)?
            }
            Commands::Propose {
                transaction,
                account,
                justification,
            } => {
                let chart = workflow.store().chart(ctx.tenant_id).await?;
                let account = chart.require_assignable_code(&account)?;
                let request = ProposalRequest::manual(account.id, justification);
                serde_json::to_value(workflow.propose(ctx, transaction, request).await?)?
            }
            Commands::Split {
                transaction,
                lines,
                justification,
            } => {
                let lines = self.split_lines(&lines).await?;
                serde_json::to_value(
                    workflow
                        .propose_split(ctx, transaction, lines, &justification)
                        .await?,
                )?
            }
            Commands::Approve { proposal, comment } => {
                serde_json::to_value(workflow.approve(ctx, proposal, comment).await?)?
            }
            Commands::Reject { proposal, comment } => {
                serde_json::to_value(workflow.reject(ctx, proposal, &comment).await?)?
            }
            Commands::Queue => serde_json::to_value(workflow.pending_queue(ctx).await?)?,
            Commands::History { transaction } => {
                serde_json::to_value(workflow.decision_history(ctx, transaction).await?)?
            }
            Commands::Transactions { status } => {
                serde_json::to_value(workflow.transactions(ctx, status).await?)?
            }
            Commands::Report { boletos, from, to } => {
                let boletos = parse_boletos(&read(&boletos)?)?;
                let period = from.zip(to);
                serde_json::to_value(workflow.settlement_report(ctx, &boletos, period).await?)?
            }
        };
        Ok(value)
    }

    async fn run_accounts(&self, command: AccountsCommands) -> anyhow::Result<Value> {
        let ctx = &self.ctx;
        let workflow = &self.workflow;
        let value = match command {
            AccountsCommands::Load { file } => {
                let handle = std::fs::File::open(&file)
                    .with_context(|| format!("cannot open {}", file.display()))?;
                let accounts = parse_chart(handle, ctx.tenant_id)?;
                for account in &accounts {
                    workflow.store().insert_account(account).await?;
                }
                info!(
                    tenant_id = %ctx.tenant_id,
                    request_id = %ctx.request_id,
                    loaded = accounts.len(),
                    "Chart of accounts loaded"
                );
                json!({ "loaded": accounts.len() })
            }
            AccountsCommands::List => {
                let chart = workflow.store().chart(ctx.tenant_id).await?;
                serde_json::to_value(chart.accounts())?
            }
            AccountsCommands::Request {
                name,
                account_type,
                code,
                justification,
            } => {
                let input = NewAccountInput {
                    code,
                    name,
                    account_type,
                    nature: None,
                    justification,
                };
                serde_json::to_value(workflow.request_account(ctx, input).await?)?
            }
            AccountsCommands::Decide {
                request,
                verdict,
                comment,
            } => serde_json::to_value(
                workflow
                    .decide_account_request(ctx, request, verdict, comment)
                    .await?,
            )?,
        };
        Ok(value)
    }

    async fn split_lines(&self, lines: &[SplitArg]) -> anyhow::Result<Vec<ProposedLine>> {
        let chart = self.workflow.store().chart(self.ctx.tenant_id).await?;
        lines
            .iter()
            .map(|line| {
                let account = chart.require_assignable_code(&line.code)?;
                let amount = Amount::from_decimal(line.amount)
                    .with_context(|| format!("invalid amount for {}", line.code))?;
                Ok::<_, anyhow::Error>(ProposedLine::new(account.id, amount))
            })
            .collect()
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn counterparts(listing: &str) -> anyhow::Result<Vec<Counterpart>> {
    let boletos = parse_boletos(listing)?;
    Ok(group_boletos(&boletos)
        .iter()
        .filter_map(BoletoGroup::to_counterpart)
        .collect())
}
