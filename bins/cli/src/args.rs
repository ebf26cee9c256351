//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

use conciliar_core::account::AccountType;
use conciliar_core::workflow::{Decision, TransactionStatus};
use conciliar_shared::types::{AccountRequestId, BankTransactionId, ProposalId};

/// Reconciles bank statements and routes classifications through review.
#[derive(Debug, Parser)]
#[command(name = "conciliar", version, about)]
pub struct Cli {
    /// Tenant the command acts on.
    #[arg(long, env = "CONCILIAR_TENANT", global = true)]
    pub tenant: Option<Uuid>,

    /// User performing the command.
    #[arg(long, env = "CONCILIAR_USER", global = true)]
    pub user: Option<Uuid>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Chart of accounts and new-account requests.
    Accounts {
        /// Accounts subcommand.
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Import an OFX statement.
    Import {
        /// Statement file.
        file: PathBuf,
    },
    /// Pair imported transactions with a boleto settlement listing.
    Match {
        /// Boleto listing (`;`-separated).
        boletos: PathBuf,
    },
    /// Suggest accounts for a transaction.
    Classify {
        /// Transaction id.
        transaction: BankTransactionId,
    },
    /// Propose the whole amount to one account.
    Propose {
        /// Transaction id.
        transaction: BankTransactionId,
        /// Account code.
        #[arg(long)]
        account: String,
        /// Justification, required for generic accounts.
        #[arg(long)]
        justification: Option<String>,
    },
    /// Propose a split across several accounts.
    Split {
        /// Transaction id.
        transaction: BankTransactionId,
        /// `CODE=AMOUNT` line, repeated; amounts are signed like the transaction.
        #[arg(long = "line", required = true, value_parser = parse_split_line)]
        lines: Vec<SplitArg>,
        /// Why the amount is split.
        #[arg(long)]
        justification: String,
    },
    /// Approve a pending proposal and write its ledger entry.
    Approve {
        /// Proposal id.
        proposal: ProposalId,
        /// Optional reviewer note.
        #[arg(long)]
        comment: Option<String>,
    },
    /// Reject a pending proposal.
    Reject {
        /// Proposal id.
        proposal: ProposalId,
        /// Reason for the rejection.
        #[arg(long)]
        comment: String,
    },
    /// List what waits for a reviewer.
    Queue,
    /// Show every proposal, decision and entry of a transaction.
    History {
        /// Transaction id.
        transaction: BankTransactionId,
    },
    /// List stored transactions.
    Transactions {
        /// Only transactions in this status.
        #[arg(long, value_parser = parse_status)]
        status: Option<TransactionStatus>,
    },
    /// Check statement credits against a boleto listing.
    Report {
        /// Boleto listing (`;`-separated).
        boletos: PathBuf,
        /// First day of the period.
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last day of the period.
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
}

/// Chart of accounts commands.
#[derive(Debug, Subcommand)]
pub enum AccountsCommands {
    /// Load accounts from a `code;name;type[;nature]` file.
    Load {
        /// Chart file.
        file: PathBuf,
    },
    /// List the chart of accounts.
    List,
    /// Request a new account.
    Request {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Account type (asset, liability, equity, revenue, expense).
        #[arg(long = "type", value_parser = parse_account_type)]
        account_type: AccountType,
        /// Code; suggested from the chart when absent.
        #[arg(long)]
        code: Option<String>,
        /// Why the account is needed.
        #[arg(long)]
        justification: String,
    },
    /// Approve or reject an account request.
    Decide {
        /// Request id.
        request: AccountRequestId,
        /// `approve` or `reject`.
        #[arg(value_parser = parse_decision)]
        verdict: Decision,
        /// Reviewer comment; required for rejections.
        #[arg(long)]
        comment: Option<String>,
    },
}

/// One `CODE=AMOUNT` split argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitArg {
    /// Account code.
    pub code: String,
    /// Amount in major units.
    pub amount: Decimal,
}

fn parse_split_line(value: &str) -> Result<SplitArg, String> {
    let (code, amount) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=AMOUNT, got '{value}'"))?;
    let amount = amount
        .trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    Ok(SplitArg {
        code: code.trim().to_string(),
        amount,
    })
}

fn parse_status(value: &str) -> Result<TransactionStatus, String> {
    TransactionStatus::parse(value).ok_or_else(|| format!("unknown status '{value}'"))
}

fn parse_account_type(value: &str) -> Result<AccountType, String> {
    AccountType::parse(value).ok_or_else(|| format!("unknown account type '{value}'"))
}

fn parse_decision(value: &str) -> Result<Decision, String> {
    Decision::parse(value).ok_or_else(|| format!("expected approve or reject, got '{value}'"))
}
