//! OFX statement parsing.
//!
//! Handles both OFX 1.x (SGML, unterminated leaf tags) and OFX 2.x (XML).
//! Leaf values are read with a single tag scanner that stops at the next
//! `<` or line end, which covers both dialects.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use conciliar_shared::types::{Amount, Currency};

use super::error::ImportError;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<([A-Z0-9.]+)>([^<\r\n]*)").expect("tag pattern is valid")
});

static TRANSACTION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<STMTTRN>(.*?)</STMTTRN>").expect("transaction pattern is valid")
});

const DEFAULT_DESCRIPTION: &str = "Transação bancária";

/// A parsed bank statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Bank code (`BANKID`).
    pub bank_code: String,
    /// Bank name derived from the code.
    pub bank_name: String,
    /// Account number (`ACCTID`).
    pub account_number: String,
    /// Account type (`ACCTTYPE`), `CHECKING` when absent.
    pub account_type: String,
    /// Statement start date (`DTSTART`).
    pub start: Option<NaiveDate>,
    /// Statement end date (`DTEND`).
    pub end: Option<NaiveDate>,
    /// Statement currency (`CURDEF`), BRL when absent.
    pub currency: Currency,
    /// Ledger balance (`BALAMT`).
    pub balance: Option<Amount>,
    /// Balance date (`DTASOF`).
    pub balance_date: Option<NaiveDate>,
    /// Transactions sorted by date.
    pub transactions: Vec<StatementLine>,
}

impl Statement {
    /// Returns the statement period, falling back to the transaction range.
    #[must_use]
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => {
                let first = self.transactions.first()?.date;
                let last = self.transactions.last()?.date;
                Some((first, last))
            }
        }
    }
}

/// One `STMTTRN` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Bank transaction identifier (`FITID`).
    pub fitid: String,
    /// Posting date (`DTPOSTED`).
    pub date: NaiveDate,
    /// Signed amount (`TRNAMT`); `TRNTYPE` DEBIT forces a negative sign.
    pub amount: Amount,
    /// Check number (`CHECKNUM`).
    pub check_number: Option<String>,
    /// Payee (`NAME`).
    pub name: Option<String>,
    /// Memo (`MEMO`).
    pub memo: Option<String>,
    /// `NAME - MEMO`, or whichever exists.
    pub description: String,
}

/// Returns the display name of a Brazilian bank code.
#[must_use]
pub fn bank_name(code: &str) -> String {
    match code {
        "748" => "Sicredi".to_string(),
        "001" => "Banco do Brasil".to_string(),
        "237" => "Bradesco".to_string(),
        "341" => "Itaú".to_string(),
        "104" => "Caixa Econômica Federal".to_string(),
        "033" => "Santander".to_string(),
        "077" => "Banco Inter".to_string(),
        "260" => "Nu Pagamentos".to_string(),
        other => format!("Banco {other}"),
    }
}

/// Leaf tag values of a text region with their byte offsets.
struct Tags<'a> {
    values: Vec<(String, &'a str, usize)>,
}

impl<'a> Tags<'a> {
    fn scan(text: &'a str, base_offset: usize) -> Self {
        let values = TAG
            .captures_iter(text)
            .filter_map(|caps| {
                let name = caps.get(1)?;
                let value = caps.get(2)?;
                Some((
                    name.as_str().to_uppercase(),
                    value.as_str().trim(),
                    base_offset + name.start(),
                ))
            })
            .collect();
        Self { values }
    }

    fn get(&self, tag: &str) -> Option<(&'a str, usize)> {
        self.values
            .iter()
            .find(|(name, value, _)| name == tag && !value.is_empty())
            .map(|(_, value, offset)| (*value, *offset))
    }

    fn text(&self, tag: &str) -> Option<String> {
        self.get(tag).map(|(value, _)| value.to_string())
    }
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

fn parse_date(value: &str, line: usize, field: &str) -> Result<NaiveDate, ImportError> {
    value
        .get(..8)
        .and_then(|digits| NaiveDate::parse_from_str(digits, "%Y%m%d").ok())
        .ok_or_else(|| ImportError::new(line, field, format!("invalid date '{value}'")))
}

fn optional_date(
    content: &str,
    tags: &Tags<'_>,
    field: &str,
) -> Result<Option<NaiveDate>, ImportError> {
    tags.get(field)
        .map(|(value, offset)| parse_date(value, line_of(content, offset), field))
        .transpose()
}

fn parse_amount(value: &str, line: usize, field: &str) -> Result<Amount, ImportError> {
    Amount::from_str(value).map_err(|e| ImportError::new(line, field, e.to_string()))
}

/// Parses an OFX statement.
///
/// Transactions missing `DTPOSTED`, `TRNAMT` or `FITID` are skipped;
/// malformed values are errors pointing at the offending line.
///
/// # Errors
///
/// Returns `ImportError` when the file is not OFX or a value is malformed.
pub fn parse_ofx(content: &str) -> Result<Statement, ImportError> {
    let content = content.trim_start_matches('\u{feff}');
    if !content.to_uppercase().contains("<OFX>") {
        return Err(ImportError::new(1, "OFX", "missing OFX root element"));
    }

    let header = Tags::scan(content, 0);
    let bank_code = header.text("BANKID").unwrap_or_default();
    let currency = match header.get("CURDEF") {
        Some((value, offset)) => Currency::from_str(value)
            .map_err(|e| ImportError::new(line_of(content, offset), "CURDEF", e))?,
        None => Currency::default(),
    };
    let balance = header
        .get("BALAMT")
        .map(|(value, offset)| parse_amount(value, line_of(content, offset), "BALAMT"))
        .transpose()?;

    let mut transactions = Vec::new();
    for block in TRANSACTION_BLOCK.captures_iter(content) {
        let Some(body) = block.get(1) else {
            continue;
        };
        let tags = Tags::scan(body.as_str(), body.start());
        if let Some(line) = parse_transaction(content, &tags)? {
            transactions.push(line);
        }
    }
    transactions.sort_by_key(|t| t.date);

    Ok(Statement {
        bank_name: bank_name(&bank_code),
        bank_code,
        account_number: header.text("ACCTID").unwrap_or_default(),
        account_type: header
            .text("ACCTTYPE")
            .unwrap_or_else(|| "CHECKING".to_string()),
        start: optional_date(content, &header, "DTSTART")?,
        end: optional_date(content, &header, "DTEND")?,
        currency,
        balance,
        balance_date: optional_date(content, &header, "DTASOF")?,
        transactions,
    })
}

fn parse_transaction(content: &str, tags: &Tags<'_>) -> Result<Option<StatementLine>, ImportError> {
    let (Some((date, date_at)), Some((amount, amount_at)), Some((fitid, _))) =
        (tags.get("DTPOSTED"), tags.get("TRNAMT"), tags.get("FITID"))
    else {
        return Ok(None);
    };

    let date = parse_date(date, line_of(content, date_at), "DTPOSTED")?;
    let mut amount = parse_amount(amount, line_of(content, amount_at), "TRNAMT")?;
    if tags
        .text("TRNTYPE")
        .is_some_and(|t| t.eq_ignore_ascii_case("DEBIT"))
    {
        amount = -amount.abs();
    }

    let name = tags.text("NAME");
    let memo = tags.text("MEMO");
    let description = match (&name, &memo) {
        (Some(name), Some(memo)) if name != memo => format!("{name} - {memo}"),
        (Some(name), _) => name.clone(),
        (None, Some(memo)) => memo.clone(),
        (None, None) => DEFAULT_DESCRIPTION.to_string(),
    };

    Ok(Some(StatementLine {
        fitid: fitid.to_string(),
        date,
        amount,
        check_number: tags.text("CHECKNUM"),
        name,
        memo,
        description,
    }))
}
