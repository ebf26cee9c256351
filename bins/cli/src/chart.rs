//! Chart of accounts loading from `;`-separated files.
//!
//! Expected header: `code;name;type` with an optional `nature` column.
//! Only analytical four-level codes are loaded; grouping levels are implied
//! by the code prefix.

use std::io::Read;

use anyhow::{Context, bail};
use serde::Deserialize;

use conciliar_core::account::{Account, AccountType, Nature, validate_code};
use conciliar_shared::types::{AccountId, TenantId};

#[derive(Debug, Deserialize)]
struct ChartRow {
    code: String,
    name: String,
    #[serde(rename = "type")]
    account_type: String,
    #[serde(default)]
    nature: Option<String>,
}

/// Parses a chart file into accounts for `tenant_id`, ordered by code.
///
/// # Errors
///
/// Fails on malformed rows, unknown types or natures, and invalid or
/// repeated codes.
pub fn parse_chart<R: Read>(reader: R, tenant_id: TenantId) -> anyhow::Result<Vec<Account>> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, row) in csv.deserialize::<ChartRow>().enumerate() {
        let line = index + 2;
        let row = row.with_context(|| format!("line {line}: malformed row"))?;
        validate_code(&row.code).with_context(|| format!("line {line}: invalid code"))?;
        rows.push((line, row));
    }

    let codes: Vec<&str> = rows.iter().map(|(_, r)| r.code.as_str()).collect();
    let mut accounts = Vec::with_capacity(rows.len());
    for (line, row) in &rows {
        if codes.iter().filter(|c| **c == row.code).count() > 1 {
            bail!("line {line}: code {} appears more than once", row.code);
        }
        let account_type = AccountType::parse(&row.account_type)
            .with_context(|| format!("line {line}: unknown type '{}'", row.account_type))?;
        let nature = match row.nature.as_deref().filter(|n| !n.is_empty()) {
            Some(raw) => Nature::parse(raw)
                .with_context(|| format!("line {line}: unknown nature '{raw}'"))?,
            None => account_type.default_nature(),
        };
        accounts.push(Account {
            id: AccountId::new(),
            tenant_id,
            code: row.code.clone(),
            name: row.name.clone(),
            account_type,
            nature,
            analytical: true,
            active: true,
            parent_code: row.code.rsplit_once('.').map(|(parent, _)| parent.to_string()),
        });
    }
    accounts.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(accounts)
}
