//! Boleto settlement listing (CSV) parsing.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use conciliar_shared::types::Amount;

use super::error::ImportError;
use crate::text::normalize;

/// One settled boleto from the bank's collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boleto {
    /// Settlement batch reference (`COBnnnnnn`), uppercased.
    pub document: String,
    /// Boleto number ("nosso número").
    pub number: String,
    /// Payer name.
    pub payer: String,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Settlement date.
    pub settled_on: Option<NaiveDate>,
    /// Face value.
    pub face_value: Amount,
    /// Amount actually received.
    pub received: Amount,
    /// Date the batch is credited on the statement.
    pub statement_date: Option<NaiveDate>,
}

impl Boleto {
    /// Interest and fines paid on top of the face value.
    #[must_use]
    pub fn interest_and_fines(&self) -> Amount {
        self.received - self.face_value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Document,
    Number,
    Payer,
    DueDate,
    SettledOn,
    FaceValue,
    Received,
    StatementDate,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        match normalize(header).replace(' ', "_").as_str() {
            "documento" | "cob" => Some(Self::Document),
            "n_do_boleto" | "nosso_numero" => Some(Self::Number),
            "pagador" | "cliente" => Some(Self::Payer),
            "data_vencimento" => Some(Self::DueDate),
            "data_liquidacao" | "data_liquida_ao" => Some(Self::SettledOn),
            "valor_boleto" => Some(Self::FaceValue),
            "valor_recebido" => Some(Self::Received),
            "data_do_extrato" => Some(Self::StatementDate),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Document => "Documento",
            Self::Number => "N do boleto",
            Self::Payer => "Pagador",
            Self::DueDate => "Data Vencimento",
            Self::SettledOn => "Data Liquidação",
            Self::FaceValue => "valor boleto",
            Self::Received => "valor recebido",
            Self::StatementDate => "data do extrato",
        }
    }
}

struct Row<'r> {
    record: &'r csv::StringRecord,
    columns: &'r HashMap<Column, usize>,
    line: usize,
}

impl Row<'_> {
    fn text(&self, column: Column) -> &str {
        self.columns
            .get(&column)
            .and_then(|&index| self.record.get(index))
            .map_or("", str::trim)
    }

    fn amount(&self, column: Column) -> Result<Amount, ImportError> {
        let value = self.text(column);
        if value.is_empty() {
            return Ok(Amount::ZERO);
        }
        Amount::from_str(value).map_err(|e| ImportError::new(self.line, column.name(), e.to_string()))
    }

    fn date(&self, column: Column) -> Result<Option<NaiveDate>, ImportError> {
        let value = self.text(column);
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(value, "%d/%m/%Y")
            .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
            .map(Some)
            .map_err(|_| ImportError::new(self.line, column.name(), format!("invalid date '{value}'")))
    }
}

/// Parses a `;`-separated boleto listing.
///
/// Header names are matched loosely (case, accents and spacing are
/// ignored). Rows without a document or with a non-positive received amount
/// are skipped.
///
/// # Errors
///
/// Returns `ImportError` when required columns are missing or a value is
/// malformed.
pub fn parse_boletos(content: &str) -> Result<Vec<Boleto>, ImportError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::new(1, "header", e.to_string()))?
        .clone();
    let mut columns = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some(column) = Column::from_header(header) {
            columns.entry(column).or_insert(index);
        }
    }
    for required in [Column::Document, Column::Received] {
        if !columns.contains_key(&required) {
            return Err(ImportError::new(
                1,
                required.name(),
                "required column is missing",
            ));
        }
    }

    let mut boletos = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| usize::try_from(p.line()).unwrap_or(usize::MAX));
            ImportError::new(line, "record", e.to_string())
        })?;
        let line = record
            .position()
            .map_or(0, |p| usize::try_from(p.line()).unwrap_or(usize::MAX));
        let row = Row {
            record: &record,
            columns: &columns,
            line,
        };

        let document = row.text(Column::Document).to_uppercase();
        let received = row.amount(Column::Received)?;
        if document.is_empty() || !received.is_positive() {
            continue;
        }

        boletos.push(Boleto {
            document,
            number: row.text(Column::Number).to_string(),
            payer: row.text(Column::Payer).to_string(),
            due_date: row.date(Column::DueDate)?,
            settled_on: row.date(Column::SettledOn)?,
            face_value: row.amount(Column::FaceValue)?,
            received,
            statement_date: row.date(Column::StatementDate)?,
        });
    }
    Ok(boletos)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "Documento;N do boleto;Pagador;Data Vencimento;Data Liquidação;valor boleto;valor recebido;data do extrato
cob000123;0001;ACME LTDA;05/01/2025;09/01/2025;R$ 1.000,00;R$ 1.010,50;09/01/2025
COB000123;0002;BETA ME;05/01/2025;09/01/2025;500,00;500,00;09/01/2025
;0003;SEM DOC;05/01/2025;;100,00;100,00;
COB000124;0004;CANCELADO;05/01/2025;;100,00;0,00;
";

    #[test]
    fn test_parse_listing() {
        let boletos = parse_boletos(LISTING).unwrap();
        assert_eq!(boletos.len(), 2);

        let first = &boletos[0];
        assert_eq!(first.document, "COB000123");
        assert_eq!(first.payer, "ACME LTDA");
        assert_eq!(first.face_value, Amount::from_minor(100_000));
        assert_eq!(first.received, Amount::from_minor(101_050));
        assert_eq!(first.interest_and_fines(), Amount::from_minor(1_050));
        assert_eq!(first.statement_date, NaiveDate::from_ymd_opt(2025, 1, 9));
    }

    #[test]
    fn test_snake_case_headers_and_iso_dates() {
        let listing = "documento;pagador;valor_recebido;data_do_extrato\nCOB000001;X;10,00;2025-02-01\n";
        let boletos = parse_boletos(listing).unwrap();
        assert_eq!(boletos[0].statement_date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(boletos[0].face_value, Amount::ZERO);
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_boletos("Pagador;valor boleto\nX;1,00\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.field, "Documento");
    }

    #[test]
    fn test_malformed_amount_reports_line() {
        let listing = "Documento;valor recebido\nCOB000001;10,00\nCOB000002;dez reais\n";
        let err = parse_boletos(listing).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.field, "valor recebido");
    }

    #[test]
    fn test_malformed_date_reports_field() {
        let listing = "Documento;valor recebido;data do extrato\nCOB000001;10,00;31/02/2025\n";
        let err = parse_boletos(listing).unwrap_err();
        assert_eq!(err.field, "data do extrato");
    }
}
