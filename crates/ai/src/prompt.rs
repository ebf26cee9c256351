//! Prompt construction for account suggestions.

use std::fmt::Write;

use conciliar_core::classification::AiRequest;

/// Maximum candidates asked from the model.
pub const MAX_CANDIDATES: usize = 3;

/// Builds the classification prompt.
///
/// The model may only answer with codes from the listed accounts and must
/// reply with a single JSON object.
#[must_use]
pub fn build_prompt(request: &AiRequest) -> String {
    let direction = if request.amount.is_negative() {
        "saída (débito)"
    } else {
        "entrada (crédito)"
    };

    let mut prompt = String::from(
        "Você é um contador brasileiro classificando lançamentos de extrato bancário.\n\
         Escolha as contas do plano abaixo que melhor classificam a transação.\n\
         Entradas de sócios, empréstimos, aportes, devoluções e transferências \
         entre contas próprias NÃO são receita.\n\n",
    );
    let _ = writeln!(prompt, "## TRANSAÇÃO");
    let _ = writeln!(prompt, "- Descrição: {}", request.description);
    let _ = writeln!(prompt, "- Valor: R$ {}", request.amount.abs());
    let _ = writeln!(prompt, "- Tipo: {direction}");
    let _ = writeln!(prompt, "\n## CONTAS DISPONÍVEIS");
    for account in &request.accounts {
        let _ = writeln!(
            prompt,
            "- {} {} ({})",
            account.code, account.name, account.account_type
        );
    }
    let _ = write!(
        prompt,
        "\nResponda somente com JSON, no máximo {MAX_CANDIDATES} contas, melhor primeiro:\n\
         {{\"candidates\": [{{\"code\": \"código da conta\", \"confidence\": 0.0}}], \
         \"rationale\": \"justificativa\"}}"
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use conciliar_core::account::AccountType;
    use conciliar_core::classification::AiAccountOption;
    use conciliar_shared::types::Amount;

    fn request(minor: i64) -> AiRequest {
        AiRequest {
            description: "PIX RECEBIDO CLIENTE ACME".into(),
            amount: Amount::from_minor(minor),
            accounts: vec![AiAccountOption {
                code: "3.1.1.01".into(),
                name: "Receita de Serviços".into(),
                account_type: AccountType::Revenue,
            }],
        }
    }

    #[test]
    fn test_prompt_lists_transaction_and_accounts() {
        let prompt = build_prompt(&request(150_000));
        assert!(prompt.contains("PIX RECEBIDO CLIENTE ACME"));
        assert!(prompt.contains("entrada (crédito)"));
        assert!(prompt.contains("- 3.1.1.01 Receita de Serviços (revenue)"));
        assert!(prompt.contains("\"candidates\""));
    }

    #[test]
    fn test_prompt_debit_direction() {
        let prompt = build_prompt(&request(-2_500));
        assert!(prompt.contains("saída (débito)"));
        assert!(!prompt.contains("R$ -"));
    }
}
