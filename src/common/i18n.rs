// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

const FALLBACK_LANG: &str = "en";

// (código, pt, en)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("VALIDATION_ERROR", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("EMAIL_ALREADY_EXISTS", "Este e-mail já está em uso.", "This e-mail is already in use."),
    ("INVALID_CREDENTIALS", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("INVALID_TOKEN", "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
    ("USER_NOT_FOUND", "Usuário não encontrado.", "User not found."),
    ("STUDIO_ACCESS_DENIED", "Você não tem acesso a este estúdio.", "You do not have access to this studio."),
    ("INVALID_STUDIO_HEADER", "O cabeçalho x-studio-id é obrigatório e deve ser um UUID.", "The x-studio-id header is required and must be a UUID."),
    ("RESOURCE_NOT_FOUND", "Registro não encontrado.", "Record not found."),
    ("UNIQUE_VIOLATION", "Já existe um registro com estes dados.", "A record with these values already exists."),
    ("RESOURCE_IN_USE", "Este registro está em uso e não pode ser removido.", "This record is in use and cannot be removed."),
    ("COMMAND_NOT_OPEN", "A comanda já foi fechada.", "The command is already closed."),
    ("EMPTY_COMMAND", "A comanda não possui itens.", "The command has no items."),
    ("NO_PAYMENTS", "Informe ao menos um pagamento.", "Add at least one payment."),
    ("INVALID_PAYMENT", "Pagamento inválido.", "Invalid payment."),
    ("PAYMENT_EXCEEDS_REMAINING", "O valor excede o restante a pagar.", "The amount exceeds the remaining balance."),
    ("CHECKOUT_INCOMPLETE", "Ainda há saldo a pagar.", "There is still a balance to pay."),
    ("PAYMENT_TOTAL_MISMATCH", "A soma dos pagamentos difere do total da comanda.", "The payments do not add up to the command total."),
    ("FEE_RATE_NOT_FOUND", "Não há taxa cadastrada para esta forma de pagamento.", "No fee rate is configured for this payment option."),
    ("SETTLEMENT_FAILED", "Falha ao registrar os pagamentos. Nada foi gravado; a comanda continua aberta.", "Failed to record the payments. Nothing was saved; the command is still open."),
    ("PAYMENT_METHOD_HAS_RATES", "Remova as taxas antes de trocar o tipo desta forma de pagamento.", "Remove the fee rates before changing this payment method's type."),
    ("APPOINTMENT_CONFLICT", "O profissional já possui um agendamento neste horário.", "The professional already has an appointment at this time."),
    ("INSUFFICIENT_STOCK", "Estoque insuficiente.", "Insufficient stock."),
    ("INVALID_PERIOD", "Período inválido. Use o formato AAAA-MM.", "Invalid period. Use the YYYY-MM format."),
    ("INTERNAL_ERROR", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

/// Catálogo de mensagens por idioma. Clonado barato (Arc) dentro do AppState.
#[derive(Clone, Debug)]
pub struct I18nStore {
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut pt = HashMap::new();
        let mut en = HashMap::new();
        for (code, pt_msg, en_msg) in MESSAGES {
            pt.insert(*code, *pt_msg);
            en.insert(*code, *en_msg);
        }

        let mut messages = HashMap::new();
        messages.insert("pt", pt);
        messages.insert("en", en);

        Self { messages: Arc::new(messages) }
    }

    pub fn translate(&self, lang: &str, code: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|m| m.get(code))
            .or_else(|| self.messages.get(FALLBACK_LANG).and_then(|m| m.get(code)))
            .map(|m| m.to_string())
            .unwrap_or_else(|| code.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_codes() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "COMMAND_NOT_OPEN"), "A comanda já foi fechada.");
        assert_eq!(store.translate("en", "COMMAND_NOT_OPEN"), "The command is already closed.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "NO_PAYMENTS"), "Add at least one payment.");
    }

    #[test]
    fn unknown_code_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "SOMETHING_ELSE"), "SOMETHING_ELSE");
    }

    #[test]
    fn every_error_code_has_both_languages() {
        let store = I18nStore::new();
        for (code, _, _) in MESSAGES {
            assert_ne!(store.translate("pt", code), *code);
            assert_ne!(store.translate("en", code), *code);
        }
    }
}
