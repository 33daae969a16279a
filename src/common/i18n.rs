// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_LANG: &str = "pt";

// (código, pt, zh, en)
const CATALOG: &[(&str, &str, &str, &str)] = &[
    ("VALIDATION_ERROR", "Um ou mais campos são inválidos.", "一个或多个字段无效。", "One or more fields are invalid."),
    ("INVALID_AMOUNT", "Valor inválido.", "金额无效。", "Invalid amount."),
    ("INVALID_FEE_RATE", "Taxa inválida (0-100).", "费率无效（0-100）。", "Invalid fee rate (0-100)."),
    ("MISSING_TRACKING_CODE", "Adicione o código de rastreio.", "请添加追踪码。", "A tracking code is required."),
    ("MISSING_SHIPMENT_IMAGES", "Adicione pelo menos uma foto do envio.", "请至少添加一张发货照片。", "At least one shipment photo is required."),
    ("MISSING_QR_CODE", "Por favor, anexe o QR Code do Alipay.", "请上传支付宝收款码。", "Please attach the Alipay QR code."),
    ("EMPTY_DISPUTE_REASON", "Descreva o motivo da disputa.", "请描述原因。", "Please describe the dispute reason."),
    ("INVALID_UPLOAD", "Upload inválido.", "上传无效。", "Invalid upload."),
    ("UNSUPPORTED_IMAGE_FORMAT", "Formato de imagem não suportado.", "不支持的图片格式。", "Unsupported image format."),
    ("FILE_TOO_LARGE", "Arquivo muito grande.", "文件过大。", "File too large."),
    ("EMAIL_ALREADY_EXISTS", "Este e-mail já está em uso.", "该邮箱已被使用。", "This e-mail is already in use."),
    ("DOCUMENT_ALREADY_EXISTS", "Este CPF já está cadastrado.", "该CPF已注册。", "This CPF is already registered."),
    ("INVALID_CREDENTIALS", "E-mail ou senha inválidos.", "邮箱或密码错误。", "Invalid e-mail or password."),
    ("INVALID_TOKEN", "Token de autenticação inválido ou ausente.", "身份验证令牌无效或缺失。", "Missing or invalid authentication token."),
    ("USER_NOT_FOUND", "Usuário não encontrado.", "用户不存在。", "User not found."),
    ("ACCOUNT_REJECTED", "Conta rejeitada. Entre em contato com o suporte.", "注册被拒绝，请联系客服。", "Account rejected. Please contact support."),
    ("ACCOUNT_PENDING_APPROVAL", "Sua conta está aguardando aprovação.", "您的账户正在等待审核。", "Your account is awaiting approval."),
    ("FORBIDDEN", "Você não tem permissão para esta ação.", "您无权执行此操作。", "You are not allowed to perform this action."),
    ("SUPPLIER_NOT_AVAILABLE", "Fornecedor não encontrado ou não aprovado.", "供应商不存在或未获批准。", "Supplier not found or not approved."),
    ("RESOURCE_NOT_FOUND", "Recurso não encontrado.", "资源不存在。", "Resource not found."),
    ("INVALID_TRANSITION", "Esta ação não é permitida no status atual.", "当前状态不允许此操作。", "This action is not allowed in the current status."),
    ("ALREADY_PROCESSED", "Esta solicitação já foi processada.", "该申请已被处理。", "This request has already been processed."),
    ("DISPUTE_ALREADY_OPEN", "Já existe uma disputa aberta para este pedido.", "该订单已有未解决的争议。", "This order already has an open dispute."),
    ("ORDER_HAS_OPEN_DISPUTE", "O pedido possui uma disputa aberta.", "该订单存在未解决的争议。", "The order has an open dispute."),
    ("INSUFFICIENT_BALANCE", "Saldo disponível insuficiente.", "可用余额不足。", "Insufficient available balance."),
    ("INTERNAL_ERROR", "Ocorreu um erro inesperado.", "发生意外错误。", "An unexpected error occurred."),
];

/// Mensagens de erro por idioma. Idiomas desconhecidos caem para o português.
#[derive(Clone)]
pub struct I18nStore {
    messages: Arc<HashMap<(&'static str, &'static str), &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::with_capacity(CATALOG.len() * 3);
        for (code, pt, zh, en) in CATALOG {
            messages.insert(("pt", *code), *pt);
            messages.insert(("zh", *code), *zh);
            messages.insert(("en", *code), *en);
        }
        Self {
            messages: Arc::new(messages),
        }
    }

    pub fn translate(&self, lang: &str, code: &str) -> Option<&'static str> {
        let lang = match lang {
            "zh" => "zh",
            "en" => "en",
            _ => DEFAULT_LANG,
        };
        self.messages
            .get(&(lang, code))
            .or_else(|| self.messages.get(&(DEFAULT_LANG, code)))
            .copied()
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
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("fr", "INSUFFICIENT_BALANCE"),
            store.translate("pt", "INSUFFICIENT_BALANCE")
        );
    }

    #[test]
    fn unknown_code_has_no_message() {
        assert!(I18nStore::new().translate("pt", "NOPE").is_none());
    }
}
