//! Status enums for orders and custom-order requests.
//!
//! Wire and database names are the Portuguese codes the storefront and the
//! back-office have always exchanged (`aguardando_pagamento`, `enviado`, ...).

use serde::{Deserialize, Serialize};

/// Error returned when a status code string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status: {0}")]
pub struct InvalidStatus(pub String);

/// Order lifecycle.
///
/// ```text
/// aguardando_pagamento -> pagamento_aprovado -> em_preparacao -> enviado -> entregue
///          \___________________\___________________\_______________\--> cancelado
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "market.order_status"))]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "aguardando_pagamento")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "aguardando_pagamento"))]
    AwaitingPayment,
    #[serde(rename = "pagamento_aprovado")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "pagamento_aprovado"))]
    PaymentApproved,
    #[serde(rename = "em_preparacao")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "em_preparacao"))]
    InPreparation,
    #[serde(rename = "enviado")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "enviado"))]
    Shipped,
    #[serde(rename = "entregue")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "entregue"))]
    Delivered,
    #[serde(rename = "cancelado")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "cancelado"))]
    Cancelled,
}

impl OrderStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 6] = [
        Self::AwaitingPayment,
        Self::PaymentApproved,
        Self::InPreparation,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire/database code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "aguardando_pagamento",
            Self::PaymentApproved => "pagamento_aprovado",
            Self::InPreparation => "em_preparacao",
            Self::Shipped => "enviado",
            Self::Delivered => "entregue",
            Self::Cancelled => "cancelado",
        }
    }

    /// Human label shown to customers and operators.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "Aguardando pagamento",
            Self::PaymentApproved => "Pagamento aprovado",
            Self::InPreparation => "Em preparação",
            Self::Shipped => "Enviado",
            Self::Delivered => "Entregue",
            Self::Cancelled => "Cancelado",
        }
    }

    /// `entregue` and `cancelado` end the workflow.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the order counts as paid revenue.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(
            self,
            Self::PaymentApproved | Self::InPreparation | Self::Shipped | Self::Delivered
        )
    }

    /// Position along the happy path; `None` for `cancelado`.
    const fn step(self) -> Option<u8> {
        match self {
            Self::AwaitingPayment => Some(0),
            Self::PaymentApproved => Some(1),
            Self::InPreparation => Some(2),
            Self::Shipped => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled => None,
        }
    }

    /// Whether an operator may move an order from `self` to `next`.
    ///
    /// Forward moves (skipping steps included) are allowed, as is cancelling
    /// any non-terminal order. Staying in the same state is always allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        if self as u8 == next as u8 {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match (self.step(), next.step()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    /// Status of a new order whose payment ended as `outcome`; `None` when
    /// the payment failed and no order may be stored.
    #[must_use]
    pub const fn from_payment(outcome: PaymentOutcome) -> Option<Self> {
        match outcome {
            PaymentOutcome::Approved => Some(Self::PaymentApproved),
            PaymentOutcome::Pending => Some(Self::AwaitingPayment),
            PaymentOutcome::Failed => None,
        }
    }
}

/// How the payment provider reports a payment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved,
    /// Accepted but not settled yet (bank slip, manual review).
    Pending,
    /// Rejected, cancelled, abandoned or unknown.
    Failed,
}

impl PaymentOutcome {
    /// Classify a provider status. Missing, `null` and unrecognised values
    /// count as failures.
    #[must_use]
    pub fn parse(status: Option<&str>) -> Self {
        let Some(status) = status.map(str::trim) else {
            return Self::Failed;
        };
        if status.eq_ignore_ascii_case("approved") {
            Self::Approved
        } else if ["pending", "in_process", "authorized"]
            .iter()
            .any(|s| status.eq_ignore_ascii_case(s))
        {
            Self::Pending
        } else {
            Self::Failed
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| InvalidStatus(s.to_owned()))
    }
}

/// Lifecycle of a custom-order request (encomenda).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "market.encomenda_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum EncomendaStatus {
    #[default]
    Pendente,
    EmAnalise,
    OrcamentoEnviado,
    Aprovada,
    EmProducao,
    Concluida,
    Cancelada,
}

impl EncomendaStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 7] = [
        Self::Pendente,
        Self::EmAnalise,
        Self::OrcamentoEnviado,
        Self::Aprovada,
        Self::EmProducao,
        Self::Concluida,
        Self::Cancelada,
    ];

    /// Wire/database code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::EmAnalise => "em_analise",
            Self::OrcamentoEnviado => "orcamento_enviado",
            Self::Aprovada => "aprovada",
            Self::EmProducao => "em_producao",
            Self::Concluida => "concluida",
            Self::Cancelada => "cancelada",
        }
    }

    /// Whether the request still needs attention from the workshop.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Concluida | Self::Cancelada)
    }
}

impl std::fmt::Display for EncomendaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for EncomendaStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| InvalidStatus(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::AwaitingPayment).unwrap(),
            "\"aguardando_pagamento\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"em_preparacao\"").unwrap();
        assert_eq!(parsed, OrderStatus::InPreparation);
        for status in OrderStatus::ALL {
            assert_eq!(status.code().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_forward_transitions_allowed() {
        use OrderStatus::*;
        assert!(AwaitingPayment.can_transition_to(PaymentApproved));
        assert!(PaymentApproved.can_transition_to(InPreparation));
        assert!(InPreparation.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(PaymentApproved.can_transition_to(Shipped));
    }

    #[test]
    fn test_backward_and_terminal_transitions_rejected() {
        use OrderStatus::*;
        assert!(!Delivered.can_transition_to(AwaitingPayment));
        assert!(!Shipped.can_transition_to(InPreparation));
        assert!(!Cancelled.can_transition_to(PaymentApproved));
        assert!(!Delivered.can_transition_to(Cancelled));
    }

    #[test]
    fn test_cancel_from_any_non_terminal_state() {
        for status in OrderStatus::ALL {
            let expected = !status.is_terminal() || status == OrderStatus::Cancelled;
            assert_eq!(
                status.can_transition_to(OrderStatus::Cancelled),
                expected,
                "{status}"
            );
        }
    }

    #[test]
    fn test_payment_outcome_parse() {
        assert_eq!(PaymentOutcome::parse(Some(" Approved ")), PaymentOutcome::Approved);
        assert_eq!(PaymentOutcome::parse(Some("in_process")), PaymentOutcome::Pending);
        for failed in [Some("rejected"), Some("failure"), Some("null"), Some(""), None] {
            assert_eq!(PaymentOutcome::parse(failed), PaymentOutcome::Failed, "{failed:?}");
        }
    }

    #[test]
    fn test_order_status_from_payment() {
        assert_eq!(
            OrderStatus::from_payment(PaymentOutcome::Approved),
            Some(OrderStatus::PaymentApproved)
        );
        assert_eq!(
            OrderStatus::from_payment(PaymentOutcome::Pending),
            Some(OrderStatus::AwaitingPayment)
        );
        assert_eq!(OrderStatus::from_payment(PaymentOutcome::Failed), None);
    }

    #[test]
    fn test_encomenda_status_codes() {
        assert_eq!(
            serde_json::to_string(&EncomendaStatus::OrcamentoEnviado).unwrap(),
            "\"orcamento_enviado\""
        );
        assert_eq!(
            "em_producao".parse::<EncomendaStatus>().unwrap(),
            EncomendaStatus::EmProducao
        );
        assert!("finalizada".parse::<EncomendaStatus>().is_err());
        assert!(!EncomendaStatus::Concluida.is_open());
    }
}
