//! Status vocabularies and the transition rules between them.
//!
//! Orders keep the storefront wording (`Pendente`, `Confirmado`, ...) on the
//! wire and in the database. A transition is planned here as a value; the
//! services persist it together with its history row and stamp column.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Confirmado")]
    Confirmed,
    #[serde(rename = "Em Preparo")]
    Preparing,
    #[serde(rename = "Enviado")]
    Shipped,
    #[serde(rename = "Recebido")]
    Received,
    #[serde(rename = "Em Produção")]
    InProduction,
    #[serde(rename = "Pronto")]
    Ready,
    #[serde(rename = "Entregue")]
    Delivered,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

/// Timestamp column written when an order or order item enters a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    Accepted,
    Received,
    Preparing,
    Ready,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Shipped,
        OrderStatus::Received,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Statuses the kitchen is allowed to set.
    pub const KITCHEN_FLOW: [OrderStatus; 4] = [
        OrderStatus::Received,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];

    /// Statuses that keep an order on the kitchen board.
    pub const KITCHEN_ACTIVE: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Received,
        OrderStatus::InProduction,
        OrderStatus::Ready,
    ];

    /// Statuses counted as revenue in the admin statistics.
    pub const REVENUE: [OrderStatus; 3] = [
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendente",
            OrderStatus::Confirmed => "Confirmado",
            OrderStatus::Preparing => "Em Preparo",
            OrderStatus::Shipped => "Enviado",
            OrderStatus::Received => "Recebido",
            OrderStatus::InProduction => "Em Produção",
            OrderStatus::Ready => "Pronto",
            OrderStatus::Delivered => "Entregue",
            OrderStatus::Cancelled => "Cancelado",
        }
    }

    pub fn stamp(&self) -> Option<Stamp> {
        match self {
            OrderStatus::Confirmed => Some(Stamp::Accepted),
            OrderStatus::Received => Some(Stamp::Received),
            OrderStatus::InProduction | OrderStatus::Preparing => Some(Stamp::Preparing),
            OrderStatus::Ready => Some(Stamp::Ready),
            OrderStatus::Delivered => Some(Stamp::Delivered),
            _ => None,
        }
    }

    pub fn is_kitchen_step(&self) -> bool {
        Self::KITCHEN_FLOW.contains(self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid order status {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentStatus {
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Aprovado")]
    Approved,
    #[serde(rename = "Rejeitado")]
    Rejected,
    #[serde(rename = "Reembolsado")]
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pendente",
            PaymentStatus::Approved => "Aprovado",
            PaymentStatus::Rejected => "Rejeitado",
            PaymentStatus::Refunded => "Reembolsado",
        }
    }

    /// Maps a gateway callback status (`approved`, `pending`, ...).
    pub fn from_gateway(status: &str) -> Option<Self> {
        match status {
            "approved" => Some(PaymentStatus::Approved),
            "pending" | "in_process" => Some(PaymentStatus::Pending),
            "rejected" => Some(PaymentStatus::Rejected),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Order status forced by this payment outcome, if any.
    pub fn order_effect(&self) -> Option<OrderStatus> {
        match self {
            PaymentStatus::Approved => Some(OrderStatus::Confirmed),
            PaymentStatus::Refunded => Some(OrderStatus::Cancelled),
            PaymentStatus::Pending | PaymentStatus::Rejected => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            PaymentStatus::Pending,
            PaymentStatus::Approved,
            PaymentStatus::Rejected,
            PaymentStatus::Refunded,
        ]
        .into_iter()
        .find(|status| status.as_str() == s)
        .ok_or_else(|| format!("Invalid payment status {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComandaItemStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
}

impl ComandaItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComandaItemStatus::Pending => "pending",
            ComandaItemStatus::Preparing => "preparing",
            ComandaItemStatus::Ready => "ready",
            ComandaItemStatus::Delivered => "delivered",
        }
    }
}

impl FromStr for ComandaItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ComandaItemStatus::Pending),
            "preparing" => Ok(ComandaItemStatus::Preparing),
            "ready" => Ok(ComandaItemStatus::Ready),
            "delivered" => Ok(ComandaItemStatus::Delivered),
            other => Err(format!("Invalid comanda item status {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComandaStatus {
    Open,
    Closed,
}

impl ComandaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComandaStatus::Open => "open",
            ComandaStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Cleaning,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Cleaning => "cleaning",
        }
    }
}

impl FromStr for TableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(TableStatus::Available),
            "occupied" => Ok(TableStatus::Occupied),
            "reserved" => Ok(TableStatus::Reserved),
            "cleaning" => Ok(TableStatus::Cleaning),
            other => Err(format!("Invalid table status {other}")),
        }
    }
}

/// A planned status change: what the row had and what it will hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: String,
    pub to: String,
}

/// How a request for the status a row already holds is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Nothing is written.
    Ignore,
    /// The reached-at stamp moves to now and subscribers hear about it again.
    /// No history row, the status did not change.
    Restamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Move(Transition),
    Restamp,
    Stay,
}

/// Plans a request to put a row in status `to`.
pub fn plan(current: &str, to: &str, repeat: Repeat) -> Step {
    if current != to {
        return Step::Move(Transition {
            from: current.to_string(),
            to: to.to_string(),
        });
    }
    match repeat {
        Repeat::Ignore => Step::Stay,
        Repeat::Restamp => Step::Restamp,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Review {
    Accept,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    Apply(Transition),
    AlreadyProcessed,
}

/// Accept and reject only act on orders still waiting in `Pendente`.
pub fn review_pending(current: &str, action: Review) -> ReviewOutcome {
    if current != OrderStatus::Pending.as_str() {
        return ReviewOutcome::AlreadyProcessed;
    }
    let to = match action {
        Review::Accept => OrderStatus::Confirmed,
        Review::Reject => OrderStatus::Cancelled,
    };
    ReviewOutcome::Apply(Transition {
        from: current.to_string(),
        to: to.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_round_trips_through_wire_names() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serde_uses_portuguese_names() {
        let json = serde_json::to_string(&OrderStatus::InProduction).unwrap();
        assert_eq!(json, "\"Em Produção\"");
    }

    #[test]
    fn accept_from_pending_confirms() {
        assert_eq!(
            review_pending("Pendente", Review::Accept),
            ReviewOutcome::Apply(Transition {
                from: "Pendente".into(),
                to: "Confirmado".into(),
            })
        );
    }

    #[test]
    fn reject_from_pending_cancels() {
        match review_pending("Pendente", Review::Reject) {
            ReviewOutcome::Apply(t) => assert_eq!(t.to, "Cancelado"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn review_outside_pending_is_already_processed() {
        for status in ["Confirmado", "Cancelado", "Pronto", "Entregue"] {
            assert_eq!(
                review_pending(status, Review::Accept),
                ReviewOutcome::AlreadyProcessed
            );
            assert_eq!(
                review_pending(status, Review::Reject),
                ReviewOutcome::AlreadyProcessed
            );
        }
    }

    #[test]
    fn same_status_is_not_a_transition() {
        assert_eq!(plan("Pronto", "Pronto", Repeat::Ignore), Step::Stay);
        for repeat in [Repeat::Ignore, Repeat::Restamp] {
            assert_eq!(
                plan("Recebido", "Pronto", repeat),
                Step::Move(Transition {
                    from: "Recebido".into(),
                    to: "Pronto".into(),
                })
            );
        }
    }

    #[test]
    fn kitchen_repeat_refreshes_the_stamp() {
        assert_eq!(plan("Pronto", "Pronto", Repeat::Restamp), Step::Restamp);
    }

    #[test]
    fn stamps_follow_reached_states() {
        assert_eq!(OrderStatus::Confirmed.stamp(), Some(Stamp::Accepted));
        assert_eq!(OrderStatus::Ready.stamp(), Some(Stamp::Ready));
        assert_eq!(OrderStatus::Delivered.stamp(), Some(Stamp::Delivered));
        assert_eq!(OrderStatus::Cancelled.stamp(), None);
    }

    #[test]
    fn kitchen_may_only_set_its_own_flow() {
        assert!(OrderStatus::InProduction.is_kitchen_step());
        assert!(!OrderStatus::Confirmed.is_kitchen_step());
    }

    #[test]
    fn gateway_statuses_map_to_effects() {
        let approved = PaymentStatus::from_gateway("approved").unwrap();
        assert_eq!(approved.order_effect(), Some(OrderStatus::Confirmed));
        let refunded = PaymentStatus::from_gateway("refunded").unwrap();
        assert_eq!(refunded.order_effect(), Some(OrderStatus::Cancelled));
        assert_eq!(PaymentStatus::from_gateway("rejected").unwrap().order_effect(), None);
        assert_eq!(PaymentStatus::from_gateway("chargeback"), None);
    }
}
