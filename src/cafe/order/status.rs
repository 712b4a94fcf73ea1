//! 订单状态机
//!
//! 原前端把 status 当作随意可写的字符串，任何页面都能跳到任何状态。
//! 这里收紧为显式的变迁表，未定义的变迁在边界处拒绝：
//!
//! ```text
//! pending_payment -> pending -> ready -> on_way -> delivered
//!                                  \--------------^   （自提订单直接交付）
//! 任意非 pending 状态 -> pending    （管理端"重新打开"）
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// 待支付（在线支付订单的起点）
    #[serde(rename = "pending_payment")]
    PendingPayment,
    /// 待处理（普通订单的起点）
    #[serde(rename = "pending")]
    #[default]
    Pending,
    /// 已备好（"tayyor"）
    #[serde(rename = "ready")]
    Ready,
    /// 配送中
    #[serde(rename = "on_way")]
    OnWay,
    /// 已交付
    #[serde(rename = "delivered")]
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::OnWay => "on_way",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending_payment" => Ok(OrderStatus::PendingPayment),
            "pending" => Ok(OrderStatus::Pending),
            "ready" => Ok(OrderStatus::Ready),
            "on_way" => Ok(OrderStatus::OnWay),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(anyhow::anyhow!("未知订单状态: {}", other)),
        }
    }

    /// 变迁是否在定义表内
    pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::*;
        match (from, to) {
            (PendingPayment, Pending) => true,
            (Pending, Ready) => true,
            (Ready, OnWay) => true,
            // 自提/堂食订单备好后直接交付，无配送环节
            (Ready, Delivered) => true,
            (OnWay, Delivered) => true,
            // 重新打开：任意非起点状态回到 pending
            (from, Pending) if from != Pending => true,
            _ => false,
        }
    }

    /// 校验变迁，未定义的变迁返回错误
    pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<()> {
        if Self::can_transition(from, to) {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "订单状态变迁未定义: {} -> {}",
                from.as_str(),
                to.as_str()
            ))
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    #[test]
    fn test_forward_path() {
        assert!(OrderStatus::can_transition(Pending, Ready));
        assert!(OrderStatus::can_transition(Ready, OnWay));
        assert!(OrderStatus::can_transition(OnWay, Delivered));
        assert!(OrderStatus::can_transition(PendingPayment, Pending));
    }

    #[test]
    fn test_takeaway_direct_delivery() {
        // 自提订单：ready 直接到 delivered
        assert!(OrderStatus::can_transition(Ready, Delivered));
    }

    #[test]
    fn test_reopen_from_any_noninitial_state() {
        assert!(OrderStatus::can_transition(Ready, Pending));
        assert!(OrderStatus::can_transition(OnWay, Pending));
        assert!(OrderStatus::can_transition(Delivered, Pending));
        assert!(OrderStatus::can_transition(PendingPayment, Pending));
    }

    #[test]
    fn test_undefined_transitions_rejected() {
        assert!(!OrderStatus::can_transition(Pending, Delivered));
        assert!(!OrderStatus::can_transition(Pending, OnWay));
        assert!(!OrderStatus::can_transition(Delivered, Ready));
        assert!(!OrderStatus::can_transition(OnWay, Ready));
        assert!(!OrderStatus::can_transition(Pending, Pending));
        assert!(OrderStatus::check_transition(Pending, OnWay).is_err());
    }

    #[test]
    fn test_admin_scenario_pending_tayyor_delivered() {
        // 管理端点 "tayyor"：pending -> ready，随后直接交付
        let mut status = Pending;
        OrderStatus::check_transition(status, Ready).unwrap();
        status = Ready;
        OrderStatus::check_transition(status, Delivered).unwrap();
        status = Delivered;
        assert_eq!(status.as_str(), "delivered");
    }

    #[test]
    fn test_parse_roundtrip() {
        for s in ["pending_payment", "pending", "ready", "on_way", "delivered"] {
            assert_eq!(OrderStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(OrderStatus::parse("cancelled").is_err());
    }
}
