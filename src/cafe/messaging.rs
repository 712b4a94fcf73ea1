//! Telegram 通知：订单状态变化时给下单用户发乌兹别克语消息
//!
//! 单向推送，通过机器人 HTTP API 的 sendMessage 发出，HTML 格式。

use crate::cafe::order::status::OrderStatus;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{error, info, warn};

pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct SendMessageResp {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, bot_token: String) -> Self {
        Self {
            client,
            bot_token,
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }

    /// 测试用：指向本地假服务器
    #[cfg(test)]
    pub fn with_api_base_url(mut self, api_base_url: String) -> Self {
        self.api_base_url = api_base_url;
        self
    }

    /// 给下单用户推送状态消息。没有对应模板的状态返回错误。
    pub async fn notify_status(
        &self,
        telegram_user_id: i64,
        order_id: &str,
        product_name: &str,
        status: OrderStatus,
        order_type: &str,
    ) -> Result<()> {
        let text = render_status_message(order_id, product_name, status, order_type)
            .ok_or_else(|| anyhow::anyhow!("状态 {} 没有通知模板", status.as_str()))?;

        let url = format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": telegram_user_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await
            .context("发送 Telegram 消息失败")?;

        let resp: SendMessageResp = response
            .json()
            .await
            .context("解析 Telegram 响应失败")?;
        if !resp.ok {
            let desc = resp.description.unwrap_or_default();
            // 用户拉黑机器人是常态，降级为 warn
            if desc.contains("blocked") {
                warn!("[Telegram] ⚠️ 用户 {} 已拉黑机器人", telegram_user_id);
            } else {
                error!("[Telegram] ❌ 推送失败: {}", desc);
            }
            anyhow::bail!("Telegram 推送失败: {}", desc);
        }

        info!(
            "[Telegram] ✅ 已通知用户 {}，订单 {}，状态 {}",
            telegram_user_id,
            order_id,
            status.as_str()
        );
        Ok(())
    }
}

/// 渲染状态模板。Ready 和 Delivered 按订单类型细分，
/// 未知类型回退到 delivery 文案。
pub fn render_status_message(
    order_id: &str,
    product_name: &str,
    status: OrderStatus,
    order_type: &str,
) -> Option<String> {
    let display_id: String = order_id.chars().take(8).collect();
    let product = if product_name.is_empty() {
        "Taomlar"
    } else {
        product_name
    };

    let text = match status {
        OrderStatus::Pending => format!(
            "✨ <b>Yangi buyurtma qabul qilindi!</b>\n\n\
             🆔 <b>Buyurtma:</b> <code>{display_id}</code>\n\
             🍔 <b>Mahsulot:</b> {product}\n\
             ⏳ <b>Holat:</b> Tasdiqlandi\n\n\
             <i>Tez orada taomingizni tayyorlashni boshlaymiz!</i>"
        ),
        OrderStatus::Ready => match order_type {
            "takeaway" => format!(
                "🍳 <b>Buyurtmangiz tayyor bo'ldi!</b>\n\n\
                 🆔 <b>Buyurtma:</b> <code>{display_id}</code>\n\
                 🍔 <b>Mahsulot:</b> {product}\n\
                 🛍️ <b>Holat:</b> Tayyor\n\n\
                 <i>Kelib olib ketishingiz mumkin!</i>"
            ),
            "preorder" => format!(
                "🍳 <b>Broningiz tayyor!</b>\n\n\
                 🆔 <b>ID:</b> <code>{display_id}</code>\n\
                 🍔 <b>Mahsulot:</b> {product}\n\
                 📅 <b>Holat:</b> Stolingiz tayyor\n\n\
                 <i>Sizni kutmoqdamiz!</i>"
            ),
            _ => format!(
                "🍳 <b>Buyurtmangiz tayyor bo'ldi!</b>\n\n\
                 🆔 <b>Buyurtma:</b> <code>{display_id}</code>\n\
                 🍔 <b>Mahsulot:</b> {product}\n\
                 🏃‍♂️ <b>Holat:</b> Dastavkaga berildi\n\n\
                 <i>Dastavkachi hozir yo'lga chiqadi.</i>"
            ),
        },
        OrderStatus::OnWay => format!(
            "🚚 <b>Buyurtmangiz yo'lda!</b>\n\n\
             🆔 <b>Buyurtma:</b> <code>{display_id}</code>\n\
             🍔 <b>Mahsulot:</b> {product}\n\
             📍 <b>Holat:</b> Yetkazilmoqda\n\n\
             <i>Iltimos, kuting, dastavkachi yaqin orada yetib boradi.</i>"
        ),
        OrderStatus::Delivered => match order_type {
            "takeaway" => format!(
                "✅ <b>Tabriklaymiz! Buyurtma olib ketildi!</b>\n\n\
                 🆔 <b>Buyurtma:</b> <code>{display_id}</code>\n\
                 🍔 <b>Mahsulot:</b> {product}\n\
                 🏁 <b>Holat:</b> Yakunlandi\n\n\
                 <b>Yoqimli ishtaha! 🍽️</b>\n\
                 <i>Bizni tanlaganingiz uchun rahmat!</i>"
            ),
            "preorder" => format!(
                "✅ <b>Tabriklaymiz! Tashrifingiz yakunlandi!</b>\n\n\
                 🆔 <b>ID:</b> <code>{display_id}</code>\n\
                 🏁 <b>Holat:</b> Yakunlandi\n\n\
                 <i>Tashrifingiz uchun rahmat! Yana kutib qolamiz! 🍽️</i>"
            ),
            _ => format!(
                "✅ <b>Tabriklaymiz! Buyurtma yetkazildi!</b>\n\n\
                 🆔 <b>Buyurtma:</b> <code>{display_id}</code>\n\
                 🍔 <b>Mahsulot:</b> {product}\n\
                 🏁 <b>Holat:</b> Yakunlandi\n\n\
                 <b>Yoqimli ishtaha! 🍽️</b>\n\
                 <i>Bizni tanlaganingiz uchun rahmat!</i>"
            ),
        },
        // 付款待确认阶段不打扰用户
        OrderStatus::PendingPayment => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_varies_by_order_type() {
        let delivery =
            render_status_message("aaaabbbbcccc", "Lavash", OrderStatus::Ready, "delivery").unwrap();
        assert!(delivery.contains("Dastavkaga berildi"));
        assert!(delivery.contains("<code>aaaabbbb</code>"));

        let takeaway =
            render_status_message("aaaabbbbcccc", "Lavash", OrderStatus::Ready, "takeaway").unwrap();
        assert!(takeaway.contains("Kelib olib ketishingiz mumkin!"));

        // 未知类型回退到 delivery 文案
        let unknown = render_status_message("id", "Lavash", OrderStatus::Ready, "").unwrap();
        assert!(unknown.contains("Dastavkaga berildi"));
    }

    #[test]
    fn test_empty_product_falls_back() {
        let text = render_status_message("id", "", OrderStatus::Pending, "delivery").unwrap();
        assert!(text.contains("Taomlar"));
    }

    #[test]
    fn test_pending_payment_has_no_template() {
        assert!(render_status_message("id", "Kofe", OrderStatus::PendingPayment, "delivery").is_none());
    }
}
