//! Order receipt.
//!
//! A plain value the frontend renders (or saves as an image). `Display`
//! gives a text version for emails and logs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{FulfillmentMethod, Order, OrderItem, PaymentMethod};
use crate::PHONE_COUNTRY_CODE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub store_name: String,
    pub order_id: String,
    #[ts(as = "String")]
    pub placed_at: DateTime<Utc>,
    pub customer_email: String,
    /// With country code, e.g. `+971 501234567`.
    pub customer_phone: String,
    pub fulfillment: FulfillmentMethod,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub coupon_code: Option<String>,
    pub discount: Money,
    pub delivery_fee: Money,
    pub gift_fee: Money,
    pub gift_note: Option<String>,
    pub total: Money,
    /// Driver map link pulled from the order notes, if any.
    pub map_link: Option<String>,
}

impl Receipt {
    pub fn new(store_name: &str, order: &Order, items: &[OrderItem]) -> Self {
        let lines: Vec<ReceiptLine> = items
            .iter()
            .map(|item| ReceiptLine {
                name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total(),
            })
            .collect();

        let map_link = order
            .notes
            .lines()
            .find_map(|line| line.strip_prefix("Map: "))
            .map(str::to_string);

        Receipt {
            store_name: store_name.to_string(),
            order_id: order.id.clone(),
            placed_at: order.created_at,
            customer_email: order.customer_email.clone(),
            customer_phone: format!("{} {}", PHONE_COUNTRY_CODE, order.customer_phone),
            fulfillment: order.fulfillment,
            address: order.address.clone(),
            payment_method: order.payment_method,
            subtotal: lines.iter().map(|l| l.line_total).sum(),
            lines,
            coupon_code: order.coupon_code.clone(),
            discount: order.discount,
            delivery_fee: order.delivery_fee,
            gift_fee: order.gift_fee,
            gift_note: order.gift_note.clone(),
            total: order.total,
            map_link,
        }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.store_name)?;
        writeln!(f, "Order {}", self.order_id)?;
        writeln!(f, "{}", self.placed_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "{} / {}", self.customer_email, self.customer_phone)?;
        writeln!(f, "{}", self.address)?;
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "{} x{}  {}", line.name, line.quantity, line.line_total)?;
        }
        writeln!(f)?;
        writeln!(f, "Subtotal  {}", self.subtotal)?;
        if self.discount.is_positive() {
            match &self.coupon_code {
                Some(code) => writeln!(f, "Discount ({})  -{}", code, self.discount)?,
                None => writeln!(f, "Discount  -{}", self.discount)?,
            }
        }
        if self.delivery_fee.is_positive() {
            writeln!(f, "Delivery  {}", self.delivery_fee)?;
        }
        if self.gift_fee.is_positive() {
            writeln!(f, "Gift wrap  {}", self.gift_fee)?;
        }
        writeln!(f, "Total  {}", self.total)?;
        write!(f, "Payment: {}", self.payment_method.as_str())
    }
}
