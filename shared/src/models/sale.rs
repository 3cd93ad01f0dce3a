//! Sale Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::Product;

/// Payment method (closed set)
///
/// Wire names follow the till's own values; English aliases are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "dinheiro", alias = "cash")]
    Cash,
    #[serde(rename = "cartão", alias = "cartao", alias = "card")]
    Card,
    #[default]
    #[serde(rename = "pix", alias = "instant-transfer")]
    InstantTransfer,
}

impl PaymentMethod {
    /// Label printed on the receipt
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Card => "Cartão",
            PaymentMethod::InstantTransfer => "Pix",
        }
    }
}

/// One line of a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub quantity: u32,
    pub product: Product,
    /// Unit price * quantity, computed when the line was rung up
    pub total_price: Decimal,
}

impl SaleLine {
    /// Create a line, computing its total from the product's unit price
    pub fn new(quantity: u32, product: Product) -> Self {
        let total_price = product.price * Decimal::from(quantity);
        Self {
            quantity,
            product,
            total_price,
        }
    }
}

/// Finalized sale record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items: Vec<SaleLine>,
    pub total: Decimal,
}

impl Sale {
    /// Sum of the line totals
    pub fn computed_total(&self) -> Decimal {
        self.items.iter().map(|line| line.total_price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_is_computed() {
        let line = SaleLine::new(3, Product::new(1, "Pão", Decimal::new(250, 2)));
        assert_eq!(line.total_price, Decimal::new(750, 2));
    }

    #[test]
    fn test_deserialize_sale() {
        let json = r#"{
            "id": 42,
            "created_at": "2024-01-01T10:00:00Z",
            "client_name": "Maria",
            "payment_method": "cartão",
            "items": [
                {"quantity": 2, "product": {"id": 7, "name": "Café", "price": 4.5}, "total_price": 9.0}
            ],
            "total": 9.0
        }"#;

        let sale: Sale = serde_json::from_str(json).unwrap();
        assert_eq!(sale.id, 42);
        assert_eq!(sale.payment_method, PaymentMethod::Card);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].product.name, "Café");
        assert_eq!(sale.computed_total(), Decimal::new(9, 0));
    }

    #[test]
    fn test_payment_method_aliases() {
        let cash: PaymentMethod = serde_json::from_str(r#""cash""#).unwrap();
        let pix: PaymentMethod = serde_json::from_str(r#""instant-transfer""#).unwrap();
        assert_eq!(cash, PaymentMethod::Cash);
        assert_eq!(pix, PaymentMethod::InstantTransfer);
        assert_eq!(serde_json::to_string(&PaymentMethod::Card).unwrap(), r#""cartão""#);
    }

    #[test]
    fn test_defaults() {
        let json = r#"{"id": 1, "created_at": "2024-01-01T10:00:00Z", "total": 0}"#;
        let sale: Sale = serde_json::from_str(json).unwrap();
        assert!(sale.client_name.is_empty());
        assert!(sale.items.is_empty());
        assert_eq!(sale.payment_method, PaymentMethod::InstantTransfer);
        assert_eq!(PaymentMethod::InstantTransfer.label(), "Pix");
    }
}
