//! Zone ticket renderer
//!
//! Renders the items an order sends to one zone into ESC/POS bytes.
//! Output depends only on its input: date and time come from the order's
//! creation time in the configured timezone.

use chrono_tz::Tz;
use comanda_printer::{Column, EscPosBuilder};
use rust_decimal::Decimal;
use shared::models::{Order, OrderItem};
use thiserror::Error;

/// Quantity column
const QTY_WIDTH: usize = 5;
/// Price column
const PRICE_WIDTH: usize = 12;
/// Amount column of the TOTAL row
const TOTAL_WIDTH: usize = 16;
/// Characters of the order id printed on the ticket
const ORDER_ID_CHARS: usize = 6;

pub const COMPANION_NOTICE: &str = "Este ticket va acompañado de otro ticket en barra";
pub const DEFAULT_ITEM_NAME: &str = "Producto";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Amounts of item {0} are out of range")]
    AmountOutOfRange(String),
}

/// Everything printed on one zone ticket
#[derive(Debug, Clone, Copy)]
pub struct TicketContext<'a> {
    pub business_name: &'a str,
    pub zone_name: &'a str,
    pub order: &'a Order,
    pub items: &'a [&'a OrderItem],
    pub companion_notice: bool,
}

/// Zone ticket renderer
#[derive(Debug, Clone)]
pub struct TicketRenderer {
    width: usize,
    timezone: Tz,
}

impl TicketRenderer {
    /// Create a new renderer with specified paper width and timezone
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize, timezone: Tz) -> Self {
        Self { width, timezone }
    }

    fn desc_width(&self) -> usize {
        self.width.saturating_sub(QTY_WIDTH + PRICE_WIDTH)
    }

    /// Render a zone ticket to ESC/POS bytes
    pub fn render(&self, ctx: &TicketContext<'_>) -> Result<Vec<u8>, RenderError> {
        let mut b = EscPosBuilder::new(self.width);

        self.render_header(&mut b, ctx);
        let total = self.render_items(&mut b, ctx.items)?;
        self.render_footer(&mut b, ctx, total);

        Ok(b.build())
    }

    fn render_header(&self, b: &mut EscPosBuilder, ctx: &TicketContext<'_>) {
        b.center();
        b.sep_double();

        // Business banner
        b.double_height();
        b.bold();
        b.line(&ctx.business_name.to_uppercase());
        b.bold_off();
        b.normal();
        b.sep_double();

        if ctx.order.cash_pending {
            b.double_height();
            b.bold();
            b.sep_single();
            b.line("ATENCIÓN");
            b.line("PEDIDO PENDIENTE DE PAGO");
            b.line("CONTACTAR CON EL CLIENTE");
            b.sep_single();
            b.bold_off();
            b.normal();
        }

        b.line(&format!("ZONA: {}", ctx.zone_name));
        b.sep_double();
        b.left();

        let (date, time) = format_timestamp(ctx.order.created_at, self.timezone);
        b.two_columns(&format!("Fecha: {date}"), &format!("Hora: {time}"));

        let table = ctx
            .order
            .table_number
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("N/A");
        b.two_columns(
            &format!("Mesa: {table}"),
            &format!("Pedido: {}", short_order_id(&ctx.order.id)),
        );
        b.sep_double();

        b.bold();
        b.columns(&[
            Column::left("CANT", QTY_WIDTH),
            Column::left("DESCRIPCIÓN", self.desc_width()),
            Column::right("PRECIO", PRICE_WIDTH),
        ]);
        b.bold_off();
        b.sep_single();
    }

    /// Render item rows. Returns the sum of the line totals.
    fn render_items(&self, b: &mut EscPosBuilder, items: &[&OrderItem]) -> Result<Decimal, RenderError> {
        let mut total = Decimal::ZERO;

        for item in items {
            let out_of_range = || RenderError::AmountOutOfRange(item.id.clone());
            let line_total = item.computed_total().ok_or_else(out_of_range)?;
            total = total.checked_add(line_total).ok_or_else(out_of_range)?;

            let name = if item.name.trim().is_empty() {
                DEFAULT_ITEM_NAME
            } else {
                item.name.as_str()
            };
            b.columns(&[
                Column::left(&item.quantity.to_string(), QTY_WIDTH),
                Column::left(name, self.desc_width()),
                Column::right(&format_money(line_total), PRICE_WIDTH),
            ]);

            let notes = item.notes.as_deref().filter(|n| !n.trim().is_empty());
            let has_details = !item.extras.is_empty() || !item.modifications.is_empty() || notes.is_some();
            if !has_details {
                b.sep_single();
                continue;
            }

            b.font_b();
            for extra in &item.extras {
                // covered by the line total
                let amount = extra.amount().unwrap_or_default();
                let label = if extra.quantity > 1 {
                    format!("+ {} x{}", extra.name, extra.quantity)
                } else {
                    format!("+ {}", extra.name)
                };
                b.columns(&[
                    Column::left("", QTY_WIDTH),
                    Column::left(&label, self.desc_width()),
                    Column::right(&format_money(amount), PRICE_WIDTH),
                ]);
            }
            for modification in &item.modifications {
                b.columns(&[
                    Column::left("", QTY_WIDTH),
                    Column::left(&format!("- {modification}"), self.desc_width()),
                ]);
            }
            if let Some(note) = notes {
                b.bold();
                b.columns(&[
                    Column::left("", QTY_WIDTH),
                    Column::left(&format!("NOTA: {note}"), self.width.saturating_sub(QTY_WIDTH)),
                ]);
                b.bold_off();
            }
            b.normal();
            b.sep_single();
        }

        Ok(total)
    }

    fn render_footer(&self, b: &mut EscPosBuilder, ctx: &TicketContext<'_>, total: Decimal) {
        b.double_height();
        b.bold();
        b.columns(&[
            Column::left("", QTY_WIDTH),
            Column::left("TOTAL:", self.width.saturating_sub(QTY_WIDTH + TOTAL_WIDTH)),
            Column::right(&format_money(total), TOTAL_WIDTH),
        ]);
        b.bold_off();
        b.normal();

        if ctx.companion_notice {
            b.sep_double();
            b.bold();
            b.center();
            b.line(COMPANION_NOTICE);
            b.bold_off();
            b.left();
        }

        if let Some(notes) = ctx.order.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            b.sep_double();
            b.bold();
            b.line("NOTA GENERAL:");
            b.bold_off();
            b.line(notes);
        }

        b.sep_double();
        b.center();
        b.line("Gracias por su compra");
        b.newline();
        b.cut();
    }
}

impl Default for TicketRenderer {
    fn default() -> Self {
        Self::new(48, chrono_tz::Europe::Madrid)
    }
}

/// Two decimals followed by the euro sign
fn format_money(amount: Decimal) -> String {
    format!("{:.2}€", amount.round_dp(2))
}

/// Date (dd/mm/yyyy) and time (HH:MM) of a unix timestamp (millis)
fn format_timestamp(ts: i64, tz: Tz) -> (String, String) {
    match chrono::DateTime::from_timestamp_millis(ts) {
        Some(dt) => {
            let local = dt.with_timezone(&tz);
            (
                local.format("%d/%m/%Y").to_string(),
                local.format("%H:%M").to_string(),
            )
        }
        None => ("--/--/----".to_string(), "--:--".to_string()),
    }
}

/// Last characters of the order id
fn short_order_id(id: &str) -> &str {
    let count = id.chars().count();
    if count <= ORDER_ID_CHARS {
        return id;
    }
    let start = id
        .char_indices()
        .nth(count - ORDER_ID_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &id[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderExtra;
    use std::str::FromStr;

    const CUT: [u8; 4] = [0x1D, 0x56, 0x41, 0x10];

    fn order() -> Order {
        Order {
            id: "65ae2f0c9b1e4a0012345678".to_string(),
            business_id: 1,
            table_number: Some("4".to_string()),
            notes: None,
            cash_pending: false,
            total: Decimal::from_str("18.80").unwrap(),
            created_at: 1705912335000, // 2024-01-22 08:32:15 UTC
        }
    }

    fn item(name: &str, quantity: u32, price: &str) -> OrderItem {
        OrderItem {
            id: name.to_string(),
            product_id: None,
            name: name.to_string(),
            category_id: Some(1),
            quantity,
            unit_price: Decimal::from_str(price).unwrap(),
            extras: vec![],
            modifications: vec![],
            notes: None,
            line_total: None,
        }
    }

    fn text(data: &[u8]) -> String {
        String::from_utf8_lossy(data).into_owned()
    }

    fn render(order: &Order, items: &[&OrderItem], zone: &str, companion: bool) -> Vec<u8> {
        TicketRenderer::default()
            .render(&TicketContext {
                business_name: "La Tasca",
                zone_name: zone,
                order,
                items,
                companion_notice: companion,
            })
            .unwrap()
    }

    #[test]
    fn test_kitchen_and_bar_tickets() {
        let order = order();
        let pizza = item("Pizza Margherita", 2, "8.00");
        let cola = item("Coca Cola", 1, "2.80");

        let kitchen = text(&render(&order, &[&pizza], "Cocina", true));
        let row = format!("{:<5}{:<31}{:>12}", "2", "Pizza Margherita", "16.00EUR");
        assert!(kitchen.contains(&row));
        assert!(kitchen.contains(&format!("{:<5}{:<27}{:>16}", "", "TOTAL:", "16.00EUR")));
        assert!(kitchen.contains("Este ticket va acompanado de otro ticket en barra"));
        assert!(kitchen.contains("ZONA: Cocina"));

        let bar = text(&render(&order, &[&cola], "Barra", false));
        assert!(bar.contains(&format!("{:<5}{:<31}{:>12}", "1", "Coca Cola", "2.80EUR")));
        assert!(!bar.contains("acompanado"));
    }

    #[test]
    fn test_header_and_framing() {
        let order = order();
        let pizza = item("Pizza", 1, "8.00");
        let data = render(&order, &[&pizza], "Cocina", false);

        assert!(data.starts_with(&[0x1B, 0x40]));
        assert!(data.ends_with(&CUT));

        let s = text(&data);
        assert!(s.contains("LA TASCA"));
        assert!(s.contains("Fecha: 22/01/2024"));
        assert!(s.contains("Hora: 09:32"));
        assert!(s.contains("Mesa: 4"));
        assert!(s.contains("Pedido: 345678"));
        assert!(s.contains("DESCRIPCION"));
        assert!(!s.contains("PENDIENTE DE PAGO"));
    }

    #[test]
    fn test_section_order() {
        let mut order = order();
        order.cash_pending = true;
        order.notes = Some("Sin prisa".to_string());
        let pizza = item("Pizza", 1, "8.00");
        let s = text(&render(&order, &[&pizza], "Cocina", true));

        let positions: Vec<usize> = [
            "LA TASCA",
            "PEDIDO PENDIENTE DE PAGO",
            "ZONA: Cocina",
            "Fecha:",
            "Mesa:",
            "CANT",
            "Pizza",
            "TOTAL:",
            "Este ticket",
            "NOTA GENERAL:",
            "Sin prisa",
            "Gracias por su compra",
        ]
        .iter()
        .map(|needle| s.find(needle).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(s.contains("ATENCION"));
    }

    #[test]
    fn test_item_details() {
        let order = order();
        let mut burger = item("Hamburguesa", 1, "9.50");
        burger.extras = vec![
            OrderExtra {
                name: "Queso".into(),
                price: Decimal::from_str("1.50").unwrap(),
                quantity: 2,
            },
            OrderExtra {
                name: "Bacon".into(),
                price: Decimal::from_str("2.00").unwrap(),
                quantity: 1,
            },
        ];
        burger.modifications = vec!["sin cebolla".into()];
        burger.notes = Some("muy hecha".into());

        let s = text(&render(&order, &[&burger], "Cocina", false));
        assert!(s.contains(&format!("{:<5}{:<31}{:>12}", "1", "Hamburguesa", "14.50EUR")));
        assert!(s.contains(&format!("{:<5}{:<31}{:>12}", "", "+ Queso x2", "3.00EUR")));
        assert!(s.contains(&format!("{:<5}{:<31}{:>12}", "", "+ Bacon", "2.00EUR")));
        assert!(s.contains("     - sin cebolla"));
        assert!(s.contains("     NOTA: muy hecha"));
    }

    #[test]
    fn test_fallbacks_and_truncation() {
        let mut order = order();
        order.table_number = None;
        let unnamed = item("", 1, "1.00");
        let long = item("Ensalada de la casa con queso de cabra y nueces", 1, "7.00");

        let s = text(&render(&order, &[&unnamed, &long], "Cocina", false));
        assert!(s.contains("Mesa: N/A"));
        assert!(s.contains("Producto"));
        assert!(s.contains("Ensalada de la casa con ques..."));
    }

    #[test]
    fn test_deterministic() {
        let order = order();
        let pizza = item("Pizza", 3, "8.00");
        assert_eq!(
            render(&order, &[&pizza], "Cocina", true),
            render(&order, &[&pizza], "Cocina", true)
        );
    }

    #[test]
    fn test_overflowing_amounts_are_an_error() {
        let order = order();
        let huge = item("huge", 3, "30000000000000000000000000000");
        let ctx = TicketContext {
            business_name: "La Tasca",
            zone_name: "Cocina",
            order: &order,
            items: &[&huge],
            companion_notice: false,
        };
        assert_eq!(
            TicketRenderer::default().render(&ctx),
            Err(RenderError::AmountOutOfRange("huge".to_string()))
        );

        // lines that fit but whose sum does not
        let a = item("a", 1, "50000000000000000000000000000");
        let b = item("b", 1, "50000000000000000000000000000");
        let ctx = TicketContext {
            items: &[&a, &b],
            ..ctx
        };
        assert_eq!(
            TicketRenderer::default().render(&ctx),
            Err(RenderError::AmountOutOfRange("b".to_string()))
        );
    }

    #[test]
    fn test_short_order_id() {
        assert_eq!(short_order_id("abc"), "abc");
        assert_eq!(short_order_id("0123456789"), "456789");
    }
}
