//! Order and parts-lookup message rendering.
//!
//! Messages are delivered with Telegram's HTML parse mode, so every
//! user-supplied fragment is escaped before it is interpolated.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::catalog::Product;
use crate::types::{ContactDetails, Locale, ProductId};

/// Payload accepted by the order intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

/// Header prepended to parts-lookup requests.
pub const SELECTION_HEADER: &str = "Заявка на подбор запчастей (VIN)";

/// Brand assumed when the lookup form leaves it blank.
pub const DEFAULT_BRAND: &str = "Tesla";

/// Escape the characters Telegram's HTML mode treats as markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

struct Labels {
    quantity: &'static str,
    sum: &'static str,
    total: &'static str,
    name: &'static str,
    city: &'static str,
    positions: &'static str,
    comment: &'static str,
    full_name: &'static str,
    extra: &'static str,
}

const fn labels(locale: Locale) -> Labels {
    match locale {
        Locale::Ru => Labels {
            quantity: "кол-во",
            sum: "сумма",
            total: "Итого",
            name: "Имя",
            city: "Город",
            positions: "Позиции",
            comment: "Комментарий",
            full_name: "ФИО",
            extra: "Дополнительная информация",
        },
        Locale::Uk => Labels {
            quantity: "кількість",
            sum: "сума",
            total: "Разом",
            name: "Ім'я",
            city: "Місто",
            positions: "Позиції",
            comment: "Коментар",
            full_name: "ПІБ",
            extra: "Додаткова інформація",
        },
    }
}

/// One line per resolved cart item, newline-delimited.
#[must_use]
pub fn render_positions(locale: Locale, lines: &[(CartItem, Product)]) -> String {
    let l = labels(locale);
    lines
        .iter()
        .map(|(item, product)| {
            format!(
                "{} | {}: {} | {}: {}₴",
                escape_html(&product.title),
                l.quantity,
                item.quantity,
                l.sum,
                product.price.line_total(item.quantity)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Positions followed by the localized total line.
#[must_use]
pub fn render_cart_summary(locale: Locale, lines: &[(CartItem, Product)], total: i64) -> String {
    let l = labels(locale);
    format!("{}\n\n{}: {total}₴", render_positions(locale, lines), l.total)
}

/// Full checkout message: contact details wrapped around the cart summary.
#[must_use]
pub fn render_checkout_message(
    locale: Locale,
    contact: &ContactDetails,
    lines: &[(CartItem, Product)],
    total: i64,
) -> String {
    let l = labels(locale);
    let mut out = String::new();
    let _ = writeln!(out, "{}: {}", l.name, escape_html(&contact.name));
    let _ = writeln!(out, "Телефон: {}", escape_html(contact.phone.as_str()));
    let _ = writeln!(out, "{}: {}", l.city, escape_html(&contact.city));
    let _ = write!(
        out,
        "\n{}:\n{}\n\n{}: {}",
        l.positions,
        render_cart_summary(locale, lines, total),
        l.comment,
        escape_html(&contact.comment)
    );
    out
}

/// Parts-lookup form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionRequest {
    pub brand: String,
    pub model: String,
    pub phone: String,
    pub full_name: String,
    pub email: String,
    pub extra: String,
}

/// Render a parts-lookup request, headed by [`SELECTION_HEADER`].
#[must_use]
pub fn render_selection_message(locale: Locale, request: &SelectionRequest) -> String {
    let l = labels(locale);
    let brand = match request.brand.trim() {
        "" => DEFAULT_BRAND,
        b => b,
    };
    format!(
        "{SELECTION_HEADER}\n\nМарка: {}\nМодель: {}\nТелефон: {}\n{}: {}\nE-mail: {}\n\n{}:\n{}",
        escape_html(brand),
        escape_html(&request.model),
        escape_html(&request.phone),
        l.full_name,
        escape_html(&request.full_name),
        escape_html(&request.email),
        l.extra,
        escape_html(&request.extra)
    )
}
