//! Chat texts, keyboards and list formatting.
//!
//! Every message is sent with `parse_mode=HTML`, so user-supplied text
//! (product names, descriptions) goes through [`escape_html`].

use assorti_core::conversation::Question;
use assorti_core::{Category, Product, SaleOutcome, ValidationError};

use crate::telegram::ReplyMarkup;

// =============================================================================
// Buttons
// =============================================================================

pub const ALL_PRODUCTS: &str = "📦 Все товары";
pub const ADD_PRODUCT: &str = "➕ Добавить товар";
pub const SALE: &str = "💰 Продажа";
pub const CATEGORIES: &str = "📂 Категории";
pub const GENERATE_QR: &str = "🎯 Генерировать QR";
pub const ADD_CATEGORY: &str = "➕ Добавить категорию";
pub const BACK: &str = "⬅️ Назад";
pub const CANCEL: &str = "❌ Отмена";

pub fn main_keyboard() -> ReplyMarkup {
    ReplyMarkup::keyboard(vec![
        vec![ALL_PRODUCTS, ADD_PRODUCT],
        vec![SALE, GENERATE_QR],
        vec![CATEGORIES],
    ])
}

pub fn categories_keyboard() -> ReplyMarkup {
    ReplyMarkup::keyboard(vec![vec![ADD_CATEGORY, BACK]])
}

// =============================================================================
// Fixed Texts
// =============================================================================

pub const WELCOME: &str = "👋 <b>Добро пожаловать в панель администратора магазина!</b>\n\n\
Используйте кнопки ниже для управления товарами, категориями и продажами.";

pub const HELP: &str = "ℹ️ <b>Справка</b>\n\n\
📦 <b>Все товары</b> - список товаров с ценами и остатками\n\
➕ <b>Добавить товар</b> - пошаговое добавление товара\n\
💰 <b>Продажа</b> - продажа по QR-коду, штрих-коду или ID\n\
🎯 <b>Генерировать QR</b> - QR-код для печати этикетки\n\
📂 <b>Категории</b> - список и добавление категорий\n\n\
/cancel - отменить текущее действие";

pub const ERROR: &str = "❌ Произошла ошибка. Попробуйте еще раз.";
pub const ACCESS_DENIED: &str = "⛔ У вас нет доступа к этому боту.";
pub const CANCELLED: &str = "🚫 Действие отменено.";
pub const NOTHING_TO_CANCEL: &str = "Нет активного действия.";
pub const UNKNOWN_INPUT: &str = "🤔 Не понимаю. Используйте кнопки меню или /help.";
pub const LOADING_PRODUCTS: &str = "⏳ Загружаю товары...";
pub const NO_PRODUCTS: &str = "📦 Товаров не найдено";
pub const NO_CATEGORIES: &str = "📂 Категории не найдены";
pub const NO_CATEGORIES_FOR_PRODUCT: &str =
    "❌ Нет доступных категорий. Сначала создайте категорию.";
pub const PRODUCT_NOT_FOUND: &str = "❌ Товар не найден. Проверьте ID или штрих-код.";
pub const BAD_CATEGORY_PICK: &str = "❌ Выберите корректный номер категории";
pub const BAD_PRODUCT_PICK: &str = "❌ Выберите корректный номер товара";
pub const GENERATING_QR: &str = "⏳ Генерирую QR-код...";

/// Products listed in the QR pick message.
pub const QR_MENU_SIZE: usize = 10;

/// Telegram rejects longer messages.
pub const MAX_MESSAGE_LEN: usize = 4096;

const SEPARATOR: &str = "─────────────────";

/// Prompt for the question a conversation is waiting on.
pub fn prompt(question: Question) -> &'static str {
    match question {
        Question::ProductName => "📝 Введите название товара:",
        Question::ProductDescription => {
            "📝 Введите описание товара (или пропустите, отправив \"-\"):"
        }
        Question::ProductPrice => "💰 Введите цену товара (в рублях):",
        Question::ProductStock => "📊 Введите количество товара на складе:",
        Question::ProductCategory => "Введите номер категории:",
        Question::CategoryName => "📝 Введите название новой категории:",
        Question::CategoryDescription => {
            "📝 Введите описание категории (или пропустите, отправив \"-\"):"
        }
        Question::SaleLookup => "📱 Отправьте QR-код товара или введите ID товара для продажи:",
        Question::SaleQuantity => "Введите количество для продажи:",
        Question::QrProduct => "Введите номер товара:",
    }
}

/// Rejected input, followed by the question again.
pub fn invalid_input(err: &ValidationError, question: Question) -> String {
    format!("❌ {}\n\n{}", err, prompt(question))
}

pub fn backend_error(message: &str) -> String {
    format!("❌ {}", escape_html(message))
}

// =============================================================================
// Entities
// =============================================================================

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

pub fn product_list(products: &[Product]) -> String {
    if products.is_empty() {
        return NO_PRODUCTS.to_string();
    }

    let mut message = String::from("📦 <b>Все товары:</b>\n\n");
    for product in products {
        message.push_str(&format!("<b>{}</b>\n", escape_html(&product.name)));
        message.push_str(&format!("💰 Цена: {} руб.\n", product.price));
        message.push_str(&format!("📊 На складе: {} шт.\n", product.stock));
        if let Some(description) = &product.description {
            message.push_str(&format!("📝 {}\n", escape_html(description)));
        }
        message.push_str(&format!("ID: <code>{}</code>\n", product.id));
        message.push_str(SEPARATOR);
        message.push('\n');
    }
    message
}

pub fn product_card(product: &Product) -> String {
    let mut message = format!("<b>{}</b>\n\n", escape_html(&product.name));
    message.push_str(&format!("💰 Цена: {} руб.\n", product.price));
    message.push_str(&format!("📊 На складе: {} шт.\n", product.stock));
    if let Some(description) = &product.description {
        message.push_str(&format!("📝 Описание: {}\n", escape_html(description)));
    }
    message.push_str(&format!("ID: <code>{}</code>", product.id));
    message
}

pub fn product_found(product: &Product) -> String {
    format!(
        "✅ Товар найден:\n\n{}\n\n{}",
        product_card(product),
        prompt(Question::SaleQuantity)
    )
}

pub fn category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return NO_CATEGORIES.to_string();
    }

    let mut message = String::from("📂 <b>Категории:</b>\n\n");
    for category in categories {
        message.push_str(&format!("<b>{}</b>\n", escape_html(&category.name)));
        if let Some(description) = &category.description {
            message.push_str(&format!("📝 {}\n", escape_html(description)));
        }
        message.push_str(&format!("ID: <code>{}</code>\n", category.id));
        message.push_str(SEPARATOR);
        message.push('\n');
    }
    message
}

/// Numbered category pick for the product form.
pub fn category_menu(categories: &[Category]) -> String {
    let mut message = String::from("📂 Выберите категорию:\n\n");
    for (index, category) in categories.iter().enumerate() {
        message.push_str(&format!(
            "{}. {} (ID: {})\n",
            index + 1,
            escape_html(&category.name),
            category.id
        ));
    }
    message.push('\n');
    message.push_str(prompt(Question::ProductCategory));
    message
}

/// Numbered product pick for the QR flow. Shows the first
/// [`QR_MENU_SIZE`] products; any number up to the full count is accepted.
pub fn qr_menu(products: &[Product]) -> String {
    let mut message = String::from("🎯 <b>Выберите товар для генерации QR-кода:</b>\n\n");
    for (index, product) in products.iter().take(QR_MENU_SIZE).enumerate() {
        message.push_str(&format!("{}. {}\n", index + 1, escape_html(&product.name)));
    }
    if products.len() > QR_MENU_SIZE {
        message.push_str(&format!(
            "\n... и еще {} товаров",
            products.len() - QR_MENU_SIZE
        ));
    }
    message.push_str("\n\n");
    message.push_str(prompt(Question::QrProduct));
    message
}

pub fn product_created(product: &Product) -> String {
    format!(
        "✅ Товар успешно добавлен!\n\n<b>{}</b>\nID: <code>{}</code>",
        escape_html(&product.name),
        product.id
    )
}

pub fn category_created(category: &Category) -> String {
    format!(
        "✅ Категория успешно добавлена!\n\n<b>{}</b>\nID: <code>{}</code>",
        escape_html(&category.name),
        category.id
    )
}

pub fn sale_done(outcome: &SaleOutcome) -> String {
    format!(
        "✅ Товар успешно продан!\n\n<b>{}</b>\nКоличество: {}\nСумма: {} руб.\nОсталось на складе: {}",
        escape_html(&outcome.product.name),
        outcome.sale.quantity,
        outcome.sale.total(),
        outcome.product.stock
    )
}

pub fn qr_caption(product: &Product) -> String {
    format!(
        "<b>{}</b>\nID: <code>{}</code>",
        escape_html(&product.name),
        product.id
    )
}

/// Splits a long message on line boundaries so every part fits in one
/// Telegram message. A single line longer than `max` is cut by characters.
pub fn split_message(text: &str, max: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if current.chars().count() + line.chars().count() > max && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        if line.chars().count() > max {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(max) {
                parts.push(chunk.iter().collect());
            }
            continue;
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
