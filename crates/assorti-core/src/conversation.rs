//! # Conversation State Machine
//!
//! Drives the admin bot's multi-step forms. Pure: it never talks to the
//! backend. When a step needs live data (the category list, a product
//! lookup) it returns a [`Transition`] telling the caller what to fetch,
//! and the caller feeds the result back in.
//!
//! ## Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AddProduct:  Name ─► Description ─► Price ─► Stock ─► Category ─► ✔    │
//! │                       ("-" skips)                  │        │           │
//! │                                     FetchCategories┘        │           │
//! │                                         ResolveCategory(text)┘          │
//! │                                                                         │
//! │  AddCategory: Name ─► Description ─► ✔                                  │
//! │                                                                         │
//! │  Sale:        Lookup ─► Quantity ─► ✔                                   │
//! │                 └ LookupProduct(qr | barcode | id)                      │
//! │                                                                         │
//! │  GenerateQr:  Pick ─► ✔                                                 │
//! │                 └ ResolveProduct(text)                                  │
//! │                                                                         │
//! │  ✔ = Transition::Submit(..). The caller drops the session afterwards,  │
//! │      whether the backend call succeeds or not.                         │
//! │  Invalid input = Err(ValidationError), state unchanged.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Conversation` is `Serialize + Deserialize` so a session store can keep
//! it anywhere.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::qr::{self, ProductQr};
use crate::types::{Category, CategoryPayload, Product, ProductPayload};
use crate::validation::{
    parse_choice, parse_price, parse_quantity, parse_stock, validate_category_name,
    validate_description, validate_product_name,
};

/// Typed by the user to leave a description empty.
pub const SKIP: &str = "-";

// =============================================================================
// State
// =============================================================================

/// One user's in-progress form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum Conversation {
    AddProduct(ProductForm),
    AddCategory(CategoryForm),
    Sale(SaleForm),
    GenerateQr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStep {
    Name,
    Description,
    Price,
    Stock,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductForm {
    pub step: ProductStep,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStep {
    Name,
    Description,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryForm {
    pub step: CategoryStep,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStep {
    Lookup,
    Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleForm {
    pub step: SaleStep,
    pub product_id: Option<String>,
}

// =============================================================================
// Outputs
// =============================================================================

/// What the bot should ask next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    ProductName,
    ProductDescription,
    ProductPrice,
    ProductStock,
    ProductCategory,
    CategoryName,
    CategoryDescription,
    SaleLookup,
    SaleQuantity,
    QrProduct,
}

/// How the sale lookup text should be resolved, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLookup {
    /// The trimmed text as typed or scanned.
    pub text: String,
    /// Set when the text is a `PRODUCT:<id>:<name>` payload.
    pub qr: Option<ProductQr>,
}

/// The completed form, ready for one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Product(ProductPayload),
    Category(CategoryPayload),
    Sale { product_id: String, quantity: i64 },
    Qr { product_id: String },
}

/// Result of feeding one message into the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Input accepted; ask the next question.
    Ask(Question),
    /// Stock accepted. Fetch categories and show them numbered; abort the
    /// flow if there are none.
    FetchCategories,
    /// A category number was typed. Re-fetch categories and call
    /// [`Conversation::select_category`].
    ResolveCategory(String),
    /// Resolve the product, then call [`Conversation::product_found`].
    LookupProduct(ProductLookup),
    /// A product number was typed. Re-fetch products and call
    /// [`Conversation::select_product`].
    ResolveProduct(String),
    /// Form complete.
    Submit(Submission),
}

// =============================================================================
// Constructors
// =============================================================================

impl Conversation {
    pub fn add_product() -> (Self, Question) {
        (
            Conversation::AddProduct(ProductForm {
                step: ProductStep::Name,
                name: None,
                description: None,
                price: None,
                stock: None,
            }),
            Question::ProductName,
        )
    }

    pub fn add_category() -> (Self, Question) {
        (
            Conversation::AddCategory(CategoryForm {
                step: CategoryStep::Name,
                name: None,
            }),
            Question::CategoryName,
        )
    }

    pub fn sale() -> (Self, Question) {
        (
            Conversation::Sale(SaleForm {
                step: SaleStep::Lookup,
                product_id: None,
            }),
            Question::SaleLookup,
        )
    }

    pub fn generate_qr() -> (Self, Question) {
        (Conversation::GenerateQr, Question::QrProduct)
    }

    /// The question the conversation is currently waiting on.
    pub fn question(&self) -> Question {
        match self {
            Conversation::AddProduct(form) => match form.step {
                ProductStep::Name => Question::ProductName,
                ProductStep::Description => Question::ProductDescription,
                ProductStep::Price => Question::ProductPrice,
                ProductStep::Stock => Question::ProductStock,
                ProductStep::Category => Question::ProductCategory,
            },
            Conversation::AddCategory(form) => match form.step {
                CategoryStep::Name => Question::CategoryName,
                CategoryStep::Description => Question::CategoryDescription,
            },
            Conversation::Sale(form) => match form.step {
                SaleStep::Lookup => Question::SaleLookup,
                SaleStep::Quantity => Question::SaleQuantity,
            },
            Conversation::GenerateQr => Question::QrProduct,
        }
    }

    // =========================================================================
    // Advancing
    // =========================================================================

    /// Feeds one text message into the current step.
    ///
    /// On `Err` the state is untouched and the same question stands.
    pub fn advance(&mut self, text: &str) -> Result<Transition, ValidationError> {
        let text = text.trim();

        match self {
            Conversation::AddProduct(form) => form.advance(text),
            Conversation::AddCategory(form) => form.advance(text),
            Conversation::Sale(form) => form.advance(text),
            Conversation::GenerateQr => Ok(Transition::ResolveProduct(text.to_string())),
        }
    }

    /// Finishes the product form with the category picked from the live
    /// list.
    pub fn select_category(
        &self,
        input: &str,
        categories: &[Category],
    ) -> Result<Submission, ValidationError> {
        let Conversation::AddProduct(form) = self else {
            return Err(ValidationError::InvalidChoice { max: 0 });
        };
        let index = parse_choice(input, categories.len())?;

        Ok(Submission::Product(ProductPayload {
            name: form.name.clone(),
            description: form.description.clone(),
            price: form.price,
            stock: form.stock,
            category_id: Some(categories[index].id.clone()),
            barcode: None,
            image: None,
        }))
    }

    /// Records the product resolved by the sale lookup and moves on to the
    /// quantity question.
    pub fn product_found(&mut self, product: &Product) -> Question {
        if let Conversation::Sale(form) = self {
            form.product_id = Some(product.id.clone());
            form.step = SaleStep::Quantity;
        }
        self.question()
    }

    /// Finishes the QR flow with the product picked from the live list.
    pub fn select_product(
        &self,
        input: &str,
        products: &[Product],
    ) -> Result<Submission, ValidationError> {
        let index = parse_choice(input, products.len())?;
        Ok(Submission::Qr {
            product_id: products[index].id.clone(),
        })
    }
}

impl ProductForm {
    fn advance(&mut self, text: &str) -> Result<Transition, ValidationError> {
        match self.step {
            ProductStep::Name => {
                self.name = Some(validate_product_name(text)?);
                self.step = ProductStep::Description;
                Ok(Transition::Ask(Question::ProductDescription))
            }
            ProductStep::Description => {
                self.description = if text == SKIP {
                    None
                } else {
                    validate_description(Some(text))?
                };
                self.step = ProductStep::Price;
                Ok(Transition::Ask(Question::ProductPrice))
            }
            ProductStep::Price => {
                self.price = Some(parse_price(text)?);
                self.step = ProductStep::Stock;
                Ok(Transition::Ask(Question::ProductStock))
            }
            ProductStep::Stock => {
                self.stock = Some(parse_stock(text)?);
                self.step = ProductStep::Category;
                Ok(Transition::FetchCategories)
            }
            ProductStep::Category => Ok(Transition::ResolveCategory(text.to_string())),
        }
    }
}

impl CategoryForm {
    fn advance(&mut self, text: &str) -> Result<Transition, ValidationError> {
        match self.step {
            CategoryStep::Name => {
                self.name = Some(validate_category_name(text)?);
                self.step = CategoryStep::Description;
                Ok(Transition::Ask(Question::CategoryDescription))
            }
            CategoryStep::Description => {
                let description = if text == SKIP {
                    None
                } else {
                    validate_description(Some(text))?
                };
                Ok(Transition::Submit(Submission::Category(CategoryPayload {
                    name: self.name.clone(),
                    description,
                    image: None,
                })))
            }
        }
    }
}

impl SaleForm {
    fn advance(&mut self, text: &str) -> Result<Transition, ValidationError> {
        match (self.step, self.product_id.as_ref()) {
            (SaleStep::Quantity, Some(product_id)) => {
                let quantity = parse_quantity(text)?;
                Ok(Transition::Submit(Submission::Sale {
                    product_id: product_id.clone(),
                    quantity,
                }))
            }
            // Quantity without a product cannot happen through the public
            // API; fall back to asking for the product again.
            _ => {
                if text.is_empty() {
                    return Err(ValidationError::Required {
                        field: "Товар".to_string(),
                    });
                }
                self.step = SaleStep::Lookup;
                Ok(Transition::LookupProduct(ProductLookup {
                    text: text.to_string(),
                    qr: qr::decode(text),
                }))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
