//! # Update Dispatcher
//!
//! Turns one incoming message into backend calls and replies.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  message ─► admin? ──no──► "⛔ нет доступа"                              │
//! │               │yes                                                      │
//! │               ▼                                                         │
//! │  /start /help /cancel, menu buttons ─► start flow / list / cancel       │
//! │               │otherwise                                                │
//! │               ▼                                                         │
//! │  session? ──no──► "не понимаю"                                          │
//! │               │yes                                                      │
//! │               ▼                                                         │
//! │  Conversation::advance(text)                                            │
//! │     Err ───────────────► "❌ reason" + same question (session kept)      │
//! │     Ask ───────────────► save session, next prompt                      │
//! │     Fetch/Resolve/Lookup ► backend read, then save or submit            │
//! │     Submit ────────────► drop session, one backend write, result        │
//! │                                                                         │
//! │  Any BotError ─► drop session, error reply                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use assorti_core::conversation::{Conversation, ProductLookup, Question, Submission, Transition};
use assorti_core::Product;
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::error::BotResult;
use crate::format;
use crate::session::SessionStore;
use crate::telegram::{Message, Messenger, Reply, ReplyMarkup, Update};

/// Routes messages for the admin bot.
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    messenger: Arc<dyn Messenger>,
    sessions: Arc<dyn SessionStore>,
    admins: HashSet<i64>,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn Backend>,
        messenger: Arc<dyn Messenger>,
        sessions: Arc<dyn SessionStore>,
        admins: impl IntoIterator<Item = i64>,
    ) -> Self {
        Dispatcher {
            backend,
            messenger,
            sessions,
            admins: admins.into_iter().collect(),
        }
    }

    pub async fn handle_update(&self, update: &Update) {
        let Some(message) = &update.message else {
            return;
        };

        let started = Instant::now();
        debug!(
            update_id = update.update_id,
            user_id = message.from.as_ref().map(|u| u.id),
            "Incoming update"
        );
        self.handle_message(message).await;
        debug!(
            update_id = update.update_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Update processed"
        );
    }

    pub async fn handle_message(&self, message: &Message) {
        let (Some(user), Some(text)) = (&message.from, message.text.as_deref()) else {
            return;
        };
        let chat_id = message.chat.id;

        if !self.admins.contains(&user.id) {
            warn!(user_id = user.id, username = ?user.username, "Message from non-admin rejected");
            self.notify(chat_id, Reply::text(format::ACCESS_DENIED)).await;
            return;
        }

        if let Err(err) = self.route(user.id, chat_id, text.trim()).await {
            error!(user_id = user.id, error = %err, "Failed to handle message");
            self.sessions.remove(user.id).await;

            let text = match err.user_message() {
                Some(message) => format::backend_error(message),
                None => format::ERROR.to_string(),
            };
            self.notify(chat_id, Reply::text(text).with_markup(format::main_keyboard()))
                .await;
        }
    }

    // =========================================================================
    // Routing
    // =========================================================================

    async fn route(&self, user_id: i64, chat_id: i64, text: &str) -> BotResult<()> {
        if let Some(command) = command_name(text) {
            return match command {
                "start" => {
                    self.sessions.remove(user_id).await;
                    info!(user_id, "Start command");
                    self.send(
                        chat_id,
                        Reply::text(format::WELCOME).with_markup(format::main_keyboard()),
                    )
                    .await
                }
                "help" => self.send(chat_id, Reply::text(format::HELP)).await,
                "cancel" => self.cancel(user_id, chat_id).await,
                _ => self.send(chat_id, Reply::text(format::UNKNOWN_INPUT)).await,
            };
        }

        match text {
            format::CANCEL => self.cancel(user_id, chat_id).await,
            format::ALL_PRODUCTS => self.show_products(chat_id).await,
            format::CATEGORIES => self.show_categories(chat_id).await,
            format::ADD_PRODUCT => self.start(user_id, chat_id, Conversation::add_product()).await,
            format::ADD_CATEGORY => {
                self.start(user_id, chat_id, Conversation::add_category())
                    .await
            }
            format::SALE => self.start(user_id, chat_id, Conversation::sale()).await,
            format::GENERATE_QR => self.start_qr(user_id, chat_id).await,
            format::BACK => {
                self.send(
                    chat_id,
                    Reply::text(format::WELCOME).with_markup(format::main_keyboard()),
                )
                .await
            }
            _ => match self.sessions.get(user_id).await {
                Some(conversation) => self.continue_flow(user_id, chat_id, conversation, text).await,
                None => self.send(chat_id, Reply::text(format::UNKNOWN_INPUT)).await,
            },
        }
    }

    async fn cancel(&self, user_id: i64, chat_id: i64) -> BotResult<()> {
        let text = if self.sessions.get(user_id).await.is_some() {
            self.sessions.remove(user_id).await;
            info!(user_id, "Flow cancelled");
            format::CANCELLED
        } else {
            format::NOTHING_TO_CANCEL
        };
        self.send(chat_id, Reply::text(text).with_markup(format::main_keyboard()))
            .await
    }

    async fn show_products(&self, chat_id: i64) -> BotResult<()> {
        self.send(chat_id, Reply::text(format::LOADING_PRODUCTS)).await?;
        let products = self.backend.list_products().await?;

        for part in format::split_message(&format::product_list(&products), format::MAX_MESSAGE_LEN)
        {
            self.send(chat_id, Reply::text(part)).await?;
        }
        Ok(())
    }

    async fn show_categories(&self, chat_id: i64) -> BotResult<()> {
        let categories = self.backend.list_categories().await?;
        let text = format::category_list(&categories);

        let mut parts = format::split_message(&text, format::MAX_MESSAGE_LEN).into_iter().peekable();
        while let Some(part) = parts.next() {
            let mut reply = Reply::text(part);
            if parts.peek().is_none() {
                reply = reply.with_markup(format::categories_keyboard());
            }
            self.send(chat_id, reply).await?;
        }
        Ok(())
    }

    /// Starts a flow, replacing any flow already in progress.
    async fn start(
        &self,
        user_id: i64,
        chat_id: i64,
        (conversation, question): (Conversation, Question),
    ) -> BotResult<()> {
        info!(user_id, ?question, "Flow started");
        self.sessions.put(user_id, conversation).await;
        self.ask(chat_id, format::prompt(question)).await
    }

    async fn start_qr(&self, user_id: i64, chat_id: i64) -> BotResult<()> {
        self.send(chat_id, Reply::text(format::LOADING_PRODUCTS)).await?;
        let products = self.backend.list_products().await?;
        if products.is_empty() {
            self.sessions.remove(user_id).await;
            return self.send(chat_id, Reply::text(format::NO_PRODUCTS)).await;
        }

        let (conversation, _) = Conversation::generate_qr();
        self.sessions.put(user_id, conversation).await;
        self.ask(chat_id, &format::qr_menu(&products)).await
    }

    // =========================================================================
    // Flow Steps
    // =========================================================================

    async fn continue_flow(
        &self,
        user_id: i64,
        chat_id: i64,
        mut conversation: Conversation,
        text: &str,
    ) -> BotResult<()> {
        let transition = match conversation.advance(text) {
            Ok(transition) => transition,
            Err(err) => {
                warn!(user_id, error = %err, "Form input rejected");
                return self
                    .ask(chat_id, &format::invalid_input(&err, conversation.question()))
                    .await;
            }
        };

        match transition {
            Transition::Ask(question) => {
                self.sessions.put(user_id, conversation).await;
                self.ask(chat_id, format::prompt(question)).await
            }
            Transition::FetchCategories => {
                let categories = self.backend.list_categories().await?;
                if categories.is_empty() {
                    self.sessions.remove(user_id).await;
                    return self
                        .send(
                            chat_id,
                            Reply::text(format::NO_CATEGORIES_FOR_PRODUCT)
                                .with_markup(format::main_keyboard()),
                        )
                        .await;
                }
                self.sessions.put(user_id, conversation).await;
                self.ask(chat_id, &format::category_menu(&categories)).await
            }
            Transition::ResolveCategory(input) => {
                let categories = self.backend.list_categories().await?;
                match conversation.select_category(&input, &categories) {
                    Ok(submission) => self.submit(user_id, chat_id, submission).await,
                    Err(_) => self.ask(chat_id, format::BAD_CATEGORY_PICK).await,
                }
            }
            Transition::LookupProduct(lookup) => match self.lookup_product(&lookup).await? {
                Some(product) => {
                    conversation.product_found(&product);
                    self.sessions.put(user_id, conversation).await;
                    self.ask(chat_id, &format::product_found(&product)).await
                }
                None => self.ask(chat_id, format::PRODUCT_NOT_FOUND).await,
            },
            Transition::ResolveProduct(input) => {
                let products = self.backend.list_products().await?;
                match conversation.select_product(&input, &products) {
                    Ok(submission) => self.submit(user_id, chat_id, submission).await,
                    Err(_) => self.ask(chat_id, format::BAD_PRODUCT_PICK).await,
                }
            }
            Transition::Submit(submission) => self.submit(user_id, chat_id, submission).await,
        }
    }

    /// QR payload first, then barcode, then product id.
    async fn lookup_product(&self, lookup: &ProductLookup) -> BotResult<Option<Product>> {
        if let Some(qr) = &lookup.qr {
            if let Some(product) = self.backend.get_product(&qr.product_id).await? {
                return Ok(Some(product));
            }
        }
        if let Some(product) = self.backend.product_by_barcode(&lookup.text).await? {
            return Ok(Some(product));
        }
        self.backend.get_product(&lookup.text).await
    }

    /// Drops the session, then performs the single write the form built.
    async fn submit(&self, user_id: i64, chat_id: i64, submission: Submission) -> BotResult<()> {
        self.sessions.remove(user_id).await;

        match submission {
            Submission::Product(payload) => {
                let product = self.backend.create_product(&payload).await?;
                info!(user_id, product_id = %product.id, "Product added");
                self.send(
                    chat_id,
                    Reply::text(format::product_created(&product))
                        .with_markup(format::main_keyboard()),
                )
                .await
            }
            Submission::Category(payload) => {
                let category = self.backend.create_category(&payload).await?;
                info!(user_id, category_id = %category.id, "Category added");
                self.send(
                    chat_id,
                    Reply::text(format::category_created(&category))
                        .with_markup(format::main_keyboard()),
                )
                .await
            }
            Submission::Sale {
                product_id,
                quantity,
            } => {
                let outcome = self.backend.sell(&product_id, quantity).await?;
                info!(user_id, product_id = %product_id, quantity, "Product sold");
                self.send(
                    chat_id,
                    Reply::text(format::sale_done(&outcome)).with_markup(format::main_keyboard()),
                )
                .await
            }
            Submission::Qr { product_id } => {
                let Some(product) = self.backend.get_product(&product_id).await? else {
                    return self.send(chat_id, Reply::text(format::PRODUCT_NOT_FOUND)).await;
                };
                self.send(chat_id, Reply::text(format::GENERATING_QR)).await?;
                self.backend.generate_qr(&product.id).await?;
                let png = self.backend.qr_image(&product.id).await?;
                self.messenger
                    .send_photo(chat_id, png, &format::qr_caption(&product))
                    .await?;
                info!(user_id, product_id = %product.id, "QR code sent");
                Ok(())
            }
        }
    }

    // =========================================================================
    // Sending
    // =========================================================================

    async fn send(&self, chat_id: i64, reply: Reply) -> BotResult<()> {
        self.messenger.send_message(chat_id, &reply).await
    }

    async fn ask(&self, chat_id: i64, text: &str) -> BotResult<()> {
        self.send(chat_id, Reply::text(text).with_markup(ReplyMarkup::ForceReply))
            .await
    }

    /// Best-effort send for error paths.
    async fn notify(&self, chat_id: i64, reply: Reply) {
        if let Err(err) = self.send(chat_id, reply).await {
            error!(chat_id, error = %err, "Failed to send message");
        }
    }
}

/// `"/start@assorti_bot args"` → `Some("start")`.
fn command_name(text: &str) -> Option<&str> {
    let word = text.split_whitespace().next()?.strip_prefix('/')?;
    word.split('@').next().filter(|name| !name.is_empty())
}
