use crate::bot::handlers::{self, Command, HandlerContext};
use crate::bot::transport::TelegramTransport;
use crate::catalog::{CatalogProvider, JikanClient};
use crate::config::Settings;
use crate::content_filter::ContentPolicy;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

/// Run the Telegram bot until interrupted.
pub async fn run_bot(settings: Arc<Settings>) {
    let catalog = init_catalog(&settings);
    let policy = init_policy(&settings);

    let bot = Bot::new(settings.telegram_token.clone());
    register_commands(&bot).await;

    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![catalog, policy])
        .default_handler(|upd| async move {
            debug!(update_id = ?upd.id, "Unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn init_catalog(settings: &Settings) -> Arc<dyn CatalogProvider> {
    let client = JikanClient::new(
        settings.catalog_base_url.clone(),
        settings.catalog_timeout(),
    );
    info!(
        "Catalog client initialized (base: {}, timeout: {}s)",
        client.base_url(),
        settings.catalog_timeout_secs
    );
    Arc::new(client)
}

fn init_policy(settings: &Settings) -> Arc<ContentPolicy> {
    match ContentPolicy::from_settings(settings) {
        Ok(policy) => {
            info!(
                "Content policy loaded ({} forbidden tags, {} blocklist patterns)",
                policy.tag_count(),
                policy.pattern_count()
            );
            Arc::new(policy)
        }
        Err(e) => {
            error!("Failed to build content policy: {}", e);
            std::process::exit(1);
        }
    }
}

async fn register_commands(bot: &Bot) {
    match bot.set_my_commands(Command::bot_commands()).await {
        Ok(_) => info!("Bot commands registered."),
        Err(e) => warn!("Failed to register bot commands: {}", e),
    }
}

/// Build the update routing tree.
///
/// Commands go to their handlers, any other text that does not look like a
/// command is treated as a search query, and inline button presses go to
/// the selection handler.
#[must_use]
pub fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(
                    dptree::filter_map(|msg: Message| search_text(&msg))
                        .endpoint(handle_search_text),
                ),
        )
}

/// Text of a message that should be searched in the catalog.
///
/// Anything shaped like a command is left out, including commands this bot
/// does not know.
fn search_text(msg: &Message) -> Option<String> {
    msg.text()
        .filter(|text| is_search_query(text))
        .map(str::to_owned)
}

fn is_search_query(text: &str) -> bool {
    !text.trim_start().starts_with('/')
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    catalog: Arc<dyn CatalogProvider>,
    policy: Arc<ContentPolicy>,
) -> Result<(), teloxide::RequestError> {
    let transport = TelegramTransport::new(bot);
    let ctx = HandlerContext {
        transport: &transport,
        catalog: catalog.as_ref(),
        policy: policy.as_ref(),
    };
    let chat_id = msg.chat.id;

    let res = match cmd {
        Command::Start => handlers::start(ctx, chat_id).await,
        Command::Help => handlers::help(ctx, chat_id).await,
        Command::Random => handlers::random(ctx, chat_id).await,
    };
    if let Err(e) = res {
        handlers::report_unhandled(&transport, Some(chat_id), &e).await;
    }
    respond(())
}

async fn handle_search_text(
    bot: Bot,
    msg: Message,
    text: String,
    catalog: Arc<dyn CatalogProvider>,
    policy: Arc<ContentPolicy>,
) -> Result<(), teloxide::RequestError> {
    let transport = TelegramTransport::new(bot);
    let ctx = HandlerContext {
        transport: &transport,
        catalog: catalog.as_ref(),
        policy: policy.as_ref(),
    };
    let chat_id = msg.chat.id;

    if let Err(e) = handlers::handle_text(ctx, chat_id, &text).await {
        handlers::report_unhandled(&transport, Some(chat_id), &e).await;
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    catalog: Arc<dyn CatalogProvider>,
    policy: Arc<ContentPolicy>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query: {}", e);
    }

    let Some(data) = q.data.as_deref() else {
        return respond(());
    };
    let chat_id = q.message.as_ref().map(|msg| msg.chat().id);

    let transport = TelegramTransport::new(bot);
    let ctx = HandlerContext {
        transport: &transport,
        catalog: catalog.as_ref(),
        policy: policy.as_ref(),
    };

    if let Err(e) = handlers::handle_selection(ctx, chat_id, data).await {
        handlers::report_unhandled(&transport, chat_id, &e).await;
    }
    respond(())
}
