use super::callback::{CallbackError, CallbackPayload};
use super::formatter::render_detail;
use super::transport::ChatTransport;
use super::views::{self, Choice};
use crate::catalog::CatalogProvider;
use crate::content_filter::ContentPolicy;
use crate::utils::truncate_str;
use anyhow::Result;
use teloxide::types::ChatId;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

/// Queries shorter than this (in characters, after trimming) are rejected
pub const MIN_QUERY_CHARS: usize = 3;

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    /// Show welcome message
    #[command(description = "Начать работу с ботом.")]
    Start,
    /// Show usage help
    #[command(description = "Как пользоваться ботом.")]
    Help,
    /// Show a random anime
    #[command(description = "Случайное аниме.")]
    Random,
}

/// Shared dependencies of the conversation handlers
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Outbound messaging
    pub transport: &'a dyn ChatTransport,
    /// Anime catalog
    pub catalog: &'a dyn CatalogProvider,
    /// Mature content filter
    pub policy: &'a ContentPolicy,
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the welcome message cannot be sent.
pub async fn start(ctx: HandlerContext<'_>, chat_id: ChatId) -> Result<()> {
    info!(chat_id = %chat_id, "Received /start");
    ctx.transport.send_text(chat_id, views::START_TEXT).await
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the help message cannot be sent.
pub async fn help(ctx: HandlerContext<'_>, chat_id: ChatId) -> Result<()> {
    info!(chat_id = %chat_id, "Received /help");
    ctx.transport.send_html(chat_id, views::HELP_TEXT).await
}

/// Free-text search handler
///
/// # Errors
///
/// Returns an error if a reply cannot be sent.
pub async fn handle_text(ctx: HandlerContext<'_>, chat_id: ChatId, text: &str) -> Result<()> {
    let query = text.trim();

    if query.chars().count() < MIN_QUERY_CHARS {
        debug!(chat_id = %chat_id, "Rejected short query");
        return ctx.transport.send_text(chat_id, views::QUERY_TOO_SHORT).await;
    }

    info!(
        chat_id = %chat_id,
        query = %truncate_str(query, 100),
        "Searching catalog"
    );
    ctx.transport.send_text(chat_id, views::SEARCHING).await?;

    let results = match ctx.catalog.search(query).await {
        Ok(results) => results,
        Err(e) => {
            warn!(chat_id = %chat_id, error = %e, "Search failed, notifying user");
            return ctx.transport.send_text(chat_id, views::SEARCH_FAILED).await;
        }
    };

    match results.as_slice() {
        [] => ctx.transport.send_text(chat_id, views::NOTHING_FOUND).await,
        [single] => show_anime(ctx, chat_id, single.id).await,
        many => {
            let choices: Vec<Choice> = many.iter().map(Choice::from_result).collect();
            ctx.transport
                .send_choices(chat_id, views::CHOOSE_ANIME, &choices)
                .await
        }
    }
}

/// Inline button handler.
///
/// The query itself is acknowledged by the dispatcher. `chat_id` is `None`
/// when the button's message is no longer accessible; the selection is then
/// only logged.
///
/// # Errors
///
/// Returns an error if a reply cannot be sent.
pub async fn handle_selection(
    ctx: HandlerContext<'_>,
    chat_id: Option<ChatId>,
    data: &str,
) -> Result<()> {
    let payload = match data.parse::<CallbackPayload>() {
        Ok(payload) => payload,
        Err(CallbackError::UnknownAction(data)) => {
            debug!(data = %data, "Ignoring unknown callback");
            return Ok(());
        }
        Err(e @ CallbackError::InvalidId(_)) => {
            debug!(error = %e, "Rejected callback");
            return match chat_id {
                Some(chat_id) => ctx.transport.send_text(chat_id, views::INVALID_ID).await,
                None => Ok(()),
            };
        }
    };

    let CallbackPayload::SelectAnime(anime_id) = payload;
    let Some(chat_id) = chat_id else {
        warn!(anime_id, "Selection without an originating chat, dropping");
        return Ok(());
    };

    info!(chat_id = %chat_id, anime_id, "User selected anime");
    show_anime(ctx, chat_id, anime_id).await
}

/// Random anime handler
///
/// # Errors
///
/// Returns an error if a reply cannot be sent.
pub async fn random(ctx: HandlerContext<'_>, chat_id: ChatId) -> Result<()> {
    info!(chat_id = %chat_id, "Received /random");
    match ctx.catalog.fetch_random().await {
        Some(detail) => show_anime(ctx, chat_id, detail.id).await,
        None => ctx.transport.send_text(chat_id, views::RANDOM_FAILED).await,
    }
}

/// Fetch, classify, render and deliver one anime card.
///
/// A card that fits a photo caption goes out as one captioned photo. A longer
/// card is sent as a bare cover followed by the HTML text. Delivery degrades
/// from photo to HTML text to a plain notice; each fallback is logged.
///
/// # Errors
///
/// Returns an error only if the final plain notice cannot be sent.
pub async fn show_anime(ctx: HandlerContext<'_>, chat_id: ChatId, anime_id: u32) -> Result<()> {
    let Some(mut detail) = ctx.catalog.fetch_detail(anime_id).await else {
        return ctx.transport.send_text(chat_id, views::DETAILS_FAILED).await;
    };
    // The card links to the title the user asked for.
    detail.id = anime_id;

    let is_mature = ctx.policy.is_mature(&detail);
    if is_mature {
        info!(chat_id = %chat_id, anime_id, "Mature content hidden");
    }
    let rendered = render_detail(&detail, is_mature);

    if let Some(photo_url) = rendered.image_url.as_deref() {
        if rendered.fits_caption() {
            match ctx
                .transport
                .send_photo(chat_id, photo_url, &rendered.text)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(chat_id = %chat_id, anime_id, error = %e, "Failed to send cover, falling back to text");
                }
            }
        } else {
            debug!(
                chat_id = %chat_id,
                anime_id,
                len = rendered.visible_len(),
                "Card too long for a caption, sending cover separately"
            );
            if let Err(e) = ctx.transport.send_cover(chat_id, photo_url).await {
                warn!(chat_id = %chat_id, anime_id, error = %e, "Failed to send cover");
            }
        }
    }

    if let Err(e) = ctx.transport.send_html(chat_id, &rendered.text).await {
        error!(chat_id = %chat_id, anime_id, error = %e, "Failed to send anime card");
        return ctx.transport.send_text(chat_id, views::DELIVERY_FAILED).await;
    }
    Ok(())
}

/// Error boundary for handler failures.
///
/// Logs the error and apologises when the originating chat is known.
/// Never fails.
pub async fn report_unhandled(
    transport: &dyn ChatTransport,
    chat_id: Option<ChatId>,
    err: &anyhow::Error,
) {
    error!(chat_id = ?chat_id, error = ?err, "Unhandled error while processing update");

    let Some(chat_id) = chat_id else {
        return;
    };
    if let Err(e) = transport.send_text(chat_id, views::GENERIC_ERROR).await {
        error!(chat_id = %chat_id, error = %e, "Failed to deliver error notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::transport::MockChatTransport;
    use crate::catalog::{AnimeDetail, CatalogError, MockCatalogProvider, SearchResult};
    use anyhow::anyhow;
    use mockall::predicate::eq;
    use mockall::Sequence;

    const CHAT: ChatId = ChatId(42);

    fn policy() -> ContentPolicy {
        ContentPolicy::new(["Hentai"], [r"\bnsfw\b"]).unwrap_or_else(|e| panic!("{e}"))
    }

    fn result(id: u32, title: &str, year: Option<i32>) -> SearchResult {
        SearchResult {
            id,
            title: title.to_string(),
            year,
        }
    }

    fn detail(id: u32) -> AnimeDetail {
        AnimeDetail {
            id,
            title: "Naruto".to_string(),
            synopsis: Some("A ninja story.".to_string()),
            cover_image_url: Some("https://cdn.myanimelist.net/images/anime/13/17405.jpg".to_string()),
            ..Default::default()
        }
    }

    fn ctx<'a>(
        transport: &'a MockChatTransport,
        catalog: &'a MockCatalogProvider,
        policy: &'a ContentPolicy,
    ) -> HandlerContext<'a> {
        HandlerContext {
            transport,
            catalog,
            policy,
        }
    }

    #[tokio::test]
    async fn test_start_and_help_texts() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let catalog = MockCatalogProvider::new();
        let policy = policy();

        transport
            .expect_send_text()
            .withf(|chat, text| *chat == CHAT && text == views::START_TEXT)
            .times(1)
            .returning(|_, _| Ok(()));
        transport
            .expect_send_html()
            .withf(|chat, html| *chat == CHAT && html == views::HELP_TEXT)
            .times(1)
            .returning(|_, _| Ok(()));

        start(ctx(&transport, &catalog, &policy), CHAT).await?;
        help(ctx(&transport, &catalog, &policy), CHAT).await
    }

    #[tokio::test]
    async fn test_short_query_never_searches() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        transport
            .expect_send_text()
            .withf(|chat, text| *chat == CHAT && text == views::QUERY_TOO_SHORT)
            .times(1)
            .returning(|_, _| Ok(()));
        catalog.expect_search().never();

        handle_text(ctx(&transport, &catalog, &policy), CHAT, "  ab  ").await
    }

    #[tokio::test]
    async fn test_single_result_goes_straight_to_details() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();
        let mut seq = Sequence::new();

        transport
            .expect_send_text()
            .withf(|_, text| text == views::SEARCHING)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        catalog
            .expect_search()
            .withf(|q| q == "Naruto")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![result(20, "Naruto", Some(2002))]));
        catalog
            .expect_fetch_detail()
            .with(eq(20))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Some(detail(id)));
        transport
            .expect_send_photo()
            .withf(|_, url, caption| url.ends_with("17405.jpg") && caption.contains("Naruto"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        transport.expect_send_choices().never();

        handle_text(ctx(&transport, &catalog, &policy), CHAT, " Naruto ").await
    }

    #[tokio::test]
    async fn test_multiple_results_show_choices_lazily() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        transport
            .expect_send_text()
            .withf(|_, text| text == views::SEARCHING)
            .times(1)
            .returning(|_, _| Ok(()));
        catalog.expect_search().times(1).returning(|_| {
            Ok(vec![
                result(21, "One Piece", Some(1999)),
                result(30276, "One Punch Man", Some(2015)),
                result(9999, "One Outs", None),
            ])
        });
        catalog.expect_fetch_detail().never();
        transport
            .expect_send_choices()
            .withf(|chat, prompt, choices| {
                let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
                *chat == CHAT
                    && prompt == views::CHOOSE_ANIME
                    && labels
                        == [
                            "One Piece (1999)",
                            "One Punch Man (2015)",
                            "One Outs (N/A)",
                        ]
                    && choices[1].payload == CallbackPayload::SelectAnime(30276)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        handle_text(ctx(&transport, &catalog, &policy), CHAT, "One").await
    }

    #[tokio::test]
    async fn test_selecting_second_entry_fetches_only_that_id() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog
            .expect_fetch_detail()
            .with(eq(30276))
            .times(1)
            .returning(|id| Some(detail(id)));
        transport
            .expect_send_photo()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let payload = CallbackPayload::SelectAnime(30276).to_string();
        handle_selection(
            ctx(&transport, &catalog, &policy),
            Some(CHAT),
            &payload,
        )
        .await
    }

    #[tokio::test]
    async fn test_search_failure_reports_upstream_error() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        transport
            .expect_send_text()
            .withf(|_, text| text == views::SEARCHING)
            .times(1)
            .returning(|_, _| Ok(()));
        catalog
            .expect_search()
            .times(1)
            .returning(|_| Err(CatalogError::Network("operation timed out".to_string())));
        transport
            .expect_send_text()
            .withf(|_, text| text == views::SEARCH_FAILED)
            .times(1)
            .returning(|_, _| Ok(()));
        transport.expect_send_choices().never();

        handle_text(ctx(&transport, &catalog, &policy), CHAT, "Naruto").await
    }

    #[tokio::test]
    async fn test_empty_search_reports_nothing_found() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        transport
            .expect_send_text()
            .withf(|_, text| text == views::SEARCHING)
            .times(1)
            .returning(|_, _| Ok(()));
        catalog.expect_search().times(1).returning(|_| Ok(Vec::new()));
        transport
            .expect_send_text()
            .withf(|_, text| text == views::NOTHING_FOUND)
            .times(1)
            .returning(|_, _| Ok(()));

        handle_text(ctx(&transport, &catalog, &policy), CHAT, "zzzzzz").await
    }

    #[tokio::test]
    async fn test_invalid_callback_id_is_rejected() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        transport
            .expect_send_text()
            .withf(|_, text| text == views::INVALID_ID)
            .times(1)
            .returning(|_, _| Ok(()));
        catalog.expect_fetch_detail().never();

        handle_selection(
            ctx(&transport, &catalog, &policy),
            Some(CHAT),
            "anime_abc",
        )
        .await
    }

    #[tokio::test]
    async fn test_unknown_callback_is_ignored() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let catalog = MockCatalogProvider::new();
        let policy = policy();

        transport.expect_send_text().never();

        handle_selection(
            ctx(&transport, &catalog, &policy),
            Some(CHAT),
            "something_else",
        )
        .await
    }

    #[tokio::test]
    async fn test_selection_without_chat_is_dropped() -> Result<()> {
        let transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog.expect_fetch_detail().never();

        handle_selection(ctx(&transport, &catalog, &policy), None, "anime_20").await
    }

    #[tokio::test]
    async fn test_missing_details_reports_failure() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog.expect_fetch_detail().times(1).returning(|_| None);
        transport
            .expect_send_text()
            .withf(|_, text| text == views::DETAILS_FAILED)
            .times(1)
            .returning(|_, _| Ok(()));

        show_anime(ctx(&transport, &catalog, &policy), CHAT, 1).await
    }

    #[tokio::test]
    async fn test_photo_failure_falls_back_to_text() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog
            .expect_fetch_detail()
            .times(1)
            .returning(|id| Some(detail(id)));
        transport
            .expect_send_photo()
            .times(1)
            .returning(|_, _, _| Err(anyhow!("Bad Request: wrong file identifier")));
        transport
            .expect_send_html()
            .withf(|_, html| html.contains("A ninja story."))
            .times(1)
            .returning(|_, _| Ok(()));

        show_anime(ctx(&transport, &catalog, &policy), CHAT, 20).await
    }

    #[tokio::test]
    async fn test_double_delivery_failure_sends_notice() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog
            .expect_fetch_detail()
            .times(1)
            .returning(|id| Some(detail(id)));
        transport
            .expect_send_photo()
            .times(1)
            .returning(|_, _, _| Err(anyhow!("network down")));
        transport
            .expect_send_html()
            .times(1)
            .returning(|_, _| Err(anyhow!("network down")));
        transport
            .expect_send_text()
            .withf(|_, text| text == views::DELIVERY_FAILED)
            .times(1)
            .returning(|_, _| Ok(()));

        show_anime(ctx(&transport, &catalog, &policy), CHAT, 20).await
    }

    #[tokio::test]
    async fn test_long_card_sends_cover_then_text() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();
        let mut seq = Sequence::new();

        catalog.expect_fetch_detail().times(1).returning(|id| {
            let mut d = detail(id);
            d.synopsis = Some("plot ".repeat(300));
            Some(d)
        });
        transport.expect_send_photo().never();
        transport
            .expect_send_cover()
            .withf(|chat, url| *chat == CHAT && url.ends_with("17405.jpg"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        transport
            .expect_send_html()
            .withf(|_, html| html.contains("plot plot") && html.ends_with("/anime/20"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        show_anime(ctx(&transport, &catalog, &policy), CHAT, 20).await
    }

    #[tokio::test]
    async fn test_long_card_cover_failure_still_sends_text() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog.expect_fetch_detail().times(1).returning(|id| {
            let mut d = detail(id);
            d.synopsis = Some("plot ".repeat(300));
            Some(d)
        });
        transport
            .expect_send_cover()
            .times(1)
            .returning(|_, _| Err(anyhow!("Bad Request: wrong file identifier")));
        transport
            .expect_send_html()
            .times(1)
            .returning(|_, _| Ok(()));

        show_anime(ctx(&transport, &catalog, &policy), CHAT, 20).await
    }

    #[tokio::test]
    async fn test_card_links_to_requested_id() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        // Payload without mal_id decodes to id 0
        catalog.expect_fetch_detail().with(eq(1535)).times(1).returning(|_| {
            let mut d = detail(0);
            d.cover_image_url = None;
            Some(d)
        });
        transport
            .expect_send_html()
            .withf(|_, html| html.ends_with("https://myanimelist.net/anime/1535"))
            .times(1)
            .returning(|_, _| Ok(()));

        show_anime(ctx(&transport, &catalog, &policy), CHAT, 1535).await
    }

    #[tokio::test]
    async fn test_mature_title_is_sent_as_text_only() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog.expect_fetch_detail().times(1).returning(|id| {
            let mut d = detail(id);
            d.genre_tags = vec!["Hentai".to_string()];
            Some(d)
        });
        transport.expect_send_photo().never();
        transport
            .expect_send_html()
            .withf(|_, html| !html.contains("A ninja story."))
            .times(1)
            .returning(|_, _| Ok(()));

        show_anime(ctx(&transport, &catalog, &policy), CHAT, 20).await
    }

    #[tokio::test]
    async fn test_random_failure() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog.expect_fetch_random().times(1).returning(|| None);
        catalog.expect_fetch_detail().never();
        transport
            .expect_send_text()
            .withf(|_, text| text == views::RANDOM_FAILED)
            .times(1)
            .returning(|_, _| Ok(()));

        random(ctx(&transport, &catalog, &policy), CHAT).await
    }

    #[tokio::test]
    async fn test_random_renders_full_record() -> Result<()> {
        let mut transport = MockChatTransport::new();
        let mut catalog = MockCatalogProvider::new();
        let policy = policy();

        catalog
            .expect_fetch_random()
            .times(1)
            .returning(|| Some(detail(5114)));
        catalog
            .expect_fetch_detail()
            .with(eq(5114))
            .times(1)
            .returning(|id| Some(detail(id)));
        transport
            .expect_send_photo()
            .times(1)
            .returning(|_, _, _| Ok(()));

        random(ctx(&transport, &catalog, &policy), CHAT).await
    }

    #[tokio::test]
    async fn test_report_unhandled_apologises_when_chat_known() {
        let mut transport = MockChatTransport::new();
        transport
            .expect_send_text()
            .withf(|chat, text| *chat == CHAT && text == views::GENERIC_ERROR)
            .times(1)
            .returning(|_, _| Err(anyhow!("still broken")));

        report_unhandled(&transport, Some(CHAT), &anyhow!("boom")).await;
    }

    #[tokio::test]
    async fn test_report_unhandled_without_chat_only_logs() {
        let mut transport = MockChatTransport::new();
        transport.expect_send_text().never();

        report_unhandled(&transport, None, &anyhow!("boom")).await;
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/random", "anime_bot").ok(), Some(Command::Random));
        assert_eq!(Command::parse("/help", "anime_bot").ok(), Some(Command::Help));
        assert!(Command::parse("/unknown", "anime_bot").is_err());
    }
}
