use std::sync::{Arc, OnceLock};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::payloads::setters::*;
use teloxide::requests::{Requester, ResponseResult};
use teloxide::types as tg;
use teloxide::{dptree, Bot};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{ChatHandle, ChatInfo, ChatPlatform, InboundMessage, Sender, Update, UpdateStream, UserInfo};
use crate::content::mapper::{OutboundContent, RemoteFileId};
use crate::content::{
    Animation, Audio, Contact, Document, EntityKind, FormattedText, Location, MessageContent,
    PhotoSize, Poll, PollKind, PollOption, RemoteFile, ServiceKind, Sticker, Story, TextEntity,
    Thumbnail, Venue, Video, VideoNote, VoiceNote,
};

/// Id of the account the bot runs as, injected into the dispatcher
#[derive(Debug, Clone, Copy)]
struct OwnAccount(u64);

/// `ChatPlatform` on top of the Telegram Bot API.
pub struct TelegramPlatform {
    bot: Bot,
    own_id: OnceLock<u64>,
    buffer: usize,
}

impl TelegramPlatform {
    pub fn new(bot_token: &str, buffer: usize) -> Self {
        Self {
            bot: Bot::new(bot_token),
            own_id: OnceLock::new(),
            buffer: buffer.max(1),
        }
    }

    async fn own_id(&self) -> Result<u64> {
        match self.own_id.get() {
            Some(id) => Ok(*id),
            None => Ok(self.authorize().await?.id as u64),
        }
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn authorize(&self) -> Result<UserInfo> {
        let me = self
            .bot
            .get_me()
            .await
            .context("Failed to authorize with Telegram")?;
        let _ = self.own_id.set(me.user.id.0);
        Ok(UserInfo {
            id: me.user.id.0 as i64,
            first_name: me.user.first_name.clone(),
            last_name: me.user.last_name.clone().unwrap_or_default(),
            username: me.user.username.clone(),
        })
    }

    async fn resolve_chat_by_handle(&self, handle: ChatHandle) -> Result<ChatInfo> {
        let chat = self
            .bot
            .get_chat(tg::ChatId(handle))
            .await
            .with_context(|| format!("getChat failed for {}", handle))?;
        let title = match chat.title() {
            Some(title) => title.to_string(),
            None => join_name(chat.first_name(), chat.last_name()),
        };
        Ok(ChatInfo {
            handle: chat.id.0,
            title,
        })
    }

    async fn resolve_chat_by_username(&self, username: &str) -> Result<ChatInfo> {
        let recipient = tg::Recipient::ChannelUsername(format!("@{}", username));
        let chat = self
            .bot
            .get_chat(recipient)
            .await
            .with_context(|| format!("getChat failed for @{}", username))?;
        let title = chat.title().unwrap_or(username).to_string();
        Ok(ChatInfo {
            handle: chat.id.0,
            title,
        })
    }

    async fn resolve_user(&self, user_id: i64) -> Result<UserInfo> {
        let chat = self
            .bot
            .get_chat(tg::ChatId(user_id))
            .await
            .with_context(|| format!("getChat failed for user {}", user_id))?;
        Ok(UserInfo {
            id: user_id,
            first_name: chat.first_name().unwrap_or_default().to_string(),
            last_name: chat.last_name().unwrap_or_default().to_string(),
            username: chat.username().map(str::to_string),
        })
    }

    async fn forward_message(
        &self,
        destination: ChatHandle,
        origin: ChatHandle,
        message_id: i64,
    ) -> Result<()> {
        let message_id = i32::try_from(message_id)
            .with_context(|| format!("Message id {} out of range", message_id))?;
        self.bot
            .forward_message(
                tg::ChatId(destination),
                tg::ChatId(origin),
                tg::MessageId(message_id),
            )
            .await?;
        Ok(())
    }

    async fn send_composed_message(
        &self,
        destination: ChatHandle,
        content: &OutboundContent,
    ) -> Result<()> {
        send_content(&self.bot, tg::ChatId(destination), content).await
    }

    async fn subscribe(&self) -> Result<UpdateStream> {
        let own = OwnAccount(self.own_id().await?);
        let (tx, rx) = mpsc::channel(self.buffer);

        let handler = dptree::entry()
            .branch(tg::Update::filter_message().endpoint(push_message))
            .branch(tg::Update::filter_channel_post().endpoint(push_message));

        let other_tx = tx.clone();
        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![tx, own])
            .default_handler(move |upd: Arc<tg::Update>| {
                let tx = other_tx.clone();
                async move {
                    let _ = tx.send(Update::Other(format!("{:?}", upd.id))).await;
                }
            })
            .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
            .build();

        info!("Starting Telegram update dispatcher...");
        tokio::spawn(async move {
            dispatcher.dispatch().await;
            info!("Telegram dispatcher stopped");
        });

        Ok(rx)
    }
}

async fn push_message(
    msg: tg::Message,
    tx: mpsc::Sender<Update>,
    own: OwnAccount,
) -> ResponseResult<()> {
    let inbound = translate_message(&msg, own.0);
    if tx.send(Update::NewMessage(inbound)).await.is_err() {
        warn!("Relay is no longer listening, dropping message {}", msg.id.0);
    }
    Ok(())
}

fn join_name(first: Option<&str>, last: Option<&str>) -> String {
    match (first, last) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.to_string(),
        (None, Some(last)) => last.to_string(),
        (None, None) => String::new(),
    }
}

// ── Inbound translation ────────────────────────────────────────────────────

fn translate_message(msg: &tg::Message, own_id: u64) -> InboundMessage {
    let sender = if let Some(chat) = &msg.sender_chat {
        Sender::Chat(chat.id.0)
    } else if let Some(user) = &msg.from {
        Sender::User(user.id.0 as i64)
    } else {
        Sender::Unknown
    };
    InboundMessage {
        id: i64::from(msg.id.0),
        chat_handle: msg.chat.id.0,
        sender,
        is_outgoing: msg.from.as_ref().is_some_and(|user| user.id.0 == own_id),
        content: translate_content(msg),
    }
}

fn translate_content(msg: &tg::Message) -> MessageContent {
    use tg::MessageKind as K;

    let service = match &msg.kind {
        K::Common(common) => return translate_media(&common.media_kind),
        K::Dice(d) => {
            return MessageContent::Dice {
                emoji: dice_emoji(&d.dice.emoji).to_string(),
                value: d.dice.value,
            }
        }
        K::NewChatMembers(_) => ServiceKind::ChatAddMembers,
        K::LeftChatMember(_) => ServiceKind::ChatDeleteMember,
        K::NewChatTitle(_) => ServiceKind::ChatChangeTitle,
        K::NewChatPhoto(_) => ServiceKind::ChatChangePhoto,
        K::DeleteChatPhoto(_) => ServiceKind::ChatDeletePhoto,
        K::GroupChatCreated(_) => ServiceKind::BasicGroupChatCreate,
        K::SupergroupChatCreated(_) | K::ChannelChatCreated(_) => {
            ServiceKind::SupergroupChatCreate
        }
        K::MessageAutoDeleteTimerChanged(_) => ServiceKind::ChatSetMessageAutoDeleteTime,
        K::Pinned(_) => ServiceKind::PinMessage,
        K::Invoice(_) => ServiceKind::Invoice,
        K::SuccessfulPayment(_) => ServiceKind::PaymentSuccessful,
        K::WriteAccessAllowed(_) => ServiceKind::BotWriteAccessAllowed,
        K::PassportData(_) => ServiceKind::PassportDataReceived,
        K::ProximityAlertTriggered(_) => ServiceKind::ProximityAlertTriggered,
        K::ForumTopicCreated(_) => ServiceKind::ForumTopicCreated,
        K::ForumTopicEdited(_) => ServiceKind::ForumTopicEdited,
        K::ForumTopicClosed(_) | K::ForumTopicReopened(_) => {
            ServiceKind::ForumTopicIsClosedToggled
        }
        K::VideoChatScheduled(_) => ServiceKind::VideoChatScheduled,
        K::VideoChatStarted(_) => ServiceKind::VideoChatStarted,
        K::VideoChatEnded(_) => ServiceKind::VideoChatEnded,
        K::VideoChatParticipantsInvited(_) => ServiceKind::InviteVideoChatParticipants,
        K::WebAppData(_) => ServiceKind::WebAppDataReceived,
        _ => ServiceKind::Unsupported,
    };
    MessageContent::Service(service)
}

fn translate_media(media: &tg::MediaKind) -> MessageContent {
    use tg::MediaKind as M;

    match media {
        M::Text(t) => MessageContent::Text {
            text: formatted(&t.text, &t.entities),
            link_preview_disabled: t
                .link_preview_options
                .as_ref()
                .is_some_and(|options| options.is_disabled),
        },
        M::Animation(a) => MessageContent::Animation {
            animation: Animation {
                file: remote_file(&a.animation.file),
                thumbnail: a.animation.thumbnail.as_ref().map(thumbnail),
                duration: a.animation.duration.seconds(),
                width: a.animation.width,
                height: a.animation.height,
            },
            caption: caption(&a.caption, &a.caption_entities),
            has_spoiler: a.has_media_spoiler,
        },
        M::Audio(a) => MessageContent::Audio {
            audio: Audio {
                file: remote_file(&a.audio.file),
                album_cover_thumbnail: a.audio.thumbnail.as_ref().map(thumbnail),
                duration: a.audio.duration.seconds(),
                title: a.audio.title.clone().unwrap_or_default(),
                performer: a.audio.performer.clone().unwrap_or_default(),
            },
            caption: caption(&a.caption, &a.caption_entities),
        },
        M::Document(d) => MessageContent::Document {
            document: Document {
                file: remote_file(&d.document.file),
                thumbnail: d.document.thumbnail.as_ref().map(thumbnail),
            },
            caption: caption(&d.caption, &d.caption_entities),
        },
        M::Photo(p) => MessageContent::Photo {
            sizes: p
                .photo
                .iter()
                .map(|size| PhotoSize {
                    file: remote_file(&size.file),
                    width: size.width,
                    height: size.height,
                })
                .collect(),
            caption: caption(&p.caption, &p.caption_entities),
            has_spoiler: p.has_media_spoiler,
        },
        M::Sticker(s) => MessageContent::Sticker {
            sticker: Sticker {
                file: remote_file(&s.sticker.file),
                thumbnail: s.sticker.thumbnail.as_ref().map(thumbnail),
                width: s.sticker.width.into(),
                height: s.sticker.height.into(),
                emoji: s.sticker.emoji.clone().unwrap_or_default(),
            },
        },
        M::Video(v) => MessageContent::Video {
            video: Video {
                file: remote_file(&v.video.file),
                thumbnail: v.video.thumbnail.as_ref().map(thumbnail),
                duration: v.video.duration.seconds(),
                width: v.video.width,
                height: v.video.height,
                supports_streaming: false,
            },
            caption: caption(&v.caption, &v.caption_entities),
            has_spoiler: v.has_media_spoiler,
        },
        M::VideoNote(v) => MessageContent::VideoNote {
            video_note: VideoNote {
                file: remote_file(&v.video_note.file),
                thumbnail: v.video_note.thumbnail.as_ref().map(thumbnail),
                duration: v.video_note.duration.seconds(),
                length: v.video_note.length,
            },
        },
        M::Voice(v) => MessageContent::VoiceNote {
            voice_note: VoiceNote {
                file: remote_file(&v.voice.file),
                duration: v.voice.duration.seconds(),
                waveform: Vec::new(),
            },
            caption: caption(&v.caption, &v.caption_entities),
        },
        M::Location(l) => MessageContent::Location {
            location: location(&l.location),
            // live locations are relayed as a static point
            live_period: None,
            heading: l.location.heading.map(Into::into),
            proximity_alert_radius: l.location.proximity_alert_radius.map(Into::into),
        },
        M::Venue(v) => MessageContent::Venue {
            venue: Venue {
                location: location(&v.venue.location),
                title: v.venue.title.clone(),
                address: v.venue.address.clone(),
                foursquare_id: v.venue.foursquare_id.clone(),
                foursquare_type: v.venue.foursquare_type.clone(),
                google_place_id: v.venue.google_place_id.clone(),
                google_place_type: v.venue.google_place_type.clone(),
            },
        },
        M::Contact(c) => MessageContent::Contact {
            contact: Contact {
                phone_number: c.contact.phone_number.clone(),
                first_name: c.contact.first_name.clone(),
                last_name: c.contact.last_name.clone().unwrap_or_default(),
                vcard: c.contact.vcard.clone().unwrap_or_default(),
                user_id: c.contact.user_id.map(|id| id.0 as i64),
            },
        },
        M::Poll(p) => MessageContent::Poll {
            poll: Poll {
                question: p.poll.question.clone(),
                options: p
                    .poll
                    .options
                    .iter()
                    .map(|option| PollOption {
                        text: option.text.clone(),
                        voter_count: option.voter_count.into(),
                    })
                    .collect(),
                is_anonymous: p.poll.is_anonymous,
                kind: match p.poll.poll_type {
                    tg::PollType::Quiz => PollKind::Quiz {
                        correct_option_id: p.poll.correct_option_id,
                        explanation: p.poll.explanation.clone(),
                    },
                    _ => PollKind::Regular {
                        allow_multiple_answers: p.poll.allows_multiple_answers,
                    },
                },
                // a copied poll starts its own clock
                open_period: None,
                close_date: p.poll.close_date,
                is_closed: p.poll.is_closed,
            },
        },
        M::Story(s) => MessageContent::Story {
            story: Story {
                sender_chat: s.story.chat.id.0,
                story_id: s.story.id.0 as i64,
            },
        },
        M::Game(_) => MessageContent::Service(ServiceKind::Game),
        _ => MessageContent::Service(ServiceKind::Unsupported),
    }
}

fn remote_file(meta: &tg::FileMeta) -> Option<RemoteFile> {
    let id = meta.id.to_string();
    if id.is_empty() {
        return None;
    }
    Some(RemoteFile {
        id,
        size: u64::from(meta.size),
    })
}

fn thumbnail(size: &tg::PhotoSize) -> Thumbnail {
    Thumbnail {
        file: remote_file(&size.file),
        width: size.width,
        height: size.height,
    }
}

fn location(location: &tg::Location) -> Location {
    Location {
        latitude: location.latitude,
        longitude: location.longitude,
        horizontal_accuracy: location.horizontal_accuracy,
    }
}

fn formatted(text: &str, entities: &[tg::MessageEntity]) -> FormattedText {
    FormattedText {
        text: text.to_string(),
        entities: entities
            .iter()
            .map(|entity| TextEntity {
                offset: entity.offset,
                length: entity.length,
                kind: entity_kind(&entity.kind),
            })
            .collect(),
    }
}

fn caption(text: &Option<String>, entities: &[tg::MessageEntity]) -> FormattedText {
    match text {
        Some(text) => formatted(text, entities),
        None => FormattedText::default(),
    }
}

fn entity_kind(kind: &tg::MessageEntityKind) -> EntityKind {
    use tg::MessageEntityKind as E;

    match kind {
        E::Bold => EntityKind::Bold,
        E::Italic => EntityKind::Italic,
        E::Underline => EntityKind::Underline,
        E::Strikethrough => EntityKind::Strikethrough,
        E::Spoiler => EntityKind::Spoiler,
        E::Code => EntityKind::Code,
        E::Pre { language } => EntityKind::Pre {
            language: language.clone(),
        },
        E::TextLink { url } => EntityKind::TextLink {
            url: url.to_string(),
        },
        _ => EntityKind::Other,
    }
}

fn dice_emoji(emoji: &tg::DiceEmoji) -> &'static str {
    match emoji {
        tg::DiceEmoji::Dice => "🎲",
        tg::DiceEmoji::Darts => "🎯",
        tg::DiceEmoji::Basketball => "🏀",
        tg::DiceEmoji::Football => "⚽",
        tg::DiceEmoji::Bowling => "🎳",
        tg::DiceEmoji::SlotMachine => "🎰",
    }
}

// ── Outbound ───────────────────────────────────────────────────────────────

fn parse_dice_emoji(emoji: &str) -> Option<tg::DiceEmoji> {
    match emoji {
        "🎲" => Some(tg::DiceEmoji::Dice),
        "🎯" => Some(tg::DiceEmoji::Darts),
        "🏀" => Some(tg::DiceEmoji::Basketball),
        "⚽" => Some(tg::DiceEmoji::Football),
        "🎳" => Some(tg::DiceEmoji::Bowling),
        "🎰" => Some(tg::DiceEmoji::SlotMachine),
        _ => None,
    }
}

fn input_file(file: &RemoteFileId) -> tg::InputFile {
    tg::InputFile::file_id(tg::FileId(file.0.clone()))
}

/// Entities the platform derives by itself are left out, as are links it
/// would reject.
fn to_entities(entities: &[TextEntity]) -> Vec<tg::MessageEntity> {
    entities
        .iter()
        .filter_map(|entity| {
            let kind = match &entity.kind {
                EntityKind::Bold => tg::MessageEntityKind::Bold,
                EntityKind::Italic => tg::MessageEntityKind::Italic,
                EntityKind::Underline => tg::MessageEntityKind::Underline,
                EntityKind::Strikethrough => tg::MessageEntityKind::Strikethrough,
                EntityKind::Spoiler => tg::MessageEntityKind::Spoiler,
                EntityKind::Code => tg::MessageEntityKind::Code,
                EntityKind::Pre { language } => tg::MessageEntityKind::Pre {
                    language: language.clone(),
                },
                EntityKind::TextLink { url } => tg::MessageEntityKind::TextLink {
                    url: reqwest::Url::parse(url).ok()?,
                },
                EntityKind::Other => return None,
            };
            Some(tg::MessageEntity {
                kind,
                offset: entity.offset,
                length: entity.length,
            })
        })
        .collect()
}

fn preview_disabled() -> tg::LinkPreviewOptions {
    tg::LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

/// Attach caption and caption entities when there is a caption to attach.
macro_rules! with_caption {
    ($request:expr, $caption:expr) => {{
        let request = $request;
        if $caption.text.is_empty() {
            request
        } else {
            request
                .caption($caption.text.clone())
                .caption_entities(to_entities(&$caption.entities))
        }
    }};
}

/// Files are re-sent by remote id. The platform takes dimensions, durations
/// and thumbnails from the stored file in that case, so only the fields it
/// honours are set.
async fn send_content(bot: &Bot, chat: tg::ChatId, content: &OutboundContent) -> Result<()> {
    debug!("Composing {} for chat {}", content.kind_name(), chat.0);
    match content {
        OutboundContent::Text {
            text,
            link_preview_disabled,
        } => {
            let mut request = bot
                .send_message(chat, text.text.clone())
                .entities(to_entities(&text.entities));
            if *link_preview_disabled {
                request = request.link_preview_options(preview_disabled());
            }
            request.await?;
        }
        OutboundContent::Animation {
            animation,
            caption,
            has_spoiler,
            ..
        } => {
            with_caption!(bot.send_animation(chat, input_file(animation)), caption)
                .has_spoiler(*has_spoiler)
                .await?;
        }
        OutboundContent::Audio {
            audio,
            title,
            performer,
            caption,
            ..
        } => {
            let mut request = with_caption!(bot.send_audio(chat, input_file(audio)), caption);
            if !title.is_empty() {
                request = request.title(title.clone());
            }
            if !performer.is_empty() {
                request = request.performer(performer.clone());
            }
            request.await?;
        }
        OutboundContent::Document {
            document, caption, ..
        } => {
            with_caption!(bot.send_document(chat, input_file(document)), caption).await?;
        }
        OutboundContent::Photo {
            photo,
            caption,
            has_spoiler,
            ..
        } => {
            with_caption!(bot.send_photo(chat, input_file(photo)), caption)
                .has_spoiler(*has_spoiler)
                .await?;
        }
        OutboundContent::Sticker { sticker, emoji, .. } => {
            let mut request = bot.send_sticker(chat, input_file(sticker));
            if !emoji.is_empty() {
                request = request.emoji(emoji.clone());
            }
            request.await?;
        }
        OutboundContent::Video {
            video,
            supports_streaming,
            caption,
            has_spoiler,
            ..
        } => {
            with_caption!(bot.send_video(chat, input_file(video)), caption)
                .supports_streaming(*supports_streaming)
                .has_spoiler(*has_spoiler)
                .await?;
        }
        OutboundContent::VideoNote { video_note, .. } => {
            bot.send_video_note(chat, input_file(video_note)).await?;
        }
        OutboundContent::VoiceNote {
            voice_note,
            caption,
            ..
        } => {
            with_caption!(bot.send_voice(chat, input_file(voice_note)), caption).await?;
        }
        // Heading and alert radius only apply to live locations, which are
        // relayed as a static point.
        OutboundContent::Location { location, .. } => {
            let mut request = bot.send_location(chat, location.latitude, location.longitude);
            if let Some(accuracy) = location.horizontal_accuracy {
                request = request.horizontal_accuracy(accuracy);
            }
            request.await?;
        }
        OutboundContent::Venue { venue } => {
            let mut request = bot.send_venue(
                chat,
                venue.location.latitude,
                venue.location.longitude,
                venue.title.clone(),
                venue.address.clone(),
            );
            if let Some(id) = &venue.foursquare_id {
                request = request.foursquare_id(id.clone());
            }
            if let Some(kind) = &venue.foursquare_type {
                request = request.foursquare_type(kind.clone());
            }
            if let Some(id) = &venue.google_place_id {
                request = request.google_place_id(id.clone());
            }
            if let Some(kind) = &venue.google_place_type {
                request = request.google_place_type(kind.clone());
            }
            request.await?;
        }
        OutboundContent::Contact { contact } => {
            let mut request = bot.send_contact(
                chat,
                contact.phone_number.clone(),
                contact.first_name.clone(),
            );
            if !contact.last_name.is_empty() {
                request = request.last_name(contact.last_name.clone());
            }
            if !contact.vcard.is_empty() {
                request = request.vcard(contact.vcard.clone());
            }
            request.await?;
        }
        OutboundContent::Dice { emoji } => {
            let mut request = bot.send_dice(chat);
            if let Some(emoji) = parse_dice_emoji(emoji) {
                request = request.emoji(emoji);
            }
            request.await?;
        }
        OutboundContent::Poll {
            question,
            options,
            is_anonymous,
            kind,
            is_closed,
            ..
        } => {
            let options: Vec<tg::InputPollOption> = options
                .iter()
                .map(|text| tg::InputPollOption::new(text.clone()))
                .collect();
            let mut request = bot
                .send_poll(chat, question.clone(), options)
                .is_anonymous(*is_anonymous)
                .is_closed(*is_closed);
            match kind {
                PollKind::Regular {
                    allow_multiple_answers,
                } => {
                    request = request.allows_multiple_answers(*allow_multiple_answers);
                }
                PollKind::Quiz {
                    correct_option_id,
                    explanation,
                } => {
                    request = request.type_(tg::PollType::Quiz);
                    if let Some(id) = correct_option_id {
                        request = request.correct_option_id(*id);
                    }
                    if let Some(explanation) = explanation {
                        request = request.explanation(explanation.clone());
                    }
                }
            }
            request.await?;
        }
        OutboundContent::Story { story } => {
            bail!(
                "story {} from chat {} can only be forwarded, not composed",
                story.story_id,
                story.sender_chat
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_name() {
        assert_eq!(join_name(Some("Ada"), Some("Lovelace")), "Ada Lovelace");
        assert_eq!(join_name(Some("Ada"), None), "Ada");
        assert_eq!(join_name(None, None), "");
    }

    #[test]
    fn test_dice_emoji_round_trip() {
        for emoji in ["🎲", "🎯", "🏀", "⚽", "🎳", "🎰"] {
            let parsed = parse_dice_emoji(emoji).unwrap();
            assert_eq!(dice_emoji(&parsed), emoji);
        }
        assert!(parse_dice_emoji("🃏").is_none());
    }

    #[test]
    fn test_to_entities_drops_platform_detected_kinds() {
        let entities = vec![
            TextEntity {
                offset: 0,
                length: 4,
                kind: EntityKind::Bold,
            },
            TextEntity {
                offset: 5,
                length: 8,
                kind: EntityKind::Other,
            },
            TextEntity {
                offset: 14,
                length: 4,
                kind: EntityKind::TextLink {
                    url: "https://example.com/".to_string(),
                },
            },
            TextEntity {
                offset: 19,
                length: 2,
                kind: EntityKind::TextLink {
                    url: "not a url".to_string(),
                },
            },
        ];
        let converted = to_entities(&entities);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].kind, tg::MessageEntityKind::Bold);
        assert_eq!(converted[1].offset, 14);
    }

    #[test]
    fn test_entity_kind_mapping() {
        assert_eq!(entity_kind(&tg::MessageEntityKind::Italic), EntityKind::Italic);
        assert_eq!(
            entity_kind(&tg::MessageEntityKind::Pre {
                language: Some("rust".to_string())
            }),
            EntityKind::Pre {
                language: Some("rust".to_string())
            }
        );
        assert_eq!(entity_kind(&tg::MessageEntityKind::Hashtag), EntityKind::Other);
    }
}
