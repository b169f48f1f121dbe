pub mod mapper;

use chrono::{DateTime, Utc};

use crate::platform::ChatHandle;

/// A file already stored on the platform, addressed by its remote id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    /// Declared byte size of the encoded file
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub file: Option<RemoteFile>,
    pub width: u32,
    pub height: u32,
}

/// Text plus the formatting entities applied to it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedText {
    pub text: String,
    pub entities: Vec<TextEntity>,
}

#[cfg(test)]
impl FormattedText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntity {
    /// Offset in UTF-16 code units
    pub offset: usize,
    pub length: usize,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre { language: Option<String> },
    TextLink { url: String },
    /// Entities the platform detects on its own (mentions, hashtags, urls...)
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub file: Option<RemoteFile>,
    pub thumbnail: Option<Thumbnail>,
    pub duration: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    pub file: Option<RemoteFile>,
    pub album_cover_thumbnail: Option<Thumbnail>,
    pub duration: u32,
    pub title: String,
    pub performer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file: Option<RemoteFile>,
    pub thumbnail: Option<Thumbnail>,
}

/// One resolution variant of a photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSize {
    pub file: Option<RemoteFile>,
    pub width: u32,
    pub height: u32,
}

impl PhotoSize {
    /// Declared byte size; a variant without a file counts as empty.
    pub fn byte_size(&self) -> u64 {
        self.file.as_ref().map_or(0, |f| f.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sticker {
    pub file: Option<RemoteFile>,
    pub thumbnail: Option<Thumbnail>,
    pub width: u32,
    pub height: u32,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub file: Option<RemoteFile>,
    pub thumbnail: Option<Thumbnail>,
    pub duration: u32,
    pub width: u32,
    pub height: u32,
    pub supports_streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoNote {
    pub file: Option<RemoteFile>,
    pub thumbnail: Option<Thumbnail>,
    pub duration: u32,
    /// Diameter of the round video
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceNote {
    pub file: Option<RemoteFile>,
    pub duration: u32,
    pub waveform: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub horizontal_accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub location: Location,
    pub title: String,
    pub address: String,
    pub foursquare_id: Option<String>,
    pub foursquare_type: Option<String>,
    pub google_place_id: Option<String>,
    pub google_place_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub vcard: String,
    #[allow(dead_code)] // informational, a contact card is sent by phone number
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOption {
    pub text: String,
    #[allow(dead_code)] // votes are not carried into a copied poll
    pub voter_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollKind {
    Regular {
        allow_multiple_answers: bool,
    },
    Quiz {
        correct_option_id: Option<u8>,
        explanation: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub question: String,
    pub options: Vec<PollOption>,
    pub is_anonymous: bool,
    pub kind: PollKind,
    pub open_period: Option<u32>,
    pub close_date: Option<DateTime<Utc>>,
    pub is_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub sender_chat: ChatHandle,
    pub story_id: i64,
}

/// Service and event messages. None of them carry a payload that can be
/// composed into a new message.
// Not every kind reaches a bot; they are kept so each event has a name.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    AnimatedEmoji,
    Game,
    Invoice,
    Call,
    VideoChatScheduled,
    VideoChatStarted,
    VideoChatEnded,
    InviteVideoChatParticipants,
    BasicGroupChatCreate,
    SupergroupChatCreate,
    ChatChangeTitle,
    ChatChangePhoto,
    ChatDeletePhoto,
    ChatAddMembers,
    ChatJoinByLink,
    ChatJoinByRequest,
    ChatDeleteMember,
    ChatUpgradeTo,
    ChatUpgradeFrom,
    PinMessage,
    ScreenshotTaken,
    ChatSetBackground,
    ChatSetTheme,
    ChatSetMessageAutoDeleteTime,
    ForumTopicCreated,
    ForumTopicEdited,
    ForumTopicIsClosedToggled,
    ForumTopicIsHiddenToggled,
    SuggestProfilePhoto,
    CustomServiceAction,
    GameScore,
    PaymentSuccessful,
    PaymentSuccessfulBot,
    GiftedPremium,
    PremiumGiftCode,
    PremiumGiveawayCreated,
    PremiumGiveaway,
    PremiumGiveawayCompleted,
    ContactRegistered,
    UserShared,
    ChatShared,
    BotWriteAccessAllowed,
    WebAppDataSent,
    WebAppDataReceived,
    PassportDataSent,
    PassportDataReceived,
    ProximityAlertTriggered,
    Unsupported,
}

impl ServiceKind {
    #[cfg(test)]
    pub const ALL: [ServiceKind; 48] = [
        ServiceKind::AnimatedEmoji,
        ServiceKind::Game,
        ServiceKind::Invoice,
        ServiceKind::Call,
        ServiceKind::VideoChatScheduled,
        ServiceKind::VideoChatStarted,
        ServiceKind::VideoChatEnded,
        ServiceKind::InviteVideoChatParticipants,
        ServiceKind::BasicGroupChatCreate,
        ServiceKind::SupergroupChatCreate,
        ServiceKind::ChatChangeTitle,
        ServiceKind::ChatChangePhoto,
        ServiceKind::ChatDeletePhoto,
        ServiceKind::ChatAddMembers,
        ServiceKind::ChatJoinByLink,
        ServiceKind::ChatJoinByRequest,
        ServiceKind::ChatDeleteMember,
        ServiceKind::ChatUpgradeTo,
        ServiceKind::ChatUpgradeFrom,
        ServiceKind::PinMessage,
        ServiceKind::ScreenshotTaken,
        ServiceKind::ChatSetBackground,
        ServiceKind::ChatSetTheme,
        ServiceKind::ChatSetMessageAutoDeleteTime,
        ServiceKind::ForumTopicCreated,
        ServiceKind::ForumTopicEdited,
        ServiceKind::ForumTopicIsClosedToggled,
        ServiceKind::ForumTopicIsHiddenToggled,
        ServiceKind::SuggestProfilePhoto,
        ServiceKind::CustomServiceAction,
        ServiceKind::GameScore,
        ServiceKind::PaymentSuccessful,
        ServiceKind::PaymentSuccessfulBot,
        ServiceKind::GiftedPremium,
        ServiceKind::PremiumGiftCode,
        ServiceKind::PremiumGiveawayCreated,
        ServiceKind::PremiumGiveaway,
        ServiceKind::PremiumGiveawayCompleted,
        ServiceKind::ContactRegistered,
        ServiceKind::UserShared,
        ServiceKind::ChatShared,
        ServiceKind::BotWriteAccessAllowed,
        ServiceKind::WebAppDataSent,
        ServiceKind::WebAppDataReceived,
        ServiceKind::PassportDataSent,
        ServiceKind::PassportDataReceived,
        ServiceKind::ProximityAlertTriggered,
        ServiceKind::Unsupported,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::AnimatedEmoji => "animated_emoji",
            ServiceKind::Game => "game",
            ServiceKind::Invoice => "invoice",
            ServiceKind::Call => "call",
            ServiceKind::VideoChatScheduled => "video_chat_scheduled",
            ServiceKind::VideoChatStarted => "video_chat_started",
            ServiceKind::VideoChatEnded => "video_chat_ended",
            ServiceKind::InviteVideoChatParticipants => "invite_video_chat_participants",
            ServiceKind::BasicGroupChatCreate => "basic_group_chat_create",
            ServiceKind::SupergroupChatCreate => "supergroup_chat_create",
            ServiceKind::ChatChangeTitle => "chat_change_title",
            ServiceKind::ChatChangePhoto => "chat_change_photo",
            ServiceKind::ChatDeletePhoto => "chat_delete_photo",
            ServiceKind::ChatAddMembers => "chat_add_members",
            ServiceKind::ChatJoinByLink => "chat_join_by_link",
            ServiceKind::ChatJoinByRequest => "chat_join_by_request",
            ServiceKind::ChatDeleteMember => "chat_delete_member",
            ServiceKind::ChatUpgradeTo => "chat_upgrade_to",
            ServiceKind::ChatUpgradeFrom => "chat_upgrade_from",
            ServiceKind::PinMessage => "pin_message",
            ServiceKind::ScreenshotTaken => "screenshot_taken",
            ServiceKind::ChatSetBackground => "chat_set_background",
            ServiceKind::ChatSetTheme => "chat_set_theme",
            ServiceKind::ChatSetMessageAutoDeleteTime => "chat_set_message_auto_delete_time",
            ServiceKind::ForumTopicCreated => "forum_topic_created",
            ServiceKind::ForumTopicEdited => "forum_topic_edited",
            ServiceKind::ForumTopicIsClosedToggled => "forum_topic_is_closed_toggled",
            ServiceKind::ForumTopicIsHiddenToggled => "forum_topic_is_hidden_toggled",
            ServiceKind::SuggestProfilePhoto => "suggest_profile_photo",
            ServiceKind::CustomServiceAction => "custom_service_action",
            ServiceKind::GameScore => "game_score",
            ServiceKind::PaymentSuccessful => "payment_successful",
            ServiceKind::PaymentSuccessfulBot => "payment_successful_bot",
            ServiceKind::GiftedPremium => "gifted_premium",
            ServiceKind::PremiumGiftCode => "premium_gift_code",
            ServiceKind::PremiumGiveawayCreated => "premium_giveaway_created",
            ServiceKind::PremiumGiveaway => "premium_giveaway",
            ServiceKind::PremiumGiveawayCompleted => "premium_giveaway_completed",
            ServiceKind::ContactRegistered => "contact_registered",
            ServiceKind::UserShared => "user_shared",
            ServiceKind::ChatShared => "chat_shared",
            ServiceKind::BotWriteAccessAllowed => "bot_write_access_allowed",
            ServiceKind::WebAppDataSent => "web_app_data_sent",
            ServiceKind::WebAppDataReceived => "web_app_data_received",
            ServiceKind::PassportDataSent => "passport_data_sent",
            ServiceKind::PassportDataReceived => "passport_data_received",
            ServiceKind::ProximityAlertTriggered => "proximity_alert_triggered",
            ServiceKind::Unsupported => "unsupported",
        }
    }
}

/// Content of an inbound message.
///
/// The set is closed: adding a kind means every `match` over it (the mapper,
/// text extraction, kind naming) has to decide what to do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text {
        text: FormattedText,
        link_preview_disabled: bool,
    },
    Animation {
        animation: Animation,
        caption: FormattedText,
        has_spoiler: bool,
    },
    Audio {
        audio: Audio,
        caption: FormattedText,
    },
    Document {
        document: Document,
        caption: FormattedText,
    },
    Photo {
        sizes: Vec<PhotoSize>,
        caption: FormattedText,
        has_spoiler: bool,
    },
    ExpiredPhoto,
    Sticker {
        sticker: Sticker,
    },
    Video {
        video: Video,
        caption: FormattedText,
        has_spoiler: bool,
    },
    ExpiredVideo,
    VideoNote {
        video_note: VideoNote,
    },
    VoiceNote {
        voice_note: VoiceNote,
        caption: FormattedText,
    },
    Location {
        location: Location,
        live_period: Option<u32>,
        heading: Option<u32>,
        proximity_alert_radius: Option<u32>,
    },
    Venue {
        venue: Venue,
    },
    Contact {
        contact: Contact,
    },
    Dice {
        emoji: String,
        #[allow(dead_code)] // a copied dice is rolled again
        value: u8,
    },
    Poll {
        poll: Poll,
    },
    Story {
        story: Story,
    },
    Service(ServiceKind),
}

impl MessageContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            MessageContent::Text { .. } => "text",
            MessageContent::Animation { .. } => "animation",
            MessageContent::Audio { .. } => "audio",
            MessageContent::Document { .. } => "document",
            MessageContent::Photo { .. } => "photo",
            MessageContent::ExpiredPhoto => "expired_photo",
            MessageContent::Sticker { .. } => "sticker",
            MessageContent::Video { .. } => "video",
            MessageContent::ExpiredVideo => "expired_video",
            MessageContent::VideoNote { .. } => "video_note",
            MessageContent::VoiceNote { .. } => "voice_note",
            MessageContent::Location { .. } => "location",
            MessageContent::Venue { .. } => "venue",
            MessageContent::Contact { .. } => "contact",
            MessageContent::Dice { .. } => "dice",
            MessageContent::Poll { .. } => "poll",
            MessageContent::Story { .. } => "story",
            MessageContent::Service(kind) => kind.name(),
        }
    }
}

/// Pull the most meaningful human-readable string out of a message: the body
/// of a text message, the caption of captioned media, the title of a venue,
/// the name of a contact. Every other kind yields an empty string.
pub fn extract_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text { text, .. } => text.text.clone(),
        MessageContent::Animation { caption, .. }
        | MessageContent::Audio { caption, .. }
        | MessageContent::Document { caption, .. }
        | MessageContent::Photo { caption, .. }
        | MessageContent::Video { caption, .. }
        | MessageContent::VoiceNote { caption, .. } => caption.text.clone(),
        MessageContent::Venue { venue } => venue.title.clone(),
        MessageContent::Contact { contact } => {
            format!("{} {}", contact.first_name, contact.last_name)
        }
        MessageContent::ExpiredPhoto
        | MessageContent::Sticker { .. }
        | MessageContent::ExpiredVideo
        | MessageContent::VideoNote { .. }
        | MessageContent::Location { .. }
        | MessageContent::Dice { .. }
        | MessageContent::Poll { .. }
        | MessageContent::Story { .. }
        | MessageContent::Service(_) => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn file(id: &str, size: u64) -> Option<RemoteFile> {
        Some(RemoteFile {
            id: id.to_string(),
            size,
        })
    }

    pub fn thumb(id: &str) -> Option<Thumbnail> {
        Some(Thumbnail {
            file: file(id, 1_000),
            width: 90,
            height: 60,
        })
    }

    pub fn text(body: &str) -> MessageContent {
        MessageContent::Text {
            text: FormattedText::plain(body),
            link_preview_disabled: false,
        }
    }

    pub fn photo(sizes: &[u64], caption: &str) -> MessageContent {
        MessageContent::Photo {
            sizes: sizes
                .iter()
                .enumerate()
                .map(|(i, size)| PhotoSize {
                    file: file(&format!("photo-{}", size), *size),
                    width: 100 * (i as u32 + 1),
                    height: 80 * (i as u32 + 1),
                })
                .collect(),
            caption: FormattedText::plain(caption),
            has_spoiler: false,
        }
    }

    pub fn video(caption: &str) -> MessageContent {
        MessageContent::Video {
            video: Video {
                file: file("video-1", 4_000_000),
                thumbnail: thumb("video-thumb"),
                duration: 42,
                width: 1280,
                height: 720,
                supports_streaming: true,
            },
            caption: FormattedText {
                text: caption.to_string(),
                entities: vec![TextEntity {
                    offset: 0,
                    length: 3,
                    kind: EntityKind::Bold,
                }],
            },
            has_spoiler: true,
        }
    }

    pub fn contact(first: &str, last: &str) -> MessageContent {
        MessageContent::Contact {
            contact: Contact {
                phone_number: "+15550100".to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                vcard: String::new(),
                user_id: None,
            },
        }
    }

    pub fn venue(title: &str) -> MessageContent {
        MessageContent::Venue {
            venue: Venue {
                location: Location {
                    latitude: 52.37,
                    longitude: 4.89,
                    horizontal_accuracy: None,
                },
                title: title.to_string(),
                address: "Dam 1".to_string(),
                foursquare_id: None,
                foursquare_type: None,
                google_place_id: None,
                google_place_type: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_extract_text_body_and_caption() {
        assert_eq!(extract_text(&text("hello world")), "hello world");
        assert_eq!(extract_text(&photo(&[10, 20], "a caption")), "a caption");
        assert_eq!(extract_text(&video("vid caption")), "vid caption");
    }

    #[test]
    fn test_extract_text_voice_note_caption() {
        let content = MessageContent::VoiceNote {
            voice_note: VoiceNote {
                file: file("voice", 10),
                duration: 3,
                waveform: vec![1, 2, 3],
            },
            caption: FormattedText::plain("listen"),
        };
        assert_eq!(extract_text(&content), "listen");
    }

    #[test]
    fn test_extract_text_venue_and_contact() {
        assert_eq!(extract_text(&venue("Royal Palace")), "Royal Palace");
        assert_eq!(extract_text(&contact("Ada", "Lovelace")), "Ada Lovelace");
    }

    #[test]
    fn test_extract_text_empty_for_kinds_without_text() {
        let dice = MessageContent::Dice {
            emoji: "🎲".to_string(),
            value: 4,
        };
        assert_eq!(extract_text(&dice), "");
        assert_eq!(extract_text(&MessageContent::ExpiredPhoto), "");
        for kind in ServiceKind::ALL {
            assert_eq!(extract_text(&MessageContent::Service(kind)), "");
        }
    }

    #[test]
    fn test_service_kind_names_are_unique() {
        let mut names: Vec<&str> = ServiceKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ServiceKind::ALL.len());
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(text("x").kind_name(), "text");
        assert_eq!(
            MessageContent::Service(ServiceKind::PinMessage).kind_name(),
            "pin_message"
        );
    }
}
