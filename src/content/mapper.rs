use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{
    Contact, FormattedText, Location, MessageContent, PhotoSize, PollKind, RemoteFile, Story,
    Thumbnail, Venue,
};

/// Remote file id to send in place of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileId(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputThumbnail {
    pub file: RemoteFileId,
    pub width: u32,
    pub height: u32,
}

/// Payload for composing a fresh copy of a message in another chat.
///
/// Carries every field of the source. The Bot API adapter re-sends files by
/// id and lets the platform supply dimensions, durations and thumbnails, so
/// it leaves some of them unread.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundContent {
    Text {
        text: FormattedText,
        link_preview_disabled: bool,
    },
    Animation {
        animation: RemoteFileId,
        thumbnail: Option<InputThumbnail>,
        duration: u32,
        width: u32,
        height: u32,
        caption: FormattedText,
        has_spoiler: bool,
    },
    Audio {
        audio: RemoteFileId,
        album_cover_thumbnail: Option<InputThumbnail>,
        duration: u32,
        title: String,
        performer: String,
        caption: FormattedText,
    },
    Document {
        document: RemoteFileId,
        thumbnail: Option<InputThumbnail>,
        caption: FormattedText,
    },
    Photo {
        photo: RemoteFileId,
        thumbnail: Option<InputThumbnail>,
        width: u32,
        height: u32,
        caption: FormattedText,
        has_spoiler: bool,
    },
    Sticker {
        sticker: RemoteFileId,
        thumbnail: Option<InputThumbnail>,
        width: u32,
        height: u32,
        emoji: String,
    },
    Video {
        video: RemoteFileId,
        thumbnail: Option<InputThumbnail>,
        duration: u32,
        width: u32,
        height: u32,
        supports_streaming: bool,
        caption: FormattedText,
        has_spoiler: bool,
    },
    VideoNote {
        video_note: RemoteFileId,
        thumbnail: Option<InputThumbnail>,
        duration: u32,
        length: u32,
    },
    VoiceNote {
        voice_note: RemoteFileId,
        duration: u32,
        waveform: Vec<u8>,
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
    },
    Poll {
        question: String,
        options: Vec<String>,
        is_anonymous: bool,
        kind: PollKind,
        open_period: Option<u32>,
        close_date: Option<DateTime<Utc>>,
        is_closed: bool,
    },
    Story {
        story: Story,
    },
}

impl OutboundContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            OutboundContent::Text { .. } => "text",
            OutboundContent::Animation { .. } => "animation",
            OutboundContent::Audio { .. } => "audio",
            OutboundContent::Document { .. } => "document",
            OutboundContent::Photo { .. } => "photo",
            OutboundContent::Sticker { .. } => "sticker",
            OutboundContent::Video { .. } => "video",
            OutboundContent::VideoNote { .. } => "video_note",
            OutboundContent::VoiceNote { .. } => "voice_note",
            OutboundContent::Location { .. } => "location",
            OutboundContent::Venue { .. } => "venue",
            OutboundContent::Contact { .. } => "contact",
            OutboundContent::Dice { .. } => "dice",
            OutboundContent::Poll { .. } => "poll",
            OutboundContent::Story { .. } => "story",
        }
    }
}

/// Why a message cannot be turned into an outbound payload. Every variant is
/// a per-message condition: the message is skipped, the relay carries on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("message type {0} is not supported, skipping")]
    UnsupportedKind(&'static str),

    #[error("{0} has expired")]
    ExpiredContent(&'static str),

    #[error("{0} message is missing its file reference")]
    MissingFileReference(&'static str),
}

fn input_file(file: Option<&RemoteFile>, kind: &'static str) -> Result<RemoteFileId, MappingError> {
    file.map(|f| RemoteFileId(f.id.clone()))
        .ok_or(MappingError::MissingFileReference(kind))
}

/// Thumbnails are optional: a missing one, or one without a file, is dropped.
fn input_thumbnail(thumbnail: Option<&Thumbnail>) -> Option<InputThumbnail> {
    let thumbnail = thumbnail?;
    let file = thumbnail.file.as_ref()?;
    Some(InputThumbnail {
        file: RemoteFileId(file.id.clone()),
        width: thumbnail.width,
        height: thumbnail.height,
    })
}

fn thumbnail_from_photo_size(size: &PhotoSize) -> Option<InputThumbnail> {
    let file = size.file.as_ref()?;
    Some(InputThumbnail {
        file: RemoteFileId(file.id.clone()),
        width: size.width,
        height: size.height,
    })
}

/// Largest variant by declared byte size, first one wins on a tie.
fn largest(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes.iter().reduce(|best, candidate| {
        if candidate.byte_size() > best.byte_size() {
            candidate
        } else {
            best
        }
    })
}

/// Smallest variant by declared byte size, first one wins on a tie.
fn smallest(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes.iter().reduce(|best, candidate| {
        if candidate.byte_size() < best.byte_size() {
            candidate
        } else {
            best
        }
    })
}

/// Translate inbound content into a payload that can be sent as a new message.
pub fn to_outbound(content: &MessageContent) -> Result<OutboundContent, MappingError> {
    let outbound = match content {
        MessageContent::Text {
            text,
            link_preview_disabled,
        } => OutboundContent::Text {
            text: text.clone(),
            link_preview_disabled: *link_preview_disabled,
        },
        MessageContent::Animation {
            animation,
            caption,
            has_spoiler,
        } => OutboundContent::Animation {
            animation: input_file(animation.file.as_ref(), "animation")?,
            thumbnail: input_thumbnail(animation.thumbnail.as_ref()),
            duration: animation.duration,
            width: animation.width,
            height: animation.height,
            caption: caption.clone(),
            has_spoiler: *has_spoiler,
        },
        MessageContent::Audio { audio, caption } => OutboundContent::Audio {
            audio: input_file(audio.file.as_ref(), "audio")?,
            album_cover_thumbnail: input_thumbnail(audio.album_cover_thumbnail.as_ref()),
            duration: audio.duration,
            title: audio.title.clone(),
            performer: audio.performer.clone(),
            caption: caption.clone(),
        },
        MessageContent::Document { document, caption } => OutboundContent::Document {
            document: input_file(document.file.as_ref(), "document")?,
            thumbnail: input_thumbnail(document.thumbnail.as_ref()),
            caption: caption.clone(),
        },
        MessageContent::Photo {
            sizes,
            caption,
            has_spoiler,
        } => {
            let primary = largest(sizes).ok_or(MappingError::MissingFileReference("photo"))?;
            OutboundContent::Photo {
                photo: input_file(primary.file.as_ref(), "photo")?,
                thumbnail: smallest(sizes).and_then(thumbnail_from_photo_size),
                width: primary.width,
                height: primary.height,
                caption: caption.clone(),
                has_spoiler: *has_spoiler,
            }
        }
        MessageContent::ExpiredPhoto => return Err(MappingError::ExpiredContent("photo")),
        MessageContent::Sticker { sticker } => OutboundContent::Sticker {
            sticker: input_file(sticker.file.as_ref(), "sticker")?,
            thumbnail: input_thumbnail(sticker.thumbnail.as_ref()),
            width: sticker.width,
            height: sticker.height,
            emoji: sticker.emoji.clone(),
        },
        MessageContent::Video {
            video,
            caption,
            has_spoiler,
        } => OutboundContent::Video {
            video: input_file(video.file.as_ref(), "video")?,
            thumbnail: input_thumbnail(video.thumbnail.as_ref()),
            duration: video.duration,
            width: video.width,
            height: video.height,
            supports_streaming: video.supports_streaming,
            caption: caption.clone(),
            has_spoiler: *has_spoiler,
        },
        MessageContent::ExpiredVideo => return Err(MappingError::ExpiredContent("video")),
        MessageContent::VideoNote { video_note } => OutboundContent::VideoNote {
            video_note: input_file(video_note.file.as_ref(), "video_note")?,
            thumbnail: input_thumbnail(video_note.thumbnail.as_ref()),
            duration: video_note.duration,
            length: video_note.length,
        },
        MessageContent::VoiceNote {
            voice_note,
            caption,
        } => OutboundContent::VoiceNote {
            voice_note: input_file(voice_note.file.as_ref(), "voice_note")?,
            duration: voice_note.duration,
            waveform: voice_note.waveform.clone(),
            caption: caption.clone(),
        },
        MessageContent::Location {
            location,
            live_period,
            heading,
            proximity_alert_radius,
        } => OutboundContent::Location {
            location: location.clone(),
            live_period: *live_period,
            heading: *heading,
            proximity_alert_radius: *proximity_alert_radius,
        },
        MessageContent::Venue { venue } => OutboundContent::Venue {
            venue: venue.clone(),
        },
        MessageContent::Contact { contact } => OutboundContent::Contact {
            contact: contact.clone(),
        },
        MessageContent::Dice { emoji, .. } => OutboundContent::Dice {
            emoji: emoji.clone(),
        },
        MessageContent::Poll { poll } => OutboundContent::Poll {
            question: poll.question.clone(),
            options: poll.options.iter().map(|o| o.text.clone()).collect(),
            is_anonymous: poll.is_anonymous,
            kind: poll.kind.clone(),
            open_period: poll.open_period,
            close_date: poll.close_date,
            is_closed: poll.is_closed,
        },
        MessageContent::Story { story } => OutboundContent::Story {
            story: story.clone(),
        },
        MessageContent::Service(kind) => return Err(MappingError::UnsupportedKind(kind.name())),
    };
    Ok(outbound)
}
