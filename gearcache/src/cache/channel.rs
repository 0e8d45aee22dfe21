use tracing::{debug, trace};
use twilight_model::channel::ChannelType;
use twilight_model::guild::Permissions;

use gearcache_lib::util::markers::{ChannelId, GenericId, GuildId, UserId};

use crate::cache::diff::Comparable;
use crate::cache::store::{Entity, Shared};
use crate::cache::Cache;
use crate::gateway::{ChannelPayload, PermissionOverwritePayload, ThreadMetadataPayload};

#[derive(Clone, Debug, PartialEq)]
pub struct PermissionOverwrite {
    // role or member id depending on the kind
    pub id: GenericId,
    pub kind: u8,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl From<PermissionOverwritePayload> for PermissionOverwrite {
    fn from(overwrite: PermissionOverwritePayload) -> Self {
        PermissionOverwrite {
            id: overwrite.id,
            kind: overwrite.kind,
            allow: overwrite.allow,
            deny: overwrite.deny,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThreadMetadata {
    pub archived: bool,
    pub locked: bool,
    pub auto_archive_duration: u16,
    pub archive_timestamp: Option<String>,
}

impl From<ThreadMetadataPayload> for ThreadMetadata {
    fn from(meta: ThreadMetadataPayload) -> Self {
        ThreadMetadata {
            archived: meta.archived,
            locked: meta.locked,
            auto_archive_duration: meta.auto_archive_duration,
            archive_timestamp: meta.archive_timestamp,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub kind: ChannelType,
    pub name: String,
    pub position: i32,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub bitrate: u32,
    pub user_limit: u32,
    pub rate_limit_per_user: u16,
    // category for regular channels, the channel a thread lives in for threads
    pub parent_id: Option<ChannelId>,
    pub owner_id: Option<UserId>,
    pub permission_overwrites: Vec<PermissionOverwrite>,
    pub thread_metadata: Option<ThreadMetadata>,
    pub member_count: Option<u32>,
}

impl Channel {
    pub fn from_payload(channel: ChannelPayload) -> Self {
        Channel {
            id: channel.id,
            guild_id: channel.guild_id,
            kind: channel.kind,
            name: channel.name.unwrap_or_default(),
            position: channel.position.unwrap_or_default(),
            topic: channel.topic,
            nsfw: channel.nsfw,
            bitrate: channel.bitrate.unwrap_or_default(),
            user_limit: channel.user_limit.unwrap_or_default(),
            rate_limit_per_user: channel.rate_limit_per_user.unwrap_or_default(),
            parent_id: channel.parent_id,
            owner_id: channel.owner_id,
            permission_overwrites: channel.permission_overwrites.into_iter().map(Into::into).collect(),
            thread_metadata: channel.thread_metadata.map(Into::into),
            member_count: channel.member_count,
        }
    }

    /// Channels nested in a guild create don't carry the guild id themselves.
    pub fn from_guild_payload(guild_id: GuildId, channel: ChannelPayload) -> Self {
        Channel {
            guild_id: Some(guild_id),
            ..Channel::from_payload(channel)
        }
    }

    pub fn is_thread(&self) -> bool {
        matches!(
            self.kind,
            ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::AnnouncementThread
        )
    }

    /// Channels people can connect to.
    pub fn is_voice(&self) -> bool {
        matches!(self.kind, ChannelType::GuildVoice | ChannelType::GuildStageVoice)
    }
}

impl Entity for Channel {
    type Id = ChannelId;

    fn id(&self) -> ChannelId {
        self.id
    }
}

impl Comparable for Channel {
    fn is_updated(&self, newer: &Self) -> bool {
        self != newer
    }
}

impl Cache {
    pub fn get_channel(&self, channel_id: &ChannelId) -> Option<Shared<Channel>> {
        self.channels().get(channel_id)
    }

    pub fn guild_channels(&self, guild_id: GuildId) -> Vec<Shared<Channel>> {
        self.channels()
            .find_all(|channel| channel.guild_id == Some(guild_id) && !channel.is_thread())
    }

    pub fn guild_threads(&self, guild_id: GuildId) -> Vec<Shared<Channel>> {
        self.channels()
            .find_all(|channel| channel.guild_id == Some(guild_id) && channel.is_thread())
    }

    /// Drop the channel and everything that only exists because of it: the people connected to
    /// it, their voice states and, for threads, its members.
    pub fn remove_channel(&self, channel_id: &ChannelId) -> Option<Shared<Channel>> {
        let removed = self.channels().remove(channel_id)?;
        let (guild_id, is_thread) = {
            let channel = removed.read();
            (channel.guild_id, channel.is_thread())
        };

        let disconnected = self.connected().drop_channel(*channel_id);
        if let Some(guild_id) = guild_id {
            let states = self
                .voice_states()
                .remove_in_group_where(&guild_id, |state| state.channel_id == Some(*channel_id));
            if !states.is_empty() || !disconnected.is_empty() {
                debug!(
                    "Channel {} removed, dropped {} voice states and {} connections",
                    channel_id,
                    states.len(),
                    disconnected.len()
                );
            }
        }

        if is_thread {
            let members = self.thread_members().remove_group(channel_id);
            trace!("Thread {} removed along with {} thread members", channel_id, members.len());
        }

        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, VoiceState};

    pub fn channel(id: u64, guild: u64, kind: ChannelType) -> Channel {
        Channel {
            id: ChannelId::new(id),
            guild_id: Some(GuildId::new(guild)),
            kind,
            name: format!("channel-{}", id),
            position: 0,
            topic: None,
            nsfw: false,
            bitrate: 0,
            user_limit: 0,
            rate_limit_per_user: 0,
            parent_id: None,
            owner_id: None,
            permission_overwrites: Vec::new(),
            thread_metadata: None,
            member_count: None,
        }
    }

    #[test]
    fn kinds_are_classified() {
        assert!(channel(1, 1, ChannelType::GuildVoice).is_voice());
        assert!(channel(1, 1, ChannelType::GuildStageVoice).is_voice());
        assert!(!channel(1, 1, ChannelType::GuildText).is_voice());
        assert!(channel(1, 1, ChannelType::PrivateThread).is_thread());
        assert!(!channel(1, 1, ChannelType::GuildCategory).is_thread());
    }

    #[test]
    fn removing_a_voice_channel_disconnects_everyone() {
        let cache = Cache::new(CacheConfig::default());
        let guild_id = GuildId::new(1);
        let channel_id = ChannelId::new(10);
        cache.channels().put(channel(10, 1, ChannelType::GuildVoice));
        cache.update_voice_state(VoiceState::in_channel(guild_id, UserId::new(5), channel_id));

        assert!(cache.connected().is_connected(channel_id, UserId::new(5)));
        cache.remove_channel(&channel_id).unwrap();

        assert!(cache.connected().connected(channel_id).is_empty());
        assert!(cache.voice_states().get(&guild_id, &UserId::new(5)).is_none());
        assert!(cache.get_channel(&channel_id).is_none());
    }

    #[test]
    fn guild_listing_splits_threads() {
        let cache = Cache::new(CacheConfig::default());
        cache.channels().put(channel(1, 1, ChannelType::GuildText));
        cache.channels().put(channel(2, 1, ChannelType::PublicThread));
        cache.channels().put(channel(3, 2, ChannelType::GuildText));

        assert_eq!(cache.guild_channels(GuildId::new(1)).len(), 1);
        assert_eq!(cache.guild_threads(GuildId::new(1)).len(), 1);
    }
}
