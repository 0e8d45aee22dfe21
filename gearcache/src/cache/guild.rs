use tracing::{debug, info, trace};

use gearcache_lib::util::markers::{ChannelId, GuildId, UserId};

use crate::cache::store::{Entity, Shared};
use crate::cache::{Cache, Channel, Emoji, Member, Presence, Role, StageInstance, Sticker, VoiceState};
use crate::gateway::GuildPayload;

#[derive(Clone, Debug, PartialEq)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
    pub icon: Option<String>,
    pub splash: Option<String>,
    pub banner: Option<String>,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub features: Vec<String>,
    pub preferred_locale: String,
    pub vanity_url_code: Option<String>,
    pub verification_level: u8,
    pub mfa_level: u8,
    pub nsfw_level: u8,
    pub premium_tier: u8,
    pub max_members: Option<u64>,
    pub max_presences: Option<u64>,
    // only sent on guild create, updates leave these alone
    pub member_count: Option<u64>,
    pub joined_at: Option<String>,
    pub large: Option<bool>,
    /// Set while the guild is in an outage, the rest of the data is whatever we had before it
    pub unavailable: bool,
}

impl Guild {
    pub fn from_payload(guild: &GuildPayload) -> Self {
        Guild {
            id: guild.id,
            name: guild.name.clone(),
            icon: guild.icon.clone(),
            splash: guild.splash.clone(),
            banner: guild.banner.clone(),
            description: guild.description.clone(),
            owner_id: guild.owner_id,
            features: guild.features.clone(),
            preferred_locale: guild.preferred_locale.clone(),
            vanity_url_code: guild.vanity_url_code.clone(),
            verification_level: guild.verification_level,
            mfa_level: guild.mfa_level,
            nsfw_level: guild.nsfw_level,
            premium_tier: guild.premium_tier,
            max_members: guild.max_members,
            max_presences: guild.max_presences,
            member_count: guild.member_count,
            joined_at: guild.joined_at.clone(),
            large: guild.large,
            unavailable: guild.unavailable,
        }
    }
}

impl Entity for Guild {
    type Id = GuildId;

    fn id(&self) -> GuildId {
        self.id
    }

    fn merge(&mut self, newer: Self) {
        let member_count = newer.member_count.or(self.member_count);
        let joined_at = newer.joined_at.clone().or_else(|| self.joined_at.take());
        let large = newer.large.or(self.large);
        *self = Guild {
            member_count,
            joined_at,
            large,
            ..newer
        };
    }
}

impl Cache {
    pub fn get_guild(&self, guild_id: &GuildId) -> Option<Shared<Guild>> {
        self.guilds().get(guild_id)
    }

    /// Guilds that aren't in an outage right now.
    pub fn available_guilds(&self) -> Vec<Shared<Guild>> {
        self.guilds()
            .find_all(|guild| !self.readiness().is_unavailable(guild.id))
    }

    /// Store a full guild snapshot. Collections the snapshot fully describes replace whatever we had,
    /// members and presences only ever arrive partially so those are merged.
    pub(crate) fn load_guild(&self, mut payload: GuildPayload) -> Shared<Guild> {
        let guild_id = payload.id;
        trace!("Loading guild {} into the cache", guild_id);
        let guild = self.guilds().put(Guild::from_payload(&payload));

        let mut channels = std::mem::take(&mut payload.channels)
            .into_iter()
            .map(|channel| Channel::from_guild_payload(guild_id, channel))
            .collect::<Vec<_>>();
        channels.extend(
            std::mem::take(&mut payload.threads)
                .into_iter()
                .map(|thread| Channel::from_guild_payload(guild_id, thread)),
        );
        let known = channels.iter().map(|channel| channel.id).collect::<Vec<ChannelId>>();
        for channel in channels {
            self.channels().put(channel);
        }
        for stale in self
            .channels()
            .find_all(|channel| channel.guild_id == Some(guild_id) && !known.contains(&channel.id))
        {
            let channel_id = stale.read().id;
            self.remove_channel(&channel_id);
        }

        self.roles().replace_group(
            guild_id,
            std::mem::take(&mut payload.roles)
                .into_iter()
                .map(|role| Role::from_payload(guild_id, role))
                .collect(),
        );
        self.emojis().replace_group(
            guild_id,
            std::mem::take(&mut payload.emojis)
                .into_iter()
                .map(|emoji| Emoji::from_payload(guild_id, emoji))
                .collect(),
        );
        self.stickers().replace_group(
            guild_id,
            std::mem::take(&mut payload.stickers)
                .into_iter()
                .map(|sticker| Sticker::from_payload(guild_id, sticker))
                .collect(),
        );

        let stages = std::mem::take(&mut payload.stage_instances);
        let live_stages = stages.iter().map(|stage| stage.id).collect::<Vec<_>>();
        self.stage_instances()
            .remove_where(|stage| stage.guild_id == guild_id && !live_stages.contains(&stage.id));
        for stage in stages {
            self.stage_instances().put(StageInstance::from_payload(stage));
        }

        // voice states before members so an in-voice member policy can see them
        self.voice_states().replace_group(
            guild_id,
            std::mem::take(&mut payload.voice_states)
                .into_iter()
                .filter(|state| state.channel_id.is_some())
                .map(|state| VoiceState::from_payload(guild_id, state))
                .collect(),
        );
        let connections = self
            .voice_states()
            .group_all(&guild_id)
            .iter()
            .filter_map(|state| {
                let state = state.read();
                state.channel_id.map(|channel_id| (state.user_id, channel_id))
            })
            .collect::<Vec<_>>();
        self.connected().rebuild_guild(guild_id, connections);

        let members = std::mem::take(&mut payload.members);
        let mut cached_members = 0;
        for member in members {
            if self.cache_member(Member::from_payload(guild_id, member)).is_ok() {
                cached_members += 1;
            }
        }
        for presence in std::mem::take(&mut payload.presences) {
            self.presences().put(Presence::from_payload(guild_id, presence));
        }

        debug!(
            "Guild {} loaded with {} channels, {} roles and {} of its members",
            guild_id,
            known.len(),
            self.roles().group_len(&guild_id),
            cached_members
        );

        guild
    }

    /// Flag the guild as being in an outage, keeping whatever we have cached for it.
    pub fn set_guild_unavailable(&self, guild_id: GuildId) -> Option<Shared<Guild>> {
        self.readiness().mark_unavailable(guild_id);
        let guild = self.get_guild(&guild_id);
        if let Some(guild) = &guild {
            guild.write().unavailable = true;
        }
        guild
    }

    /// Purge the guild along with everything that only exists inside it.
    pub fn remove_guild(&self, guild_id: GuildId) -> Option<Shared<Guild>> {
        let old = self.guilds().remove(&guild_id);

        let channels = self
            .channels()
            .remove_where(|channel| channel.guild_id == Some(guild_id));
        for channel in &channels {
            self.thread_members().remove_group(&channel.read().id);
        }

        self.roles().remove_group(&guild_id);
        self.emojis().remove_group(&guild_id);
        self.stickers().remove_group(&guild_id);
        self.presences().remove_group(&guild_id);
        self.voice_states().remove_group(&guild_id);
        self.stage_instances().remove_where(|stage| stage.guild_id == guild_id);
        self.connected().drop_guild(guild_id);

        // members last, this might purge users without other mutual guilds
        let members = self.members().remove_group(&guild_id);
        let purged = members
            .iter()
            .filter(|member| self.remove_mutual_guild(member.read().user.id))
            .count();

        self.readiness().forget(guild_id);

        info!(
            "Removed guild {} from the cache: {} channels, {} members, purged {} users",
            guild_id,
            channels.len(),
            members.len(),
            purged
        );

        old
    }

    /// Keep the guild's member count in line with joins and leaves.
    pub(crate) fn adjust_member_count(&self, guild_id: &GuildId, delta: i64) {
        if let Some(guild) = self.get_guild(guild_id) {
            let mut guild = guild.write();
            if let Some(count) = guild.member_count {
                guild.member_count = Some((count as i64 + delta).max(0) as u64);
            }
        }
    }
}
