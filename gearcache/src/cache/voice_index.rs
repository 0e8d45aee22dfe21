use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::trace;

use gearcache_lib::util::markers::{ChannelId, GuildId, UserId};

/// What a voice state update did in terms of channel membership.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoiceTransition {
    Joined { channel_id: ChannelId },
    Moved { from: ChannelId, to: ChannelId },
    Left { from: Option<ChannelId> },
    /// Same channel, only things like mute or deafen changed
    StateChanged,
}

impl VoiceTransition {
    pub fn classify(old: Option<ChannelId>, new: Option<ChannelId>) -> Self {
        match (old, new) {
            (None, Some(channel_id)) => VoiceTransition::Joined { channel_id },
            (Some(from), Some(to)) if from != to => VoiceTransition::Moved { from, to },
            (Some(_), Some(_)) => VoiceTransition::StateChanged,
            (from, None) => VoiceTransition::Left { from },
        }
    }
}

struct ConnectedChannel {
    guild_id: GuildId,
    members: HashSet<UserId>,
}

/// Who is connected to which voice channel, derived from the voice state store.
#[derive(Default)]
pub struct ConnectedMembers {
    channels: RwLock<HashMap<ChannelId, ConnectedChannel>>,
}

impl ConnectedMembers {
    pub fn new() -> Self {
        Default::default()
    }

    /// Move a user from their old channel to the new one in a single write, so readers never see
    /// them in two channels or none while moving.
    pub fn apply(&self, guild_id: GuildId, user_id: UserId, old: Option<ChannelId>, new: Option<ChannelId>) {
        let mut channels = self.channels.write();
        if let Some(old) = old {
            let now_empty = match channels.get_mut(&old) {
                Some(channel) => {
                    channel.members.remove(&user_id);
                    channel.members.is_empty()
                }
                None => false,
            };
            if now_empty {
                channels.remove(&old);
            }
        }

        if let Some(new) = new {
            trace!("User {} is now connected to {} in {}", user_id, new, guild_id);
            channels
                .entry(new)
                .or_insert_with(|| ConnectedChannel {
                    guild_id,
                    members: HashSet::new(),
                })
                .members
                .insert(user_id);
        }
    }

    pub fn connected(&self, channel_id: ChannelId) -> HashSet<UserId> {
        self.channels
            .read()
            .get(&channel_id)
            .map(|channel| channel.members.clone())
            .unwrap_or_default()
    }

    pub fn is_connected(&self, channel_id: ChannelId, user_id: UserId) -> bool {
        self.channels
            .read()
            .get(&channel_id)
            .map(|channel| channel.members.contains(&user_id))
            .unwrap_or(false)
    }

    /// The channel a user is connected to in a guild. A user can sit in one channel per guild.
    pub fn channel_of(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
        self.channels
            .read()
            .iter()
            .find(|(_, channel)| channel.guild_id == guild_id && channel.members.contains(&user_id))
            .map(|(channel_id, _)| *channel_id)
    }

    pub fn drop_channel(&self, channel_id: ChannelId) -> HashSet<UserId> {
        self.channels
            .write()
            .remove(&channel_id)
            .map(|channel| channel.members)
            .unwrap_or_default()
    }

    pub fn drop_guild(&self, guild_id: GuildId) {
        self.channels.write().retain(|_, channel| channel.guild_id != guild_id);
    }

    /// Throw away the guild's entries and rebuild them from the given (user, channel) pairs.
    pub fn rebuild_guild(&self, guild_id: GuildId, states: impl IntoIterator<Item = (UserId, ChannelId)>) {
        let mut channels = self.channels.write();
        channels.retain(|_, channel| channel.guild_id != guild_id);
        for (user_id, channel_id) in states {
            channels
                .entry(channel_id)
                .or_insert_with(|| ConnectedChannel {
                    guild_id,
                    members: HashSet::new(),
                })
                .members
                .insert(user_id);
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: u64) -> ChannelId {
        ChannelId::new(id)
    }

    fn user(id: u64) -> UserId {
        UserId::new(id)
    }

    const GUILD: GuildId = GuildId::new(1);

    #[test]
    fn classifies_transitions() {
        assert_eq!(
            VoiceTransition::classify(None, Some(channel(1))),
            VoiceTransition::Joined { channel_id: channel(1) }
        );
        assert_eq!(
            VoiceTransition::classify(Some(channel(1)), Some(channel(2))),
            VoiceTransition::Moved {
                from: channel(1),
                to: channel(2)
            }
        );
        assert_eq!(
            VoiceTransition::classify(Some(channel(2)), None),
            VoiceTransition::Left { from: Some(channel(2)) }
        );
        assert_eq!(
            VoiceTransition::classify(Some(channel(2)), Some(channel(2))),
            VoiceTransition::StateChanged
        );
        assert_eq!(VoiceTransition::classify(None, None), VoiceTransition::Left { from: None });
    }

    #[test]
    fn users_follow_their_channel() {
        let index = ConnectedMembers::new();

        index.apply(GUILD, user(5), None, Some(channel(1)));
        assert!(index.is_connected(channel(1), user(5)));

        index.apply(GUILD, user(5), Some(channel(1)), Some(channel(2)));
        assert!(!index.is_connected(channel(1), user(5)));
        assert!(index.is_connected(channel(2), user(5)));
        assert_eq!(index.channel_of(GUILD, user(5)), Some(channel(2)));

        index.apply(GUILD, user(5), Some(channel(2)), None);
        assert!(index.connected(channel(2)).is_empty());
        assert_eq!(index.channel_of(GUILD, user(5)), None);
        assert_eq!(index.channel_count(), 0);
    }

    #[test]
    fn lookups_are_scoped_per_guild() {
        let index = ConnectedMembers::new();
        let other = GuildId::new(2);
        index.apply(GUILD, user(5), None, Some(channel(1)));
        index.apply(other, user(5), None, Some(channel(9)));

        assert_eq!(index.channel_of(GUILD, user(5)), Some(channel(1)));
        assert_eq!(index.channel_of(other, user(5)), Some(channel(9)));

        index.drop_guild(other);
        assert_eq!(index.channel_of(other, user(5)), None);
        assert_eq!(index.channel_of(GUILD, user(5)), Some(channel(1)));
    }

    #[test]
    fn dropping_a_channel_removes_it_whole() {
        let index = ConnectedMembers::new();
        index.apply(GUILD, user(1), None, Some(channel(1)));
        index.apply(GUILD, user(2), None, Some(channel(1)));

        let dropped = index.drop_channel(channel(1));
        assert_eq!(dropped.len(), 2);
        assert!(index.connected(channel(1)).is_empty());
    }

    #[test]
    fn guilds_are_dropped_and_rebuilt_as_a_unit() {
        let index = ConnectedMembers::new();
        let other = GuildId::new(2);
        index.apply(GUILD, user(1), None, Some(channel(1)));
        index.apply(other, user(2), None, Some(channel(9)));

        index.rebuild_guild(GUILD, vec![(user(3), channel(2))]);
        assert!(index.connected(channel(1)).is_empty());
        assert!(index.is_connected(channel(2), user(3)));
        assert!(index.is_connected(channel(9), user(2)));

        index.drop_guild(other);
        assert!(index.connected(channel(9)).is_empty());
        assert_eq!(index.channel_count(), 1);
    }
}
