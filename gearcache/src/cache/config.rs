use std::env;
use std::str::FromStr;

use bitflags::bitflags;

use gearcache_lib::util::error::CacheError;
use gearcache_lib::util::{env_or, CacheResult};

use crate::cache::policy::CachePolicy;
use crate::cache::{Member, Presence};

bitflags! {
    /// Which collections get cached at all.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    pub struct CacheFlags: u32 {
        const GUILDS = 1 << 0;
        const CHANNELS = 1 << 1;
        const USERS = 1 << 2;
        const MEMBERS = 1 << 3;
        const ROLES = 1 << 4;
        const VOICE_STATES = 1 << 5;
        const PRESENCES = 1 << 6;
        const EMOJIS = 1 << 7;
        const STICKERS = 1 << 8;
        const THREAD_MEMBERS = 1 << 9;
        const STAGE_INSTANCES = 1 << 10;
    }
}

impl CacheFlags {
    fn from_collection(name: &str) -> Option<Self> {
        let flag = match name {
            "guilds" => CacheFlags::GUILDS,
            "channels" => CacheFlags::CHANNELS,
            "users" => CacheFlags::USERS,
            "members" => CacheFlags::MEMBERS,
            "roles" => CacheFlags::ROLES,
            "voice_states" => CacheFlags::VOICE_STATES,
            "presences" => CacheFlags::PRESENCES,
            "emojis" => CacheFlags::EMOJIS,
            "stickers" => CacheFlags::STICKERS,
            "thread_members" => CacheFlags::THREAD_MEMBERS,
            "stage_instances" => CacheFlags::STAGE_INSTANCES,
            _ => return None,
        };
        Some(flag)
    }
}

impl CacheFlags {
    /// Comma separated collection names, or `all` / `none`.
    pub fn from_list(s: &str) -> CacheResult<Self> {
        let mut flags = CacheFlags::empty();
        for name in s.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            match name.to_lowercase().as_str() {
                "all" => flags = CacheFlags::all(),
                "none" => {}
                collection => {
                    flags |= CacheFlags::from_collection(collection).ok_or_else(|| CacheError::InvalidConfig {
                        key: "CACHE_FLAGS".to_string(),
                        value: name.to_string(),
                    })?
                }
            }
        }
        Ok(flags)
    }
}

/// How picky to be about caching members. Big bots can't afford to keep every member around.
#[derive(Clone)]
pub enum MemberCachePolicy {
    All,
    None,
    /// Only members with a cached voice state in the same guild
    InVoice,
    Custom(CachePolicy<Member>),
}

impl MemberCachePolicy {
    pub fn name(&self) -> &str {
        match self {
            MemberCachePolicy::All => "all",
            MemberCachePolicy::None => "none",
            MemberCachePolicy::InVoice => "in_voice",
            MemberCachePolicy::Custom(_) => "custom",
        }
    }
}

impl FromStr for MemberCachePolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(MemberCachePolicy::All),
            "none" => Ok(MemberCachePolicy::None),
            "in_voice" => Ok(MemberCachePolicy::InVoice),
            _ => Err(CacheError::InvalidConfig {
                key: "CACHE_MEMBER_POLICY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct CacheConfig {
    pub flags: CacheFlags,
    pub member_policy: MemberCachePolicy,
    pub presence_policy: CachePolicy<Presence>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            flags: CacheFlags::all(),
            member_policy: MemberCachePolicy::All,
            presence_policy: CachePolicy::all(),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> CacheResult<Self> {
        Ok(CacheConfig {
            flags: match env::var("CACHE_FLAGS") {
                Ok(list) => CacheFlags::from_list(&list)?,
                Err(_) => CacheFlags::all(),
            },
            member_policy: env_or("CACHE_MEMBER_POLICY", MemberCachePolicy::All)?,
            presence_policy: CachePolicy::all(),
        })
    }

    pub fn with_flags(mut self, flags: CacheFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_member_policy(mut self, policy: MemberCachePolicy) -> Self {
        self.member_policy = policy;
        self
    }

    pub fn with_presence_policy(mut self, policy: CachePolicy<Presence>) -> Self {
        self.presence_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collection_lists() {
        let flags = CacheFlags::from_list("guilds, members,voice_states").unwrap();
        assert_eq!(flags, CacheFlags::GUILDS | CacheFlags::MEMBERS | CacheFlags::VOICE_STATES);

        assert_eq!(CacheFlags::from_list("ALL").unwrap(), CacheFlags::all());
        assert_eq!(CacheFlags::from_list("none").unwrap(), CacheFlags::empty());
        assert_eq!(CacheFlags::from_list("").unwrap(), CacheFlags::empty());
    }

    #[test]
    fn unknown_collections_are_config_errors() {
        let err = CacheFlags::from_list("guilds,messages").unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("messages"));
    }

    #[test]
    fn parses_member_policies() {
        assert_eq!("in_voice".parse::<MemberCachePolicy>().unwrap().name(), "in_voice");
        assert_eq!(" None ".parse::<MemberCachePolicy>().unwrap().name(), "none");
        assert!("sometimes".parse::<MemberCachePolicy>().is_err());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = CacheConfig::default()
            .with_flags(CacheFlags::GUILDS)
            .with_member_policy(MemberCachePolicy::None);

        assert_eq!(config.flags, CacheFlags::GUILDS);
        assert_eq!(config.member_policy.name(), "none");
    }
}
