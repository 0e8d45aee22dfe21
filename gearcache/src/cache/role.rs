use twilight_model::guild::Permissions;

use gearcache_lib::util::markers::{GuildId, RoleId};

use crate::cache::diff::Comparable;
use crate::cache::grouped_store::ScopedEntity;
use crate::cache::store::{Entity, Shared};
use crate::cache::Cache;
use crate::gateway::RolePayload;

#[derive(Clone, Debug, PartialEq)]
pub struct Role {
    pub guild_id: GuildId,
    pub id: RoleId,
    pub name: String,
    pub color: u32,
    pub hoisted: bool,
    pub icon: Option<String>,
    pub emoji: Option<String>,
    pub position: i64,
    pub permissions: Permissions,
    pub managed: bool,
    pub mentionable: bool,
}

impl Role {
    pub fn from_payload(guild_id: GuildId, role: RolePayload) -> Self {
        Role {
            guild_id,
            id: role.id,
            name: role.name,
            color: role.color,
            hoisted: role.hoist,
            icon: role.icon,
            emoji: role.unicode_emoji,
            position: role.position,
            permissions: role.permissions,
            managed: role.managed,
            mentionable: role.mentionable,
        }
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> RoleId {
        self.id
    }
}

impl ScopedEntity for Role {
    type ParentId = GuildId;

    fn parent_id(&self) -> GuildId {
        self.guild_id
    }
}

impl Comparable for Role {
    fn is_updated(&self, newer: &Self) -> bool {
        self != newer
    }
}

impl Cache {
    pub fn get_role(&self, guild_id: &GuildId, role_id: &RoleId) -> Option<Shared<Role>> {
        self.roles().get(guild_id, role_id)
    }

    /// The guild's roles from the bottom of the list to the top.
    pub fn guild_roles_ordered(&self, guild_id: &GuildId) -> Vec<Shared<Role>> {
        let mut roles = self.roles().group_all(guild_id);
        // equal positions are ordered by id
        roles.sort_by_key(|role| {
            let role = role.read();
            (role.position, role.id)
        });
        roles
    }

    /// Removes the role from the guild and from every cached member holding it.
    pub fn remove_role(&self, guild_id: &GuildId, role_id: &RoleId) -> Option<Shared<Role>> {
        let removed = self.roles().remove(guild_id, role_id)?;
        for member in self.members().group_all(guild_id) {
            member.write().roles.retain(|role| role != role_id);
        }
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;

    fn role(id: u64, position: i64) -> Role {
        Role {
            guild_id: GuildId::new(1),
            id: RoleId::new(id),
            name: format!("role {}", id),
            color: 0,
            hoisted: false,
            icon: None,
            emoji: None,
            position,
            permissions: Permissions::empty(),
            managed: false,
            mentionable: false,
        }
    }

    #[test]
    fn roles_order_by_position_then_id() {
        let cache = Cache::new(CacheConfig::default());
        cache.roles().put(role(30, 2));
        cache.roles().put(role(20, 1));
        cache.roles().put(role(10, 1));

        let order = cache
            .guild_roles_ordered(&GuildId::new(1))
            .iter()
            .map(|role| role.read().id.get())
            .collect::<Vec<_>>();
        assert_eq!(order, vec![10, 20, 30]);
    }

    #[test]
    fn permission_changes_are_updates() {
        let cached = role(1, 0);
        assert!(!cached.is_updated(&role(1, 0)));
        assert!(cached.is_updated(&Role {
            permissions: Permissions::ADMINISTRATOR,
            ..role(1, 0)
        }));
    }
}
