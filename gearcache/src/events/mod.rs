use tracing::trace;

use crate::dispatch::Origin;
use crate::events::channel::{on_channel_create, on_channel_delete, on_channel_update};
use crate::events::emoji::on_emojis_update;
use crate::events::guild::{on_guild_create, on_guild_delete, on_guild_update};
use crate::events::member::{on_member_add, on_member_chunk, on_member_remove, on_member_update};
use crate::events::other::{on_ready, on_resume, on_user_update};
use crate::events::presence::on_presence_update;
use crate::events::role::{on_role_create, on_role_delete, on_role_update};
use crate::events::stage::{on_stage_instance_create, on_stage_instance_delete, on_stage_instance_update};
use crate::events::sticker::on_stickers_update;
use crate::events::thread::{
    on_thread_create, on_thread_delete, on_thread_member_update, on_thread_members_update, on_thread_update,
};
use crate::events::voice::on_voice_state_update;
use crate::gateway::{Dispatch, GatewayEvent};
use crate::util::CacheContext;

mod channel;
mod emoji;
mod guild;
mod member;
mod other;
mod presence;
mod role;
mod stage;
mod sticker;
mod thread;
mod voice;

//Just a hub function to fan out to the relevant handlers
pub fn handle_gateway_event(dispatch: Dispatch, context: &CacheContext) {
    let origin = Origin {
        shard: dispatch.shard,
        sequence: dispatch.sequence,
    };
    trace!("Shard: {}, Event: {}", origin.shard, dispatch.event.name());
    // update metrics first so we can move the event
    context.metrics.count_gateway_event(origin.shard, dispatch.event.name());

    match dispatch.event {
        GatewayEvent::Ready(ready) => on_ready(*ready, origin, context),
        GatewayEvent::Resumed => on_resume(origin, context),
        GatewayEvent::GuildCreate(guild) => on_guild_create(*guild, origin, context),
        GatewayEvent::GuildUpdate(guild) => on_guild_update(*guild, origin, context),
        GatewayEvent::GuildDelete(delete) => on_guild_delete(delete, origin, context),
        GatewayEvent::MemberChunk(chunk) => on_member_chunk(chunk, origin, context),
        GatewayEvent::MemberAdd(member) => on_member_add(*member, origin, context),
        GatewayEvent::MemberUpdate(member) => on_member_update(*member, origin, context),
        GatewayEvent::MemberRemove(remove) => on_member_remove(remove, origin, context),
        GatewayEvent::ChannelCreate(channel) => on_channel_create(*channel, origin, context),
        GatewayEvent::ChannelUpdate(channel) => on_channel_update(*channel, origin, context),
        GatewayEvent::ChannelDelete(channel) => on_channel_delete(*channel, origin, context),
        GatewayEvent::ThreadCreate(thread) => on_thread_create(*thread, origin, context),
        GatewayEvent::ThreadUpdate(thread) => on_thread_update(*thread, origin, context),
        GatewayEvent::ThreadDelete(delete) => on_thread_delete(delete, origin, context),
        GatewayEvent::ThreadMemberUpdate(member) => on_thread_member_update(*member, origin, context),
        GatewayEvent::ThreadMembersUpdate(update) => on_thread_members_update(update, origin, context),
        GatewayEvent::RoleCreate(create) => on_role_create(create, origin, context),
        GatewayEvent::RoleUpdate(update) => on_role_update(update, origin, context),
        GatewayEvent::RoleDelete(delete) => on_role_delete(delete, origin, context),
        GatewayEvent::EmojisUpdate(update) => on_emojis_update(update, origin, context),
        GatewayEvent::StickersUpdate(update) => on_stickers_update(update, origin, context),
        GatewayEvent::VoiceStateUpdate(state) => on_voice_state_update(*state, origin, context),
        GatewayEvent::PresenceUpdate(presence) => on_presence_update(*presence, origin, context),
        GatewayEvent::StageInstanceCreate(stage) => on_stage_instance_create(stage, origin, context),
        GatewayEvent::StageInstanceUpdate(stage) => on_stage_instance_update(stage, origin, context),
        GatewayEvent::StageInstanceDelete(stage) => on_stage_instance_delete(stage, origin, context),
        GatewayEvent::UserUpdate(user) => on_user_update(user, origin, context),
    }
}
