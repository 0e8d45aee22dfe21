use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use twilight_model::guild::Permissions;

use gearcache::cache::{CachePolicy, Gate, GroupedStore, ReadinessTracker, Role, SelfUser};
use gearcache_lib::util::markers::{GuildId, RoleId};

const WRITERS: u64 = 8;
const PER_WRITER: u64 = 250;
const READERS: usize = 4;

fn role(guild_id: GuildId, id: u64) -> Role {
    Role {
        guild_id,
        id: RoleId::new(id),
        name: format!("role {}", id),
        color: 0,
        hoisted: false,
        icon: None,
        emoji: None,
        position: id as i64,
        permissions: Permissions::empty(),
        managed: false,
        mentionable: false,
    }
}

#[test]
fn concurrent_writers_and_readers_on_one_guild() {
    let store = Arc::new(GroupedStore::new(Gate::new(true, CachePolicy::<Role>::all(), SelfUser::default())));
    let guild_id = GuildId::new(1);
    let done = Arc::new(AtomicBool::new(false));

    let readers = (0..READERS)
        .map(|_| {
            let store = store.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut last_seen = 0;
                loop {
                    let finished = done.load(Ordering::SeqCst);
                    let roles = store.group_all(&guild_id);
                    // writers only ever add, so a later read can't see less
                    assert!(roles.len() >= last_seen);
                    last_seen = roles.len();

                    let mut ids = HashSet::new();
                    for role in &roles {
                        let role = role.read();
                        assert_eq!(role.guild_id, guild_id);
                        assert_eq!(role.name, format!("role {}", role.id));
                        assert!(ids.insert(role.id));
                    }
                    if finished {
                        break;
                    }
                }
                last_seen
            })
        })
        .collect::<Vec<_>>();

    let writers = (0..WRITERS)
        .map(|writer| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..PER_WRITER {
                    store.put(role(guild_id, 1 + writer * PER_WRITER + i));
                }
            })
        })
        .collect::<Vec<_>>();

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    for reader in readers {
        assert_eq!(reader.join().unwrap(), (WRITERS * PER_WRITER) as usize);
    }

    assert_eq!(store.group_len(&guild_id), (WRITERS * PER_WRITER) as usize);
    assert_eq!(store.group_count(), 1);
}

#[test]
fn writers_on_different_guilds_do_not_interfere() {
    let store = Arc::new(GroupedStore::new(Gate::new(true, CachePolicy::all(), SelfUser::default())));

    let handles = (1..=WRITERS)
        .map(|guild| {
            let store = store.clone();
            thread::spawn(move || {
                let guild_id = GuildId::new(guild);
                for id in 1..=PER_WRITER {
                    store.put(role(guild_id, id));
                }
                // and take half of it away again
                store.remove_in_group_where(&guild_id, |role| role.id.get() % 2 == 0);
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    for guild in 1..=WRITERS {
        assert_eq!(store.group_len(&GuildId::new(guild)), (PER_WRITER / 2) as usize);
    }
}

#[test]
fn puts_racing_a_group_removal_are_never_lost() {
    let store = Arc::new(GroupedStore::new(Gate::new(true, CachePolicy::all(), SelfUser::default())));
    let guild_id = GuildId::new(1);
    let done = Arc::new(AtomicBool::new(false));
    let total = WRITERS * PER_WRITER;

    let remover = {
        let store = store.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut removed = 0;
            while !done.load(Ordering::SeqCst) {
                removed += store.remove_group(&guild_id).len();
            }
            removed
        })
    };

    let writers = (0..WRITERS)
        .map(|writer| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..PER_WRITER {
                    store.put(role(guild_id, 1 + writer * PER_WRITER + i));
                }
            })
        })
        .collect::<Vec<_>>();
    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    let removed = remover.join().unwrap();

    // every role either got swept up by a removal or is still there
    assert_eq!(removed + store.group_len(&guild_id), total as usize);
}

#[test]
fn shards_track_readiness_independently() {
    let tracker = Arc::new(ReadinessTracker::new());

    let handles = (0..4u64)
        .map(|shard| {
            let tracker = tracker.clone();
            thread::spawn(move || {
                for guild in 1..=100 {
                    tracker.mark_unready(shard, GuildId::new(shard * 1000 + guild));
                }
                for guild in 1..=100 {
                    assert!(tracker.mark_ready(shard, GuildId::new(shard * 1000 + guild)));
                    tracker.is_unavailable(GuildId::new(guild));
                }
                tracker.is_shard_ready(shard)
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
