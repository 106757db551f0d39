//! Entity model
//!
//! Every sprite in the world is an [`Entity`]: shared kinematic and drawing
//! state plus a variant payload. Entities live in a [`Registry`] keyed by
//! id; group tags give typed views (all platforms, all enemies, ...) and an
//! entity can sit in several groups at once.

use std::collections::{BTreeMap, BTreeSet};

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::atlas::{FrameHandle, SpriteSet};
use super::geometry::{Anchor, Rect};

/// Stable entity identifier, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Group membership tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupTag {
    All,
    Platforms,
    Bases,
    Enemies,
    Viruses,
    PowerUps,
    Bullets,
    Clouds,
    Backgrounds,
}

impl GroupTag {
    #[inline]
    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Small set of group tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupSet(u16);

impl GroupSet {
    pub fn of(tags: &[GroupTag]) -> Self {
        let mut set = Self(GroupTag::All.bit());
        for tag in tags {
            set.0 |= tag.bit();
        }
        set
    }

    pub fn contains(&self, tag: GroupTag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = GroupTag> + '_ {
        [
            GroupTag::All,
            GroupTag::Platforms,
            GroupTag::Bases,
            GroupTag::Enemies,
            GroupTag::Viruses,
            GroupTag::PowerUps,
            GroupTag::Bullets,
            GroupTag::Clouds,
            GroupTag::Backgrounds,
        ]
        .into_iter()
        .filter(|tag| self.contains(*tag))
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    Vaccine,
    Ammo,
    Health,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Vaccine, PowerUpKind::Ammo, PowerUpKind::Health];
}

/// Player animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerAnim {
    #[default]
    Idle,
    Running,
    Jumping,
    Shooting,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub acc: Vec2,
    /// Airborne from a jump; cleared on landing or head bump
    pub jumping: bool,
    pub anim: PlayerAnim,
    pub lives: u32,
    pub ammo: u32,
    pub shooting: bool,
    /// Logical time the current shooting animation started
    pub shot_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatState {
    /// Vertical acceleration; flips sign at the oscillation limit
    pub dy: f32,
    /// Virus already released
    pub spawned: bool,
    pub boss: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirusState {
    /// Horizontal acceleration; flips sign at the sway limit
    pub dx: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpState {
    pub kind: PowerUpKind,
    /// Platform this power-up rides; non-owning
    pub platform: EntityId,
}

/// Variant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Player(PlayerState),
    Platform,
    Base,
    Slime,
    Bat(BatState),
    Projectile,
    Virus(VirusState),
    PowerUp(PowerUpState),
    Cloud,
    Background,
}

/// Current animation frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprite {
    pub set: SpriteSet,
    pub frame: usize,
    pub handle: FrameHandle,
    pub last_update_ms: u64,
    pub flip_x: bool,
}

impl Sprite {
    pub fn new(set: SpriteSet, frame: usize, handle: FrameHandle) -> Self {
        Self {
            set,
            frame,
            handle,
            last_update_ms: 0,
            flip_x: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Authoritative sub-pixel position; meaning set by `anchor`
    pub pos: Vec2,
    pub vel: Vec2,
    pub anchor: Anchor,
    /// Drawn size in pixels (frame size times scale)
    pub size: IVec2,
    pub scale: f32,
    pub layer: i32,
    pub alive: bool,
    pub sprite: Sprite,
    pub groups: GroupSet,
}

impl Entity {
    /// Bounding box derived from position, size and anchor
    #[inline]
    pub fn rect(&self) -> Rect {
        self.anchor.rect(self.pos, self.size)
    }

    /// Move so the rect's top-left corner lands on (left, top)
    pub fn set_top_left(&mut self, left: i32, top: i32) {
        self.pos = self.anchor.position_for(left, top, self.size);
    }

    pub fn player(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Platform this entity rides, if it is a power-up
    pub fn rides(&self) -> Option<EntityId> {
        match &self.kind {
            EntityKind::PowerUp(p) => Some(p.platform),
            _ => None,
        }
    }
}

/// Central store of live entities and their group memberships
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: BTreeMap<EntityId, Entity>,
    groups: BTreeMap<GroupTag, BTreeSet<EntityId>>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            groups: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Store an entity under a fresh id and index its groups
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        entity.id = id;
        entity.alive = true;
        for tag in entity.groups.iter() {
            self.groups.entry(tag).or_default().insert(id);
        }
        self.entities.insert(id, entity);
        id
    }

    /// Live entity by id
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id).filter(|e| e.alive)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id).filter(|e| e.alive)
    }

    #[inline]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Mark an entity dead and drop it from every group. Anything riding it
    /// dies with it. Returns false if it was already dead.
    pub fn kill(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get_mut(&id).filter(|e| e.alive) else {
            return false;
        };
        entity.alive = false;
        let groups = entity.groups;
        for tag in groups.iter() {
            if let Some(members) = self.groups.get_mut(&tag) {
                members.remove(&id);
            }
        }

        let riders: Vec<EntityId> = self
            .iter(GroupTag::PowerUps)
            .filter(|e| e.rides() == Some(id))
            .map(|e| e.id)
            .collect();
        for rider in riders {
            self.kill(rider);
        }
        true
    }

    /// Discard dead entities
    pub fn sweep(&mut self) {
        self.entities.retain(|_, e| e.alive);
    }

    /// Snapshot of a group's ids in ascending order
    pub fn ids(&self, tag: GroupTag) -> Vec<EntityId> {
        self.groups
            .get(&tag)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Live members of a group in ascending id order
    pub fn iter(&self, tag: GroupTag) -> impl Iterator<Item = &Entity> + '_ {
        self.groups
            .get(&tag)
            .into_iter()
            .flat_map(|members| members.iter())
            .filter_map(|id| self.get(*id))
    }

    pub fn count(&self, tag: GroupTag) -> usize {
        self.groups.get(&tag).map_or(0, BTreeSet::len)
    }

    /// Every stored entity including not-yet-swept dead ones
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
