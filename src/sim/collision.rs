//! Collision detection and response
//!
//! Broad phase tests bounding boxes; narrow phase tests opacity masks. When
//! the broad phase finds anything, the narrow phase re-queries the whole
//! candidate group rather than only the broad-phase survivors, so contact
//! selection matches a full-group mask query.

use super::atlas::SpriteAtlas;
use super::entity::{Entity, EntityId, GroupTag, Registry};
use super::geometry::Rect;
use super::mask::Mask;

/// A collidable view of an entity: where it is drawn and with which mask
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    pub id: EntityId,
    pub rect: Rect,
    pub mask: &'a Mask,
}

impl<'a> Body<'a> {
    pub fn of(entity: &Entity, atlas: &'a SpriteAtlas) -> Self {
        Self {
            id: entity.id,
            rect: entity.rect(),
            mask: atlas.mask(entity.sprite.handle),
        }
    }

    pub fn touches(&self, other: &Body<'_>) -> bool {
        self.rect.overlaps(&other.rect)
            && self.mask.overlaps(&self.rect, other.mask, &other.rect)
    }
}

/// An authoritative contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub id: EntityId,
    pub rect: Rect,
}

/// Group members whose bounding boxes overlap `rect`, in id order
pub fn broad_phase(rect: &Rect, registry: &Registry, group: GroupTag) -> Vec<Contact> {
    registry
        .iter(group)
        .filter(|e| rect.overlaps(&e.rect()))
        .map(|e| Contact {
            id: e.id,
            rect: e.rect(),
        })
        .collect()
}

/// Group members whose masks touch `mover`, in id order
pub fn narrow_phase(
    mover: &Body<'_>,
    registry: &Registry,
    atlas: &SpriteAtlas,
    group: GroupTag,
) -> Vec<Contact> {
    registry
        .iter(group)
        .filter(|e| e.id != mover.id)
        .filter(|e| mover.touches(&Body::of(e, atlas)))
        .map(|e| Contact {
            id: e.id,
            rect: e.rect(),
        })
        .collect()
}

/// Two-phase query: empty when the broad phase finds nothing
pub fn mask_hits(
    mover: &Body<'_>,
    registry: &Registry,
    atlas: &SpriteAtlas,
    group: GroupTag,
) -> Vec<Contact> {
    if broad_phase(&mover.rect, registry, group).is_empty() {
        return Vec::new();
    }
    narrow_phase(mover, registry, atlas, group)
}

/// Among several contacts the one furthest right wins; ties keep the first
pub fn rightmost(contacts: &[Contact]) -> Option<Contact> {
    let mut best: Option<Contact> = None;
    for c in contacts {
        match best {
            Some(b) if c.rect.left() <= b.rect.left() => {}
            _ => best = Some(*c),
        }
    }
    best
}

/// Authoritative platform contact for `mover`, if any
pub fn resolve(
    mover: &Body<'_>,
    registry: &Registry,
    atlas: &SpriteAtlas,
    group: GroupTag,
) -> Option<Contact> {
    rightmost(&mask_hits(mover, registry, atlas, group))
}

/// Vertical response of a mover against a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceResponse {
    /// Rest on top: feet go to this y
    Land { feet_y: f32 },
    /// Hit the underside while rising: feet go to this y
    HeadBump { feet_y: f32 },
}

/// Mover state needed to respond to a surface
#[derive(Debug, Clone, Copy)]
pub struct Feet {
    /// Horizontal centre
    pub x: f32,
    /// Bottom edge, sub-pixel
    pub y: f32,
    pub width: i32,
    pub height: i32,
    pub vel_y: f32,
}

/// Platform response. Requires horizontal overlap with the platform span.
/// Feet above the platform's middle land on top (sunk by `landing_offset`);
/// feet below its bottom while rising bump the head.
pub fn platform_response(feet: &Feet, surface: &Rect, landing_offset: i32) -> Option<SurfaceResponse> {
    let half = feet.width as f32 / 2.0;
    if !(feet.x - half < surface.right() as f32 && feet.x + half > surface.left() as f32) {
        return None;
    }
    if feet.y < surface.center_y() as f32 {
        return Some(SurfaceResponse::Land {
            feet_y: (surface.top() + landing_offset) as f32,
        });
    }
    if feet.y > surface.bottom() as f32 && feet.vel_y < 0.0 {
        return Some(SurfaceResponse::HeadBump {
            feet_y: (surface.bottom() + feet.height) as f32,
        });
    }
    None
}

/// Ground response: feet below the top of a ground tile are lifted to rest on it
pub fn ground_response(feet_y: f32, ground: &Rect, landing_offset: i32) -> Option<SurfaceResponse> {
    (feet_y > ground.top() as f32).then(|| SurfaceResponse::Land {
        feet_y: (ground.top() + landing_offset) as f32,
    })
}
