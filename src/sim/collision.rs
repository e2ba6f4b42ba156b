//! Collision detection and response for the player
//!
//! Solids are resolved first (static platforms, then moving ones), then riding,
//! then hazards and the goal. Death and win are only read after every solid has
//! been resolved, so a snap in this pass can never hide or fake a hazard hit.

use super::level::HorizontalContact;
use super::rect::{Rect, circle_hits_rect};
use super::state::{DeathCause, Level, MovingPlatform, Player};
use crate::consts::{EDGE_TOLERANCE, RIDE_BAND, RIDE_CARRY};

/// How a single solid was resolved against the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// No overlap
    None,
    /// Fell onto the top edge
    Landed,
    /// Rose into the underside
    Ceiling,
    /// Pushed out sideways
    Pushed,
    /// Overlapping sideways with nothing to resolve (no horizontal velocity)
    Touching,
    /// Side contact under the lethal wall policy
    Lethal,
}

/// Result of a full collision pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Landed on any solid this tick
    pub landed: bool,
    /// Bumped a ceiling this tick
    pub hit_ceiling: bool,
    /// Carried by a moving platform
    pub riding: bool,
    pub death: Option<DeathCause>,
    pub reached_goal: bool,
}

/// Resolve the player against one solid rectangle
///
/// Tie-break order: landing, ceiling, horizontal. Landing and ceiling accept
/// either the previous-position test (edge within tolerance one tick ago) or a
/// shallower vertical than horizontal penetration.
pub fn resolve_solid(player: &mut Player, solid: &Rect, policy: HorizontalContact) -> Contact {
    let body = player.rect();
    if !body.overlaps(solid) {
        return Contact::None;
    }

    let vy = player.vel.y;
    let side_depth = (body.right() - solid.left()).min(solid.right() - body.left());

    let prev_bottom = body.bottom() - vy;
    let landing_depth = body.bottom() - solid.top();
    if vy > 0.0 && (prev_bottom <= solid.top() + EDGE_TOLERANCE || landing_depth <= side_depth) {
        player.pos.y = solid.top() - player.size.y;
        player.vel.y = 0.0;
        player.is_jumping = false;
        return Contact::Landed;
    }

    let prev_top = body.top() - vy;
    let ceiling_depth = solid.bottom() - body.top();
    if vy < 0.0 && (prev_top >= solid.bottom() - EDGE_TOLERANCE || ceiling_depth <= side_depth) {
        player.pos.y = solid.bottom();
        player.vel.y = 0.0;
        return Contact::Ceiling;
    }

    if policy == HorizontalContact::Lethal {
        return Contact::Lethal;
    }

    if player.vel.x > 0.0 {
        player.pos.x = solid.left() - player.size.x;
        Contact::Pushed
    } else if player.vel.x < 0.0 {
        player.pos.x = solid.right();
        Contact::Pushed
    } else {
        Contact::Touching
    }
}

/// Carry the player if their feet are in the ride band of `platform`
pub fn ride_platform(player: &mut Player, platform: &MovingPlatform) -> bool {
    let body = player.rect();
    let top = platform.rect.top();
    let feet_in_band = body.bottom() >= top && body.bottom() <= top + RIDE_BAND;
    if !feet_in_band || !body.overlaps_x(&platform.rect) || player.vel.y < 0.0 {
        return false;
    }

    player.pos.y = top - player.size.y;
    player.vel.y = 0.0;
    player.is_jumping = false;
    player.pos.x += platform.displacement() * RIDE_CARRY;
    true
}

/// First hazard touching `body`, if any
///
/// Any hit means death, so the order hazards are listed in never changes the outcome.
pub fn hazard_contact(body: &Rect, level: &Level) -> Option<DeathCause> {
    if level.spikes.iter().any(|spike| body.overlaps(&spike.rect)) {
        return Some(DeathCause::Spike);
    }
    if level
        .saws
        .iter()
        .any(|saw| circle_hits_rect(saw.center, saw.radius, body))
    {
        return Some(DeathCause::SawBlade);
    }
    None
}

/// Fold one solid contact into the report; true on landing
fn record(contact: Contact, report: &mut CollisionReport) -> bool {
    match contact {
        Contact::Landed => {
            report.landed = true;
            return true;
        }
        Contact::Ceiling => report.hit_ceiling = true,
        Contact::Lethal => {
            if report.death.is_none() {
                report.death = Some(DeathCause::Wall);
            }
        }
        Contact::Pushed | Contact::Touching | Contact::None => {}
    }
    false
}

/// Run the full collision pass for one tick
pub fn resolve_collisions(
    player: &mut Player,
    level: &Level,
    policy: HorizontalContact,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    let mut on_ground = false;

    for platform in &level.platforms {
        let contact = resolve_solid(player, &platform.rect, policy);
        on_ground |= record(contact, &mut report);
    }
    for platform in &level.moving_platforms {
        let contact = resolve_solid(player, &platform.rect, policy);
        if contact == Contact::Landed {
            // Standing on it counts as riding
            player.pos.x += platform.displacement() * RIDE_CARRY;
            report.riding = true;
        }
        on_ground |= record(contact, &mut report);
    }

    if !on_ground {
        for platform in &level.moving_platforms {
            if ride_platform(player, platform) {
                on_ground = true;
                report.riding = true;
            }
        }
    }
    player.on_ground = on_ground;

    let body = player.rect();
    if report.death.is_none() {
        report.death = hazard_contact(&body, level);
    }
    report.reached_goal = body.overlaps(&level.goal.rect);

    report
}
