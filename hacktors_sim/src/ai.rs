// Stock creature AI: one controller shared by every non-player mobile.
//
// Behavior depends only on the creature's type (what it hunts, fears and
// eats, whether it uses tools, whether it is mindless) and its current
// state. Each turn the controller surveys the square of side
// `2 * perception + 1` around the creature on its own level, reading only
// chunks that already exist, and then takes the first applicable action:
//
// 1. Flee when scared (attacked recently and at or below a third of max
//    life, a fifth when armed; mindless creatures never flee). Try the
//    direction away from the nearest enemy, then its normals, then
//    backtracking. Cornered creatures eat whatever they carry.
// 2. Attack an adjacent enemy (the last attacker or a feared type) or prey.
// 3. Eat when hungry (below three quarters of max life) and carrying food.
// 4. Pick up wanted items lying underfoot.
// 5. Walk toward the nearest wanted item or prey, or keep going straight.
//    A blocked creature sidesteps to a normal, and failing that turns to a
//    random direction for the next turn.
//
// "Wanted" items are the type's food; tool users want everything.
//
// See also: `controller.rs` for the trait, `catalog.rs` for the per-type
// tables the behavior reads.
//
// **Critical constraint: determinism.** The survey is in tile order and the
// only randomness is the world's PRNG.

use crate::catalog::MobileType;
use crate::controller::Controller;
use crate::error::WorldResult;
use crate::item::Item;
use crate::types::{Direction, MobileId, Position};
use crate::world::World;

/// Fraction of max life at or below which an attacked creature flees.
pub const SCARED_LIFE: f32 = 0.333;
/// Same, for a creature carrying a weapon it can use.
pub const SCARED_LIFE_ARMED: f32 = 0.20;
/// Fraction of max life below which a creature eats.
pub const HUNGRY_LIFE: f32 = 0.75;
/// Anything closer than this is in melee reach (orthogonal neighbors only).
const REACH: f32 = 1.05;

#[derive(Debug, Default)]
pub struct CreatureController {
    mobile: Option<MobileId>,
}

impl CreatureController {
    pub fn mobile(&self) -> Option<MobileId> {
        self.mobile
    }
}

/// What a creature sees around itself this turn.
#[derive(Debug, Default)]
struct Survey {
    enemies: Vec<Position>,
    prey: Vec<Position>,
    /// Tiles other than its own holding items it wants.
    wanted: Vec<(i32, i32)>,
    wanted_underfoot: bool,
}

fn wants(kind: MobileType, item: &Item) -> bool {
    kind.is_tool_user() || kind.food().contains(&item.kind)
}

fn survey(world: &World, id: MobileId, pos: Position, attacker: Option<MobileId>) -> Survey {
    let mut seen = Survey::default();
    let Some(me) = world.mobile(id) else {
        return seen;
    };
    let kind = me.kind;
    let reach = kind.perception();
    for y in pos.y - reach..=pos.y + reach {
        for x in pos.x - reach..=pos.x + reach {
            let Some(chunk) = world.chunk(x, y, pos.z) else {
                continue;
            };
            let here = x == pos.x && y == pos.y;
            if let Some(other) = chunk.mobile(x, y).ok().flatten().filter(|m| *m != id)
                && let Some(other) = world.mobile(other)
            {
                if Some(other.id) == attacker || kind.fears().contains(&other.kind) {
                    seen.enemies.push(other.position());
                } else if kind.hunts().contains(&other.kind) {
                    seen.prey.push(other.position());
                }
            }
            let items = chunk.items(x, y).unwrap_or(&[]);
            if items.iter().any(|item| wants(kind, item)) {
                if here {
                    seen.wanted_underfoot = true;
                } else {
                    seen.wanted.push((x, y));
                }
            }
        }
    }
    seen
}

fn nearest<'a>(pos: Position, targets: impl IntoIterator<Item = &'a Position>) -> Option<&'a Position> {
    targets
        .into_iter()
        .min_by(|a, b| pos.distance(a).total_cmp(&pos.distance(b)))
}

/// A tile the creature could step onto, judged without creating chunks.
/// Unvisited chunks count as open; the move itself has the final say.
fn looks_free(world: &World, at: Position) -> bool {
    if !World::in_bounds(at.x, at.y, at.z) {
        return false;
    }
    let solid = world.block_at(at.x, at.y, at.z).is_some_and(|b| b.is_solid());
    !solid && world.mobile_at(at.x, at.y, at.z).is_none()
}

/// Step in `direction`, sidestepping to one of its normals when blocked.
fn try_move(world: &mut World, id: MobileId, direction: Direction) -> WorldResult<bool> {
    let Some(pos) = world.mobile(id).map(|m| m.position()) else {
        return Ok(false);
    };
    let [left, right] = direction.normals();
    for candidate in [direction, left, right] {
        if looks_free(world, pos.step(candidate)) {
            world.turn(id, candidate)?;
            return world.move_forward(id);
        }
    }
    Ok(false)
}

fn eat_all(world: &mut World, id: MobileId) -> WorldResult<()> {
    while world.eat(id)? {}
    Ok(())
}

impl Controller for CreatureController {
    fn bind(&mut self, mobile: MobileId) {
        self.mobile = Some(mobile);
    }

    fn act(&mut self, world: &mut World, id: MobileId) -> WorldResult<()> {
        let Some(me) = world.mobile(id) else {
            return Ok(());
        };
        if !me.is_placed() || !me.is_alive() {
            return Ok(());
        }
        let kind = me.kind;
        let pos = me.position();
        let life = me.life();
        let max = kind.max_life();
        let has_food = kind.food().iter().any(|food| me.has_item(*food));
        let limit = if me.has_weapon() {
            SCARED_LIFE_ARMED
        } else {
            SCARED_LIFE
        };
        let attacker = world.last_attacker(id)?;
        let scared = !kind.is_mindless() && attacker.is_some() && life <= (max as f32 * limit) as i32;
        let hungry = life < (max as f32 * HUNGRY_LIFE) as i32;
        let seen = survey(world, id, pos, attacker);

        if scared && let Some(threat) = nearest(pos, &seen.enemies) {
            let away = pos.away_from(threat);
            if try_move(world, id, away)? || try_move(world, id, away.opposite())? {
                return Ok(());
            }
            if has_food {
                return eat_all(world, id);
            }
        }

        for target in seen.enemies.iter().chain(&seen.prey) {
            if pos.distance(target) < REACH {
                world.turn(id, pos.towards(target))?;
                if world.attack(id)? {
                    return Ok(());
                }
            }
        }

        if hungry && has_food {
            return eat_all(world, id);
        }

        if seen.wanted_underfoot && world.pick_up(id)? {
            return Ok(());
        }

        let goal = seen
            .wanted
            .iter()
            .map(|&(x, y)| Position::new(x, y, pos.z))
            .chain(seen.prey.iter().copied())
            .min_by(|a, b| pos.distance(a).total_cmp(&pos.distance(b)));
        let direction = goal.map_or(pos.direction, |g| pos.towards(&g));
        if !try_move(world, id, direction)? {
            let random = Direction::random(world.rng_mut());
            world.turn(id, random)?;
        }
        Ok(())
    }
}
