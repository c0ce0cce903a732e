//! Evaluation contexts: two optional actor slots bound to a world.
//!
//! A context binds a primary actor ("u", the alpha slot) and a secondary
//! actor ("npc", the beta slot). Which actors a context binds never changes;
//! to evaluate content written for one context shape inside another, clone
//! the context into the new shape with [`clone_context`].

use std::rc::Rc;

use crate::rng::{RandomSource, ThreadRandom};
use crate::talker::{talker_for, ActorHandle, SharedWorld, Talker};

/// Anything conditions and values can be evaluated against.
pub trait TalkContext {
    /// The primary (`is_beta == false`) or secondary actor, if bound.
    fn actor(&self, is_beta: bool) -> Option<&dyn Talker>;

    fn world(&self) -> &SharedWorld;

    fn rng(&self) -> &Rc<dyn RandomSource>;

    fn has_alpha(&self) -> bool {
        self.actor(false).is_some()
    }

    fn has_beta(&self) -> bool {
        self.actor(true).is_some()
    }

    /// Whether the conversation happens over the radio.
    fn by_radio(&self) -> bool {
        false
    }

    /// Why the NPC started the conversation, empty if they didn't.
    fn reason(&self) -> &str {
        ""
    }
}

/// Everything a context shape is built from.
pub struct ActorBinding {
    pub world: SharedWorld,
    pub rng: Rc<dyn RandomSource>,
    pub alpha: Option<Box<dyn Talker>>,
    pub beta: Option<Box<dyn Talker>>,
    pub by_radio: bool,
    pub reason: String,
}

impl ActorBinding {
    /// Bind the given handles using the thread RNG.
    pub fn new(world: SharedWorld, alpha: Option<ActorHandle>, beta: Option<ActorHandle>) -> Self {
        let alpha = alpha.map(|handle| talker_for(&world, handle));
        let beta = beta.map(|handle| talker_for(&world, handle));
        Self {
            world,
            rng: Rc::new(ThreadRandom),
            alpha,
            beta,
            by_radio: false,
            reason: String::new(),
        }
    }
}

/// Context shapes that can be built from resolved actors.
pub trait FromActors: Sized {
    fn from_actors(binding: ActorBinding) -> Self;
}

/// A live conversation.
pub struct Dialogue {
    world: SharedWorld,
    rng: Rc<dyn RandomSource>,
    alpha: Option<Box<dyn Talker>>,
    beta: Option<Box<dyn Talker>>,
    by_radio: bool,
    reason: String,
}

impl Dialogue {
    /// A dialogue between two actors using the thread RNG.
    pub fn new(world: SharedWorld, alpha: Option<ActorHandle>, beta: Option<ActorHandle>) -> Self {
        Self::from_actors(ActorBinding::new(world, alpha, beta))
    }

    pub fn with_rng(mut self, rng: Rc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_radio(mut self, by_radio: bool) -> Self {
        self.by_radio = by_radio;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

impl FromActors for Dialogue {
    fn from_actors(binding: ActorBinding) -> Self {
        Self {
            world: binding.world,
            rng: binding.rng,
            alpha: binding.alpha,
            beta: binding.beta,
            by_radio: binding.by_radio,
            reason: binding.reason,
        }
    }
}

impl TalkContext for Dialogue {
    fn actor(&self, is_beta: bool) -> Option<&dyn Talker> {
        if is_beta {
            self.beta.as_deref()
        } else {
            self.alpha.as_deref()
        }
    }

    fn world(&self) -> &SharedWorld {
        &self.world
    }

    fn rng(&self) -> &Rc<dyn RandomSource> {
        &self.rng
    }

    fn by_radio(&self) -> bool {
        self.by_radio
    }

    fn reason(&self) -> &str {
        &self.reason
    }
}

/// Context for checking whether a mission goal has been met.
pub struct MissionGoalContext {
    world: SharedWorld,
    rng: Rc<dyn RandomSource>,
    alpha: Option<Box<dyn Talker>>,
    beta: Option<Box<dyn Talker>>,
}

impl MissionGoalContext {
    /// `alpha` is the player working the mission, `beta` the mission giver.
    pub fn new(world: SharedWorld, alpha: Option<ActorHandle>, beta: Option<ActorHandle>) -> Self {
        Self::from_actors(ActorBinding::new(world, alpha, beta))
    }
}

impl FromActors for MissionGoalContext {
    fn from_actors(binding: ActorBinding) -> Self {
        Self {
            world: binding.world,
            rng: binding.rng,
            alpha: binding.alpha,
            beta: binding.beta,
        }
    }
}

impl TalkContext for MissionGoalContext {
    fn actor(&self, is_beta: bool) -> Option<&dyn Talker> {
        if is_beta {
            self.beta.as_deref()
        } else {
            self.alpha.as_deref()
        }
    }

    fn world(&self) -> &SharedWorld {
        &self.world
    }

    fn rng(&self) -> &Rc<dyn RandomSource> {
        &self.rng
    }
}

/// Re-derive a context of shape `D` from the actors bound in `source`.
///
/// Each present slot is resolved to its underlying creature or item and
/// rebound through a fresh talker; absent slots stay absent. The world, RNG,
/// radio flag and reason carry over.
pub fn clone_context<S, D>(source: &S) -> D
where
    S: TalkContext + ?Sized,
    D: FromActors,
{
    let world = source.world().clone();
    let rebind = |is_beta: bool| {
        source
            .actor(is_beta)
            .map(|talker| talker_for(&world, talker.handle()))
    };
    let alpha = rebind(false);
    let beta = rebind(true);
    D::from_actors(ActorBinding {
        world: world.clone(),
        rng: source.rng().clone(),
        alpha,
        beta,
        by_radio: source.by_radio(),
        reason: source.reason().to_string(),
    })
}

/// Clone any context into a live [`Dialogue`].
pub fn copy_dialogue<S: TalkContext + ?Sized>(source: &S) -> Dialogue {
    clone_context(source)
}
