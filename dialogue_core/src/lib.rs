//! # Dialogue Core
//!
//! Declarative conditions and value expressions for NPC dialogue and mission
//! content. Content authors name conditions and typed values as data; this
//! crate compiles them once into predicates and value accessors, then
//! evaluates them against a two-actor context bound to the `game_rules` world.
//!
//! ## Core Components
//!
//! - **vars**: Scoped variable references and the read/write entry points
//! - **talker**: One capability interface over creatures and items
//! - **dialogue**: Evaluation contexts and context cloning
//! - **values**: Literal, variable-backed and computed typed values
//! - **effect** / **channel**: Effects and reading their results back
//! - **condition**: The condition catalog and compiler
//! - **library**: Named conditions loaded from JSON or TOML documents
//!
//! ## Failure Policy
//!
//! - **Load time**: malformed content is rejected with a [`LoadError`]
//! - **Evaluation time**: never fails; defects are logged through `tracing`
//!   and degrade to `false` or a zero value

pub mod channel;
pub mod condition;
pub mod dialogue;
pub mod effect;
pub mod error;
pub mod json;
pub mod library;
pub mod rng;
pub mod talker;
pub mod values;
pub mod vars;

pub use condition::{
    read_condition, ComparisonOp, Condition, ConditionCompiler, COMBINATORS, COMPLEX_CONDITIONS,
    SIMPLE_CONDITIONS,
};
pub use dialogue::*;
pub use effect::{load_effect, Effect};
pub use error::*;
pub use library::*;
pub use rng::*;
pub use talker::*;
pub use values::*;
pub use vars::*;
