/// Scripting core for the dunk course
///
/// Entities optionally own a [`Script`]: typed variables, a handler table keyed
/// by event name, and level-wide subroutines. Handlers are pure functions of
/// the script's variables that describe a [`Reaction`]; the [`Dispatcher`]
/// routes addressed events between entities and executes those reactions on a
/// single-threaded run loop with delayed continuations.
pub mod dispatcher;
pub mod entity;
pub mod reaction;
pub mod script;
pub mod timer;
pub mod variable;

// Re-export commonly used types
pub use dispatcher::{DispatchError, Dispatcher};
pub use entity::{Entity, EntityKind};
pub use reaction::{Effect, Reaction};
pub use script::{Handler, Script, ScriptError, Subroutine};
pub use timer::{ScheduledTask, TimerId, TimerManager};
pub use variable::{VarType, VarValue, Variable, VariableError, Variables};
