//! Collaborator traits at the host-engine boundary.
//!
//! The game engine itself (world, entities, command dispatcher) is an
//! external collaborator; scripts only ever see it through these traits.
//! Host object identity and lifetime stay with the host — scripts hold
//! capability sets or handles, never raw references.

use hearthscript_dynamic::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The command dispatcher rejected the input. Propagates into the
    /// calling script as a runtime error, never a silent zero.
    #[error("command syntax: {0}")]
    Syntax(String),
    #[error("unknown argument `{0}`")]
    UnknownArgument(String),
    #[error("bad selector `{0}`")]
    Selector(String),
    #[error("{0}")]
    Other(String),
}

/// Ambient privilege and feedback channel for one invocation — the
/// actor on whose behalf a script runs.
pub trait HostContext: Send + Sync {
    fn name(&self) -> &str;

    /// Informational feedback to the invoking actor.
    fn feedback(&self, message: &str);

    /// Error report to the invoking actor.
    fn error(&self, message: &str);
}

/// A precompiled command: the host-specific result of parsing a
/// command string, with named arguments readable and overwritable as
/// base values.
pub trait ParsedCommand: Send {
    fn command(&self) -> &str;

    fn argument(&self, name: &str) -> Result<Value, HostError>;

    fn set_argument(&mut self, name: &str, value: Value) -> Result<(), HostError>;
}

/// The host's command dispatcher.
pub trait CommandHost: Send + Sync {
    fn parse(
        &self,
        command: &str,
        source: &dyn HostContext,
    ) -> Result<Box<dyn ParsedCommand>, HostError>;

    /// Execute a previously parsed command, returning its result code.
    fn execute(
        &self,
        parsed: &dyn ParsedCommand,
        source: &dyn HostContext,
    ) -> Result<i64, HostError>;
}

/// An item stack held by an entity.
pub trait ScriptItemStack: Send + Sync {
    fn id(&self) -> String;
    fn count(&self) -> i64;
}

/// One live entity, exposed to scripts as a capability set.
pub trait ScriptEntity: Send + Sync {
    fn name(&self) -> String;
    fn health(&self) -> f64;
    fn set_health(&self, health: f64);
    fn position(&self) -> [f64; 3];
    fn mainhand(&self) -> Option<Arc<dyn ScriptItemStack>>;
    fn offhand(&self) -> Option<Arc<dyn ScriptItemStack>>;
}

/// The host's entity lookup surface.
pub trait EntityHost: Send + Sync {
    /// Resolve a selector to a group of entities.
    fn find(
        &self,
        selector: &str,
        source: &dyn HostContext,
    ) -> Result<Vec<Arc<dyn ScriptEntity>>, HostError>;
}

/// Bundle of host collaborators handed to each script unit.
#[derive(Clone)]
pub struct HostBridge {
    pub commands: Arc<dyn CommandHost>,
    pub entities: Arc<dyn EntityHost>,
}
