//! Stand-in host implementations.
//!
//! Used by the test suite and by the CLI's standalone mode, where
//! scripts run without a real game server behind the bridge. The stub
//! command dispatcher records executed commands; the stub entity host
//! serves a fixed roster.

use crate::host::{
    CommandHost, EntityHost, HostBridge, HostContext, HostError, ParsedCommand, ScriptEntity,
    ScriptItemStack,
};
use hearthscript_dynamic::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Recording host context.
pub struct StubContext {
    name: String,
    feedback: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl StubContext {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            feedback: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        })
    }

    pub fn feedback_log(&self) -> Vec<String> {
        self.feedback.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl HostContext for StubContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn feedback(&self, message: &str) {
        tracing::debug!(actor = %self.name, message, "feedback");
        if let Ok(mut log) = self.feedback.lock() {
            log.push(message.to_string());
        }
    }

    fn error(&self, message: &str) {
        tracing::warn!(actor = %self.name, message, "script error");
        if let Ok(mut log) = self.errors.lock() {
            log.push(message.to_string());
        }
    }
}

/// Parsed form of a stub command: `head key=value ...`. Integer-looking
/// argument values parse as integers, everything else stays a string.
pub struct StubParsedCommand {
    text: String,
    args: BTreeMap<String, Value>,
}

impl StubParsedCommand {
    fn parse(text: &str) -> Result<Self, HostError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(HostError::Syntax("empty command".to_string()));
        }
        if trimmed.starts_with('!') {
            return Err(HostError::Syntax(format!("unknown token `{trimmed}`")));
        }
        let mut args = BTreeMap::new();
        for token in trimmed.split_whitespace().skip(1) {
            if let Some((key, raw)) = token.split_once('=') {
                let value = raw
                    .parse::<i64>()
                    .map(Value::I64)
                    .unwrap_or_else(|_| Value::from(raw));
                args.insert(key.to_string(), value);
            }
        }
        Ok(Self {
            text: trimmed.to_string(),
            args,
        })
    }
}

impl ParsedCommand for StubParsedCommand {
    fn command(&self) -> &str {
        &self.text
    }

    fn argument(&self, name: &str) -> Result<Value, HostError> {
        self.args
            .get(name)
            .cloned()
            .ok_or_else(|| HostError::UnknownArgument(name.to_string()))
    }

    fn set_argument(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        if !self.args.contains_key(name) {
            return Err(HostError::UnknownArgument(name.to_string()));
        }
        self.args.insert(name.to_string(), value);
        Ok(())
    }
}

/// Command dispatcher that records every executed command.
pub struct StubCommandHost {
    executed: Mutex<Vec<String>>,
    result_code: i64,
}

impl StubCommandHost {
    pub fn new() -> Arc<Self> {
        Self::with_result(1)
    }

    pub fn with_result(result_code: i64) -> Arc<Self> {
        Arc::new(Self {
            executed: Mutex::new(Vec::new()),
            result_code,
        })
    }

    /// Executed command texts, in execution order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl CommandHost for StubCommandHost {
    fn parse(
        &self,
        command: &str,
        _source: &dyn HostContext,
    ) -> Result<Box<dyn ParsedCommand>, HostError> {
        Ok(Box::new(StubParsedCommand::parse(command)?))
    }

    fn execute(
        &self,
        parsed: &dyn ParsedCommand,
        _source: &dyn HostContext,
    ) -> Result<i64, HostError> {
        self.executed
            .lock()
            .map_err(|_| HostError::Other("execution log poisoned".to_string()))?
            .push(parsed.command().to_string());
        Ok(self.result_code)
    }
}

pub struct StubItemStack {
    id: String,
    count: i64,
}

impl ScriptItemStack for StubItemStack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn count(&self) -> i64 {
        self.count
    }
}

/// Fixed-state entity with mutable health.
pub struct StubEntity {
    name: String,
    health: Mutex<f64>,
    position: [f64; 3],
    mainhand: Option<Arc<dyn ScriptItemStack>>,
    offhand: Option<Arc<dyn ScriptItemStack>>,
}

impl StubEntity {
    pub fn new(name: &str, health: f64) -> Self {
        Self {
            name: name.to_string(),
            health: Mutex::new(health),
            position: [0.0; 3],
            mainhand: None,
            offhand: None,
        }
    }

    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_mainhand(mut self, id: &str, count: i64) -> Self {
        self.mainhand = Some(Arc::new(StubItemStack {
            id: id.to_string(),
            count,
        }));
        self
    }

    pub fn with_offhand(mut self, id: &str, count: i64) -> Self {
        self.offhand = Some(Arc::new(StubItemStack {
            id: id.to_string(),
            count,
        }));
        self
    }

    pub fn current_health(&self) -> f64 {
        self.health.lock().map(|h| *h).unwrap_or_default()
    }
}

impl ScriptEntity for StubEntity {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn health(&self) -> f64 {
        self.current_health()
    }

    fn set_health(&self, health: f64) {
        if let Ok(mut slot) = self.health.lock() {
            *slot = health;
        }
    }

    fn position(&self) -> [f64; 3] {
        self.position
    }

    fn mainhand(&self) -> Option<Arc<dyn ScriptItemStack>> {
        self.mainhand.clone()
    }

    fn offhand(&self) -> Option<Arc<dyn ScriptItemStack>> {
        self.offhand.clone()
    }
}

/// Entity host over a fixed roster. Selector `@e` matches everything,
/// any other non-empty selector matches by name; the empty selector is
/// rejected.
pub struct StubEntityHost {
    entities: Vec<Arc<dyn ScriptEntity>>,
}

impl StubEntityHost {
    pub fn new(entities: Vec<Arc<dyn ScriptEntity>>) -> Arc<Self> {
        Arc::new(Self { entities })
    }
}

impl EntityHost for StubEntityHost {
    fn find(
        &self,
        selector: &str,
        _source: &dyn HostContext,
    ) -> Result<Vec<Arc<dyn ScriptEntity>>, HostError> {
        if selector.is_empty() {
            return Err(HostError::Selector(selector.to_string()));
        }
        if selector == "@e" {
            return Ok(self.entities.clone());
        }
        Ok(self
            .entities
            .iter()
            .filter(|entity| entity.name() == selector)
            .cloned()
            .collect())
    }
}

/// Bridge over stubs with an empty entity roster.
pub fn stub_bridge() -> (HostBridge, Arc<StubCommandHost>, Arc<StubEntityHost>) {
    stub_bridge_with_entities(Vec::new())
}

/// Bridge over stubs with the given entity roster.
pub fn stub_bridge_with_entities(
    entities: Vec<Arc<StubEntity>>,
) -> (HostBridge, Arc<StubCommandHost>, Arc<StubEntityHost>) {
    let commands = StubCommandHost::new();
    let roster: Vec<Arc<dyn ScriptEntity>> = entities
        .into_iter()
        .map(|entity| entity as Arc<dyn ScriptEntity>)
        .collect();
    let entity_host = StubEntityHost::new(roster);
    let bridge = HostBridge {
        commands: Arc::clone(&commands) as Arc<dyn CommandHost>,
        entities: Arc::clone(&entity_host) as Arc<dyn EntityHost>,
    };
    (bridge, commands, entity_host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_typed_arguments() {
        let parsed = StubParsedCommand::parse("give item=sword count=3").unwrap();
        assert_eq!(parsed.command(), "give item=sword count=3");
        assert_eq!(parsed.argument("item").unwrap(), Value::from("sword"));
        assert_eq!(parsed.argument("count").unwrap(), Value::I64(3));
        assert!(matches!(
            parsed.argument("missing"),
            Err(HostError::UnknownArgument(_))
        ));
    }

    #[test]
    fn set_argument_requires_existing_name() {
        let mut parsed = StubParsedCommand::parse("give item=sword").unwrap();
        parsed
            .set_argument("item", Value::from("shield"))
            .unwrap();
        assert_eq!(parsed.argument("item").unwrap(), Value::from("shield"));
        assert!(parsed.set_argument("nope", Value::Null).is_err());
    }

    #[test]
    fn malformed_commands_are_syntax_errors() {
        assert!(matches!(
            StubParsedCommand::parse(""),
            Err(HostError::Syntax(_))
        ));
        assert!(matches!(
            StubParsedCommand::parse("!weird"),
            Err(HostError::Syntax(_))
        ));
    }

    #[test]
    fn selector_matching() {
        let host = StubEntityHost::new(vec![
            Arc::new(StubEntity::new("zombie", 20.0)) as Arc<dyn ScriptEntity>,
            Arc::new(StubEntity::new("zombie", 18.0)) as Arc<dyn ScriptEntity>,
            Arc::new(StubEntity::new("spider", 16.0)) as Arc<dyn ScriptEntity>,
        ]);
        let ctx = StubContext::new("t");
        assert_eq!(host.find("@e", ctx.as_ref()).unwrap().len(), 3);
        assert_eq!(host.find("zombie", ctx.as_ref()).unwrap().len(), 2);
        assert_eq!(host.find("ghast", ctx.as_ref()).unwrap().len(), 0);
        assert!(host.find("", ctx.as_ref()).is_err());
    }
}
