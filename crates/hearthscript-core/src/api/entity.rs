//! The `entity` namespace: selector lookup producing grouped-entity
//! handles, and per-entity capability sets.
//!
//! Groups can be large, so they live behind opaque handles in the
//! script's cache; `entity.get` exposes one member as a capability
//! table built fresh for that call. Indices are 1-based on the script
//! side, matching Lua convention.

use crate::api::ScriptApi;
use crate::handle::HexId;
use crate::host::{ScriptEntity, ScriptItemStack};
use crate::provider::{ApiError, ApiValue, FunctionSet, ScriptObjectProvider, arg};
use crate::script::ScriptShared;
use hearthscript_dynamic::{ToDynamic, Value};
use std::sync::Arc;

pub struct EntityApi {
    shared: Arc<ScriptShared>,
}

impl EntityApi {
    pub fn new(shared: Arc<ScriptShared>) -> Self {
        Self { shared }
    }
}

impl ScriptApi for EntityApi {
    fn namespace(&self) -> &str {
        "entity"
    }

    fn functions(&self) -> FunctionSet {
        let mut f = FunctionSet::new();

        let shared = Arc::clone(&self.shared);
        f.insert("find", move |args| {
            let selector = arg(args, 0)?.as_str()?;
            let source = shared.source()?;
            let group = shared.host.entities.find(selector, source.as_ref())?;
            let id = shared.with_entity_groups(|cache| Ok(cache.insert(group)))?;
            Ok(ApiValue::from(id))
        });

        let shared = Arc::clone(&self.shared);
        f.insert("count", move |args| {
            let id: HexId = arg(args, 0)?.as_str()?.parse()?;
            let count = shared.with_entity_groups(|cache| Ok(cache.get(id)?.len()))?;
            Ok(ApiValue::from(count as i64))
        });

        let shared = Arc::clone(&self.shared);
        f.insert("get", move |args| {
            let id: HexId = arg(args, 0)?.as_str()?.parse()?;
            let index = arg(args, 1)?.as_long()?;
            let entity = shared.with_entity_groups(|cache| {
                let group = cache.get(id)?;
                usize::try_from(index.saturating_sub(1))
                    .ok()
                    .and_then(|i| group.get(i))
                    .cloned()
                    .ok_or_else(|| {
                        ApiError::Message(format!(
                            "entity index {index} out of range (group has {})",
                            group.len()
                        ))
                    })
            })?;
            Ok(ApiValue::Object(Box::new(EntityObject::new(entity))))
        });

        let shared = Arc::clone(&self.shared);
        f.insert("free", move |args| {
            let id: HexId = arg(args, 0)?.as_str()?.parse()?;
            shared.with_entity_groups(|cache| {
                cache.remove(id);
                Ok(())
            })?;
            Ok(ApiValue::null())
        });

        f
    }
}

/// Capability set for one live entity. Built fresh per exposure.
pub struct EntityObject {
    entity: Arc<dyn ScriptEntity>,
}

impl EntityObject {
    pub fn new(entity: Arc<dyn ScriptEntity>) -> Self {
        Self { entity }
    }
}

impl ScriptObjectProvider for EntityObject {
    fn add_functions(&self, set: &mut FunctionSet) {
        let entity = Arc::clone(&self.entity);
        set.insert("get_name", move |_| {
            Ok(ApiValue::Value(Value::String(entity.name())))
        });

        let entity = Arc::clone(&self.entity);
        set.insert("get_health", move |_| {
            Ok(ApiValue::Value(Value::float(entity.health())))
        });

        let entity = Arc::clone(&self.entity);
        set.insert("set_health", move |args| {
            entity.set_health(arg(args, 0)?.as_double()?);
            Ok(ApiValue::null())
        });

        let entity = Arc::clone(&self.entity);
        set.insert("get_pos", move |_| {
            Ok(ApiValue::Value(entity.position().to_dynamic()))
        });

        let entity = Arc::clone(&self.entity);
        set.insert("get_mainhand", move |_| Ok(stack_value(entity.mainhand())));

        let entity = Arc::clone(&self.entity);
        set.insert("get_offhand", move |_| Ok(stack_value(entity.offhand())));
    }
}

fn stack_value(stack: Option<Arc<dyn ScriptItemStack>>) -> ApiValue {
    match stack {
        Some(stack) => ApiValue::Object(Box::new(ItemStackObject::new(stack))),
        None => ApiValue::null(),
    }
}

/// Capability set for one item stack.
pub struct ItemStackObject {
    stack: Arc<dyn ScriptItemStack>,
}

impl ItemStackObject {
    pub fn new(stack: Arc<dyn ScriptItemStack>) -> Self {
        Self { stack }
    }
}

impl ScriptObjectProvider for ItemStackObject {
    fn add_functions(&self, set: &mut FunctionSet) {
        let stack = Arc::clone(&self.stack);
        set.insert("get_id", move |_| {
            Ok(ApiValue::Value(Value::String(stack.id())))
        });

        let stack = Arc::clone(&self.stack);
        set.insert("get_count", move |_| Ok(ApiValue::from(stack.count())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::SandboxRegistry;
    use crate::script::Script;
    use crate::stub::{StubContext, StubEntity, stub_bridge_with_entities};

    fn run(body: &str, entities: Vec<Arc<StubEntity>>) -> (Arc<StubContext>, Vec<String>) {
        let (bridge, commands, _) = stub_bridge_with_entities(entities);
        let registry = SandboxRegistry::builtin();
        let script = Script::load("entity-test", body, bridge, registry.get("permissive").unwrap())
            .unwrap();
        let ctx = StubContext::new("tester");
        script.execute(ctx.clone(), None);
        (ctx, commands.executed())
    }

    #[test]
    fn find_count_get_free_lifecycle() {
        let zombie = Arc::new(StubEntity::new("zombie", 20.0).with_mainhand("sword", 1));
        let spider = Arc::new(StubEntity::new("spider", 16.0));
        let (ctx, executed) = run(
            r#"
                local h = entity.find("@e")
                command.execute("count " .. entity.count(h))
                local first = entity.get(h, 1)
                command.execute("first " .. first.get_name())
                entity.free(h)
                entity.free(h) -- double free is fine
            "#,
            vec![zombie, spider],
        );
        assert!(ctx.errors().is_empty(), "errors: {:?}", ctx.errors());
        assert_eq!(executed, vec!["count 2", "first zombie"]);
    }

    #[test]
    fn capability_set_reads_and_mutates_host_state() {
        let zombie = Arc::new(StubEntity::new("zombie", 20.0).with_mainhand("sword", 3));
        let observer = Arc::clone(&zombie);
        let (ctx, executed) = run(
            r#"
                local h = entity.find("zombie")
                local z = entity.get(h, 1)
                z.set_health(z.get_health() / 2)
                local hand = z.get_mainhand()
                command.execute("holds " .. hand.get_id() .. " x" .. hand.get_count())
                local pos = z.get_pos()
                command.execute("at " .. pos[1] .. "," .. pos[2] .. "," .. pos[3])
            "#,
            vec![zombie],
        );
        assert!(ctx.errors().is_empty(), "errors: {:?}", ctx.errors());
        assert_eq!(executed, vec!["holds sword x3", "at 0.0,0.0,0.0"]);
        assert_eq!(observer.current_health(), 10.0);
    }

    #[test]
    fn missing_mainhand_is_nil_in_lua() {
        let bare = Arc::new(StubEntity::new("bare", 10.0));
        let (ctx, executed) = run(
            r#"
                local h = entity.find("bare")
                local e = entity.get(h, 1)
                if e.get_mainhand() == nil then command.execute("empty handed") end
            "#,
            vec![bare],
        );
        assert!(ctx.errors().is_empty());
        assert_eq!(executed, vec!["empty handed"]);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let (ctx, _) = run(
            r#"
                local h = entity.find("@e")
                entity.get(h, 99)
            "#,
            vec![Arc::new(StubEntity::new("only", 1.0))],
        );
        assert_eq!(ctx.errors().len(), 1);
        assert!(ctx.errors()[0].contains("out of range"), "{:?}", ctx.errors());
    }

    #[test]
    fn bad_selector_is_reported() {
        let (ctx, _) = run(r#"entity.find("")"#, vec![]);
        assert_eq!(ctx.errors().len(), 1);
        assert!(ctx.errors()[0].contains("selector"), "{:?}", ctx.errors());
    }

    #[test]
    fn freed_group_is_stale() {
        let (ctx, _) = run(
            r#"
                local h = entity.find("@e")
                entity.free(h)
                entity.count(h)
            "#,
            vec![Arc::new(StubEntity::new("only", 1.0))],
        );
        assert_eq!(ctx.errors().len(), 1);
        assert!(ctx.errors()[0].contains("not found"));
    }
}
