//! The `command` namespace: the host command dispatcher exposed through
//! the base-value bridge.
//!
//! `parse` precompiles a command behind a freshly minted handle;
//! `execute_preparsed` re-runs it; `get_preparsed_argument` /
//! `modify_preparsed_argument` read and overwrite already-parsed
//! arguments; `free_preparsed` releases the handle (idempotent).
//! Dispatcher rejections propagate into the script as runtime errors,
//! never a silent zero.

use crate::api::ScriptApi;
use crate::handle::HexId;
use crate::provider::{ApiValue, FunctionSet, arg};
use crate::script::ScriptShared;
use std::sync::Arc;

pub struct CommandApi {
    shared: Arc<ScriptShared>,
}

impl CommandApi {
    pub fn new(shared: Arc<ScriptShared>) -> Self {
        Self { shared }
    }
}

impl ScriptApi for CommandApi {
    fn namespace(&self) -> &str {
        "command"
    }

    fn functions(&self) -> FunctionSet {
        let mut f = FunctionSet::new();

        let shared = Arc::clone(&self.shared);
        f.insert("execute", move |args| {
            let command = arg(args, 0)?.as_str()?;
            let source = shared.source()?;
            let parsed = shared.host.commands.parse(command, source.as_ref())?;
            let code = shared.host.commands.execute(parsed.as_ref(), source.as_ref())?;
            Ok(ApiValue::from(code))
        });

        let shared = Arc::clone(&self.shared);
        f.insert("parse", move |args| {
            let command = arg(args, 0)?.as_str()?;
            let source = shared.source()?;
            let parsed = shared.host.commands.parse(command, source.as_ref())?;
            let id = shared.with_preparsed(|cache| Ok(cache.insert(parsed)))?;
            Ok(ApiValue::from(id))
        });

        let shared = Arc::clone(&self.shared);
        f.insert("get_preparsed_argument", move |args| {
            let id: HexId = arg(args, 0)?.as_str()?.parse()?;
            let name = arg(args, 1)?.as_str()?.to_string();
            let value =
                shared.with_preparsed(|cache| Ok(cache.get(id)?.argument(&name)?))?;
            Ok(ApiValue::from(value))
        });

        let shared = Arc::clone(&self.shared);
        f.insert("modify_preparsed_argument", move |args| {
            let id: HexId = arg(args, 0)?.as_str()?.parse()?;
            let name = arg(args, 1)?.as_str()?.to_string();
            let value = arg(args, 2)?.clone();
            shared.with_preparsed(|cache| {
                cache.get_mut(id)?.set_argument(&name, value)?;
                Ok(())
            })?;
            Ok(ApiValue::null())
        });

        let shared = Arc::clone(&self.shared);
        f.insert("execute_preparsed", move |args| {
            let id: HexId = arg(args, 0)?.as_str()?.parse()?;
            let source = shared.source()?;
            let code = shared.with_preparsed(|cache| {
                let parsed = cache.get(id)?;
                Ok(shared.host.commands.execute(parsed.as_ref(), source.as_ref())?)
            })?;
            Ok(ApiValue::from(code))
        });

        let shared = Arc::clone(&self.shared);
        f.insert("free_preparsed", move |args| {
            let id: HexId = arg(args, 0)?.as_str()?.parse()?;
            shared.with_preparsed(|cache| {
                cache.remove(id);
                Ok(())
            })?;
            Ok(ApiValue::null())
        });

        f
    }
}
