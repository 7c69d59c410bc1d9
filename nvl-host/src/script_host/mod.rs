//! # ScriptHost 模块
//!
//! 持有嵌入的 Lua 环境，实现 [`ScriptEngine`]。
//!
//! ## 钩子契约
//!
//! 场景脚本在一个持久的 Lua 环境中执行，重复执行会覆盖之前的定义。
//! 钩子以投影表为唯一参数：
//!
//! ```lua
//! function modify_scene(scene)
//!     if scene.get_choice("met_alice") then
//!         return { text = scene.text .. "（她认出了你）" }
//!     end
//! end
//! ```
//!
//! 投影表字段：`id`/`text`/`background`/`person`/`music`，以及选项回调
//! `get_choice`/`add_choice`/`delete_choice`（用 `.` 调用）。
//!
//! `post_scene` 是一次性的：触发后全局绑定被清除，下一次执行场景脚本时
//! 才可能重新定义。

mod bridge;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::{Error as LuaError, Function, Lua, Result as LuaResult, Table, Value, Variadic};
use tracing::{debug, info, warn};

use nvl_runtime::{Choices, HookName, Projection, SceneMutation, ScriptEngine, ScriptError};

/// 选项回调共享的状态
///
/// `violation` 记录 delete_choice 的契约违规，即使脚本用 pcall 吞掉错误，
/// 钩子调用仍然失败。
struct HookContext {
    choices: RefCell<Choices>,
    violation: RefCell<Option<String>>,
}

/// Lua 脚本宿主
pub struct ScriptHost {
    lua: Lua,
    /// 脚本相对路径的解析根目录
    assets_root: PathBuf,
}

impl ScriptHost {
    /// 创建脚本宿主
    pub fn new(assets_root: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let lua = Lua::new();
        install_print(&lua).map_err(|e| ScriptError::LoadFailed {
            path: "<prelude>".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            lua,
            assets_root: assets_root.as_ref().to_path_buf(),
        })
    }

    /// 执行脚本源码
    pub fn load_source(&mut self, name: &str, source: &str) -> Result<(), ScriptError> {
        self.lua
            .load(source)
            .set_name(name)
            .exec()
            .map_err(|e| ScriptError::LoadFailed {
                path: name.to_string(),
                message: e.to_string(),
            })?;
        debug!(script = name, "场景脚本执行完成");
        Ok(())
    }

    /// 读取并执行脚本文件
    ///
    /// 文件不存在时只记录警告。
    pub fn load_script_file(&mut self, path: &Path) -> Result<(), ScriptError> {
        if !path.is_file() {
            warn!(path = %path.display(), "场景脚本不存在，已跳过");
            return Ok(());
        }

        let name = path.display().to_string();
        let source = fs::read_to_string(path).map_err(|e| ScriptError::LoadFailed {
            path: name.clone(),
            message: format!("无法读取脚本: {}", e),
        })?;
        self.load_source(&name, &source)
    }

    fn call_hook(
        &self,
        hook: HookName,
        function: Function,
        projection: &Projection,
        context: &Rc<HookContext>,
    ) -> Result<Option<SceneMutation>, ScriptError> {
        let failed = |e: LuaError| ScriptError::HookFailed {
            hook: hook.to_string(),
            message: e.to_string(),
        };

        let table = build_projection(&self.lua, projection, context).map_err(failed)?;
        let result = function.call::<_, Value>(table);

        if let Some(name) = context.violation.borrow_mut().take() {
            return Err(ScriptError::MissingChoice {
                hook: hook.to_string(),
                name,
            });
        }

        match result.map_err(failed)? {
            Value::Nil => Ok(None),
            Value::Table(table) => bridge::mutation_from_table(hook, &table).map(Some),
            other => {
                warn!(hook = %hook, kind = other.type_name(), "钩子返回值不是 table，已忽略");
                Ok(None)
            }
        }
    }
}

impl ScriptEngine for ScriptHost {
    fn load_script(&mut self, path: &str) -> Result<(), ScriptError> {
        let full_path = self.assets_root.join(path);
        self.load_script_file(&full_path)
    }

    fn invoke_hook(
        &mut self,
        hook: HookName,
        projection: &Projection,
        choices: &mut Choices,
    ) -> Result<Option<SceneMutation>, ScriptError> {
        let globals = self.lua.globals();
        let function = match globals.get::<_, Value>(hook.as_str()) {
            Ok(Value::Function(function)) => function,
            Ok(Value::Nil) => {
                debug!(hook = %hook, scene = projection.id, "钩子未定义，跳过");
                return Ok(None);
            }
            Ok(other) => {
                warn!(hook = %hook, kind = other.type_name(), "钩子不是函数，跳过");
                return Ok(None);
            }
            Err(e) => {
                return Err(ScriptError::HookFailed {
                    hook: hook.to_string(),
                    message: e.to_string(),
                });
            }
        };

        if hook.is_one_shot() {
            globals
                .set(hook.as_str(), Value::Nil)
                .map_err(|e| ScriptError::HookFailed {
                    hook: hook.to_string(),
                    message: e.to_string(),
                })?;
        }

        let context = Rc::new(HookContext {
            choices: RefCell::new(choices.clone()),
            violation: RefCell::new(None),
        });

        debug!(hook = %hook, scene = projection.id, "调用钩子");
        let mutation = self.call_hook(hook, function, projection, &context)?;
        *choices = context.choices.take();
        Ok(mutation)
    }
}

/// 构造传给钩子的投影表
fn build_projection<'lua>(
    lua: &'lua Lua,
    projection: &Projection,
    context: &Rc<HookContext>,
) -> LuaResult<Table<'lua>> {
    let table = lua.create_table()?;
    table.set("id", projection.id)?;
    table.set("text", projection.text.as_str())?;
    table.set("background", projection.background.as_str())?;
    table.set("person", projection.person.as_str())?;
    table.set("music", projection.music.as_str())?;

    let ctx = Rc::clone(context);
    table.set(
        "get_choice",
        lua.create_function(move |lua, name: String| match ctx.choices.borrow().get(&name) {
            Some(value) => bridge::choice_to_lua(lua, value),
            None => Ok(Value::Nil),
        })?,
    )?;

    let ctx = Rc::clone(context);
    table.set(
        "add_choice",
        lua.create_function(move |_, (name, value): (String, Value)| {
            let value = bridge::choice_from_lua(&value).map_err(|kind| {
                LuaError::RuntimeError(format!("add_choice: 选项 '{}' 的值类型不支持: {}", name, kind))
            })?;
            ctx.choices.borrow_mut().insert(name, value);
            Ok(())
        })?,
    )?;

    let ctx = Rc::clone(context);
    table.set(
        "delete_choice",
        lua.create_function(move |_, name: String| {
            if ctx.choices.borrow_mut().remove(&name).is_none() {
                let message = format!("delete_choice: 选项 '{}' 不存在", name);
                *ctx.violation.borrow_mut() = Some(name);
                return Err(LuaError::RuntimeError(message));
            }
            Ok(())
        })?,
    )?;

    Ok(table)
}

/// 把 Lua 的 print 重定向到日志（终端用于渲染）
fn install_print(lua: &Lua) -> LuaResult<()> {
    let print = lua.create_function(|_, args: Variadic<Value>| {
        let line = args.iter().map(bridge::describe).collect::<Vec<_>>().join("\t");
        info!(target: "script", "{}", line);
        Ok(())
    })?;
    lua.globals().set("print", print)
}
