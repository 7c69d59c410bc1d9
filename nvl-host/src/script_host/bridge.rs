//! Lua 值与 Runtime 类型之间的转换。

use mlua::{Lua, Result as LuaResult, Table, Value};

use nvl_runtime::{ChoiceValue, Choices, HookName, SceneMutation, ScriptError};

/// 选项值 → Lua 值
pub fn choice_to_lua<'lua>(lua: &'lua Lua, value: &ChoiceValue) -> LuaResult<Value<'lua>> {
    Ok(match value {
        ChoiceValue::Bool(v) => Value::Boolean(*v),
        ChoiceValue::Int(v) => Value::Integer(*v),
        ChoiceValue::Float(v) => Value::Number(*v),
        ChoiceValue::String(v) => Value::String(lua.create_string(v)?),
    })
}

/// Lua 值 → 选项值
///
/// 只接受标量；失败时返回实际的 Lua 类型名。
pub fn choice_from_lua(value: &Value) -> Result<ChoiceValue, String> {
    match value {
        Value::Boolean(v) => Ok(ChoiceValue::Bool(*v)),
        Value::Integer(v) => Ok(ChoiceValue::Int(*v)),
        Value::Number(v) => Ok(ChoiceValue::Float(*v)),
        Value::String(s) => s
            .to_str()
            .map(|s| ChoiceValue::String(s.to_string()))
            .map_err(|_| "非 UTF-8 字符串".to_string()),
        other => Err(other.type_name().to_string()),
    }
}

/// 解析钩子返回的 mutation table
///
/// 缺失的字段为 `None`，未知字段忽略。字段类型不对时返回
/// [`ScriptError::InvalidMutation`]。
pub fn mutation_from_table(hook: HookName, table: &Table) -> Result<SceneMutation, ScriptError> {
    Ok(SceneMutation {
        text: string_field(hook, table, "text")?,
        person: string_field(hook, table, "person")?,
        background: string_field(hook, table, "background")?,
        choices: choices_field(hook, table)?,
        show_tab: bool_field(hook, table, "show_tab")?,
        await_input: bool_field(hook, table, "await_input")?,
    })
}

fn raw_field<'lua>(
    hook: HookName,
    table: &Table<'lua>,
    field: &str,
) -> Result<Value<'lua>, ScriptError> {
    table
        .get::<_, Value>(field)
        .map_err(|e| invalid(hook, field, e.to_string()))
}

fn string_field(hook: HookName, table: &Table, field: &str) -> Result<Option<String>, ScriptError> {
    match raw_field(hook, table, field)? {
        Value::Nil => Ok(None),
        Value::String(s) => s
            .to_str()
            .map(|s| Some(s.to_string()))
            .map_err(|_| invalid(hook, field, "非 UTF-8 字符串")),
        other => Err(invalid(
            hook,
            field,
            format!("期望 string，实际为 {}", other.type_name()),
        )),
    }
}

fn bool_field(hook: HookName, table: &Table, field: &str) -> Result<Option<bool>, ScriptError> {
    match raw_field(hook, table, field)? {
        Value::Nil => Ok(None),
        Value::Boolean(v) => Ok(Some(v)),
        other => Err(invalid(
            hook,
            field,
            format!("期望 boolean，实际为 {}", other.type_name()),
        )),
    }
}

fn choices_field(hook: HookName, table: &Table) -> Result<Option<Choices>, ScriptError> {
    let entries = match raw_field(hook, table, "choices")? {
        Value::Nil => return Ok(None),
        Value::Table(entries) => entries,
        other => {
            return Err(invalid(
                hook,
                "choices",
                format!("期望 table，实际为 {}", other.type_name()),
            ));
        }
    };

    let mut choices = Choices::new();
    for pair in entries.pairs::<Value, Value>() {
        let (key, value) = pair.map_err(|e| invalid(hook, "choices", e.to_string()))?;
        let name = match &key {
            Value::String(s) => s
                .to_str()
                .map_err(|_| invalid(hook, "choices", "选项名不是 UTF-8 字符串"))?
                .to_string(),
            other => {
                return Err(invalid(
                    hook,
                    "choices",
                    format!("选项名必须为 string，实际为 {}", other.type_name()),
                ));
            }
        };
        let value = choice_from_lua(&value).map_err(|kind| {
            invalid(hook, "choices", format!("选项 '{}' 的值类型不支持: {}", name, kind))
        })?;
        choices.insert(name, value);
    }
    Ok(Some(choices))
}

fn invalid(hook: HookName, field: &str, message: impl Into<String>) -> ScriptError {
    ScriptError::InvalidMutation {
        hook: hook.to_string(),
        field: field.to_string(),
        message: message.into(),
    }
}

/// 用于 print 重定向的值描述
pub fn describe(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(v) => v.to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(s) => s.to_string_lossy().into_owned(),
        other => other.type_name().to_string(),
    }
}
