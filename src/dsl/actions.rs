//! Actions, context and functions
//!
//! When an alternative matches, the parser calls the action named by that alternative
//! with the values of its symbols, in order. Actions are looked up by name at parse time:
//! user actions are closures registered on the grammar, builtin actions are always
//! available and are what the repetition helpers use.
//!
//! Actions see the parse through an [`ActionScope`]: the [`Context`] passed to the parse
//! call (read/write) and the registered [`Functions`] (call only).
//!
//! Returning an error from an action does not abort the parse. The alternative is
//! abandoned and the parser moves on to the next one, exactly as if a token had
//! mismatched.

use crate::dsl::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Default action: one value passes through, several become a list
pub const DEFAULT: &str = "";
/// Produces an empty list
pub const EMPTY: &str = "$empty";
/// Wraps the first value in a one-element list
pub const SINGLE: &str = "$single";
/// Pushes the remaining values onto the list given as first value
pub const APPEND: &str = "$append";
/// Produces `Null`
pub const NONE: &str = "$none";

/// An error raised by an action or a registered function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type ActionFn =
    Arc<dyn Fn(&[Value], &mut ActionScope<'_>) -> Result<Value, ActionError> + Send + Sync>;

pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, ActionError> + Send + Sync>;

/// Actions shipped with the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Default,
    Empty,
    Single,
    Append,
    None,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            DEFAULT => Some(Builtin::Default),
            EMPTY => Some(Builtin::Empty),
            SINGLE => Some(Builtin::Single),
            APPEND => Some(Builtin::Append),
            NONE => Some(Builtin::None),
            _ => None,
        }
    }

    pub fn apply(self, values: &[Value]) -> Result<Value, ActionError> {
        match self {
            Builtin::Default => Ok(match values {
                [single] => single.clone(),
                _ => Value::List(values.to_vec()),
            }),
            Builtin::Empty => Ok(Value::List(Vec::new())),
            Builtin::Single => Ok(Value::List(values.iter().take(1).cloned().collect())),
            Builtin::Append => {
                let (head, rest) = values
                    .split_first()
                    .ok_or_else(|| ActionError::new("$append needs at least one value"))?;
                let mut items = head.clone().into_list();
                items.extend(rest.iter().cloned());
                Ok(Value::List(items))
            }
            Builtin::None => Ok(Value::Null),
        }
    }
}

/// A registered action: builtin, or a user closure
#[derive(Clone)]
pub enum Action {
    Builtin(Builtin),
    User(ActionFn),
}

impl Action {
    pub fn invoke(
        &self,
        values: &[Value],
        scope: &mut ActionScope<'_>,
    ) -> Result<Value, ActionError> {
        match self {
            Action::Builtin(builtin) => builtin.apply(values),
            Action::User(f) => f(values, scope),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Builtin(builtin) => write!(f, "Builtin({:?})", builtin),
            Action::User(_) => write!(f, "User(..)"),
        }
    }
}

/// Named values visible to actions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl From<BTreeMap<String, Value>> for Context {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}

impl From<&Context> for BTreeMap<String, Value> {
    fn from(context: &Context) -> Self {
        context.values.clone()
    }
}

/// Named callables exposed to actions
#[derive(Clone, Default)]
pub struct Functions {
    functions: HashMap<String, NativeFn>,
}

impl Functions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&NativeFn> {
        self.functions.get(name)
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ActionError> {
        let f = self
            .get(name)
            .ok_or_else(|| ActionError::new(format!("unknown function '{}'", name)))?;
        f(args)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }
}

impl fmt::Debug for Functions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// What an action can reach while it runs
pub struct ActionScope<'a> {
    pub context: &'a mut Context,
    pub functions: &'a Functions,
}

impl<'a> ActionScope<'a> {
    pub fn new(context: &'a mut Context, functions: &'a Functions) -> Self {
        Self { context, functions }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.context.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.context.set(name, value);
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ActionError> {
        self.functions.call(name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_passes_single_value_through() {
        let single = Builtin::Default.apply(&[Value::Int(3)]).unwrap();
        assert_eq!(single, Value::Int(3));

        let many = Builtin::Default
            .apply(&[Value::Int(1), Value::from("+")])
            .unwrap();
        assert_eq!(many, Value::List(vec![Value::Int(1), Value::from("+")]));
    }

    #[test]
    fn test_append_extends_seed() {
        let seed = Value::List(vec![Value::from("a")]);
        let out = Builtin::Append.apply(&[seed, Value::from("b")]).unwrap();
        assert_eq!(out, Value::List(vec![Value::from("a"), Value::from("b")]));
        assert!(Builtin::Append.apply(&[]).is_err());
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(Builtin::from_name(""), Some(Builtin::Default));
        assert_eq!(Builtin::from_name("$append"), Some(Builtin::Append));
        assert_eq!(Builtin::from_name("sum"), None);
    }

    #[test]
    fn test_scope_reaches_context_and_functions() {
        let mut context = Context::new();
        context.set("x", Value::Int(2));
        let mut functions = Functions::new();
        functions.register("double", |args: &[Value]| {
            let n = args[0].as_int().ok_or_else(|| ActionError::new("not an int"))?;
            Ok(Value::Int(n * 2))
        });

        let mut scope = ActionScope::new(&mut context, &functions);
        let x = scope.get("x").cloned().unwrap();
        let doubled = scope.call("double", &[x]).unwrap();
        scope.set("y", doubled);

        assert_eq!(context.get("y"), Some(&Value::Int(4)));
        assert!(functions.call("missing", &[]).is_err());
    }
}
