use std::collections::BTreeMap;

/// Type tag of a script variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Bool,
    Int,
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarType::Bool => write!(f, "bool"),
            VarType::Int => write!(f, "int"),
        }
    }
}

/// Current value of a script variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
}

impl VarValue {
    pub fn var_type(&self) -> VarType {
        match self {
            VarValue::Bool(_) => VarType::Bool,
            VarValue::Int(_) => VarType::Int,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VarValue::Bool(value) => Some(*value),
            VarValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            VarValue::Int(value) => Some(*value),
            VarValue::Bool(_) => None,
        }
    }
}

impl std::fmt::Display for VarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarValue::Bool(value) => write!(f, "{}", value),
            VarValue::Int(value) => write!(f, "{}", value),
        }
    }
}

/// A named, typed variable declared on a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    initial: VarValue,
    current: VarValue,
}

impl Variable {
    pub fn new(name: impl Into<String>, initial: VarValue) -> Self {
        Self {
            name: name.into(),
            initial,
            current: initial,
        }
    }

    pub fn bool(name: impl Into<String>, initial: bool) -> Self {
        Self::new(name, VarValue::Bool(initial))
    }

    pub fn int(name: impl Into<String>, initial: i64) -> Self {
        Self::new(name, VarValue::Int(initial))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn var_type(&self) -> VarType {
        self.initial.var_type()
    }

    pub fn initial(&self) -> VarValue {
        self.initial
    }

    pub fn value(&self) -> VarValue {
        self.current
    }
}

/// Failure to apply a mutation to a variable table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariableError {
    #[error("unknown variable '{0}'")]
    Unknown(String),
    #[error("variable '{name}' is {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: VarType,
        found: VarType,
    },
}

/// A script's variable table, ordered by name
#[derive(Debug, Clone, Default)]
pub struct Variables {
    vars: BTreeMap<String, Variable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable. Returns false if the name is already taken.
    pub fn declare(&mut self, variable: Variable) -> bool {
        if self.vars.contains_key(variable.name()) {
            return false;
        }
        self.vars.insert(variable.name().to_string(), variable);
        true
    }

    pub fn get(&self, name: &str) -> Option<VarValue> {
        self.vars.get(name).map(Variable::value)
    }

    /// Read a bool variable; unknown or non-bool variables read as false
    pub fn bool(&self, name: &str) -> bool {
        self.get(name).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    /// Read an int variable; unknown or non-int variables read as 0
    pub fn int(&self, name: &str) -> i64 {
        self.get(name).and_then(|v| v.as_int()).unwrap_or(0)
    }

    /// Overwrite a variable, returning the previous value
    pub fn set(&mut self, name: &str, value: VarValue) -> Result<VarValue, VariableError> {
        let var = self
            .vars
            .get_mut(name)
            .ok_or_else(|| VariableError::Unknown(name.to_string()))?;

        if var.var_type() != value.var_type() {
            return Err(VariableError::TypeMismatch {
                name: name.to_string(),
                expected: var.var_type(),
                found: value.var_type(),
            });
        }

        Ok(std::mem::replace(&mut var.current, value))
    }

    /// Add `delta` to an int variable, returning the previous value
    pub fn add(&mut self, name: &str, delta: i64) -> Result<VarValue, VariableError> {
        let current = self
            .get(name)
            .ok_or_else(|| VariableError::Unknown(name.to_string()))?;

        match current {
            VarValue::Int(value) => self.set(name, VarValue::Int(value.saturating_add(delta))),
            VarValue::Bool(_) => Err(VariableError::TypeMismatch {
                name: name.to_string(),
                expected: VarType::Int,
                found: VarType::Bool,
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_rejects_duplicates() {
        let mut vars = Variables::new();
        assert!(vars.declare(Variable::bool("was_above_ring", false)));
        assert!(!vars.declare(Variable::int("was_above_ring", 3)));
        assert_eq!(vars.get("was_above_ring"), Some(VarValue::Bool(false)));
    }

    #[test]
    fn test_set_checks_type() {
        let mut vars = Variables::new();
        vars.declare(Variable::bool("flag", false));

        assert_eq!(vars.set("flag", VarValue::Bool(true)), Ok(VarValue::Bool(false)));
        assert!(vars.bool("flag"));

        let err = vars.set("flag", VarValue::Int(1)).unwrap_err();
        assert_eq!(
            err,
            VariableError::TypeMismatch {
                name: "flag".to_string(),
                expected: VarType::Bool,
                found: VarType::Int,
            }
        );
        assert!(vars.bool("flag"));
    }

    #[test]
    fn test_add_decrements_int() {
        let mut vars = Variables::new();
        vars.declare(Variable::int("health", 10));

        vars.add("health", -1).unwrap();
        vars.add("health", -1).unwrap();
        assert_eq!(vars.int("health"), 8);
    }

    #[test]
    fn test_add_on_unknown_variable_fails() {
        let mut vars = Variables::new();
        assert_eq!(
            vars.add("missing", 1),
            Err(VariableError::Unknown("missing".to_string()))
        );
    }

    #[test]
    fn test_initial_value_is_kept() {
        let mut vars = Variables::new();
        vars.declare(Variable::int("health", 10));
        vars.add("health", -4).unwrap();

        let var = vars.iter().next().unwrap();
        assert_eq!(var.initial(), VarValue::Int(10));
        assert_eq!(var.value(), VarValue::Int(6));
    }
}
