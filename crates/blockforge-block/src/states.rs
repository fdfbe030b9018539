//! Block state values and their canonical bracketed string form.
//!
//! The canonical form is what `setblock`/`fill` accept on Bedrock and what the
//! structure cache hashes, e.g. `["facing_direction"=1,"open_bit"=false]`.
//! Keys are emitted in sorted order so two equal state sets always produce
//! the same string.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::StatesParseError;

const NAMESPACE: &str = "minecraft:";

/// Canonicalize a block name: trim, lower-case, and add the `minecraft:`
/// namespace when none is given.
pub fn canonical_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if lower.contains(':') {
        lower
    } else {
        format!("{NAMESPACE}{lower}")
    }
}

/// Block name without the `minecraft:` namespace.
pub fn short_name(name: &str) -> &str {
    name.strip_prefix(NAMESPACE).unwrap_or(name)
}

/// A single block state value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateValue {
    Bool(bool),
    Int(i32),
    Str(String),
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{b}"),
            StateValue::Int(i) => write!(f, "{i}"),
            StateValue::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Str(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Str(value)
    }
}

/// Sorted set of block state properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BlockStates(BTreeMap<String, StateValue>);

impl BlockStates {
    /// The empty state set, usable in `static` position.
    pub const EMPTY: BlockStates = BlockStates(BTreeMap::new());

    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<StateValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<StateValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.0.get(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.0.get(key) {
            Some(StateValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical bracketed form. Empty states render as `[]`.
    pub fn to_states_string(&self) -> String {
        self.to_string()
    }

    /// Parse the bracketed form.
    ///
    /// Accepts quoted or bare keys, `=` or `:` separators, and bare values
    /// (`true`/`false`, integers, otherwise treated as strings). An empty
    /// input is the empty state set.
    pub fn parse(input: &str) -> Result<Self, StatesParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or(StatesParseError::MissingBrackets)?;

        let mut states = Self::new();
        for entry in split_entries(inner)? {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, rest) = split_key(entry)?;
            if key.is_empty() {
                return Err(StatesParseError::EmptyKey);
            }
            let value = parse_value(rest.trim())?;
            states.0.insert(key.to_string(), value);
        }
        Ok(states)
    }
}

impl fmt::Display for BlockStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "\"{key}\"={value}")?;
        }
        f.write_str("]")
    }
}

impl<K: Into<String>, V: Into<StateValue>> FromIterator<(K, V)> for BlockStates {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Split on commas that are not inside a quoted string.
fn split_entries(inner: &str) -> Result<Vec<&str>, StatesParseError> {
    let mut entries = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                entries.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(StatesParseError::UnterminatedString);
    }
    entries.push(&inner[start..]);
    Ok(entries)
}

/// Split `key=value` into the key and the raw value text. Quoted keys may
/// themselves contain `:` (`"minecraft:cardinal_direction"`).
fn split_key(entry: &str) -> Result<(&str, &str), StatesParseError> {
    let missing = || StatesParseError::MissingSeparator(entry.to_string());
    if let Some(rest) = entry.strip_prefix('"') {
        let close = rest.find('"').ok_or(StatesParseError::UnterminatedString)?;
        let after = rest[close + 1..].trim_start();
        let value = after
            .strip_prefix(['=', ':'])
            .ok_or_else(missing)?;
        return Ok((&rest[..close], value));
    }
    let sep = entry.find(['=', ':']).ok_or_else(missing)?;
    Ok((entry[..sep].trim(), &entry[sep + 1..]))
}

fn unquote(s: &str) -> Result<&str, StatesParseError> {
    match s.strip_prefix('"') {
        Some(rest) => rest
            .strip_suffix('"')
            .ok_or(StatesParseError::UnterminatedString),
        None => Ok(s),
    }
}

fn parse_value(raw: &str) -> Result<StateValue, StatesParseError> {
    if raw.is_empty() {
        return Err(StatesParseError::EmptyValue);
    }
    if raw.starts_with('"') {
        return Ok(StateValue::Str(unquote(raw)?.to_string()));
    }
    match raw {
        "true" => Ok(StateValue::Bool(true)),
        "false" => Ok(StateValue::Bool(false)),
        _ => Ok(raw
            .parse::<i32>()
            .map(StateValue::Int)
            .unwrap_or_else(|_| StateValue::Str(raw.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_normalizes() {
        assert_eq!(canonical_name("chest"), "minecraft:chest");
        assert_eq!(canonical_name("minecraft:Chest"), "minecraft:chest");
        assert_eq!(canonical_name("  Minecraft:LOOM "), "minecraft:loom");
        assert_eq!(canonical_name("custom:thing"), "custom:thing");
    }

    #[test]
    fn short_name_strips_namespace() {
        assert_eq!(short_name("minecraft:anvil"), "anvil");
        assert_eq!(short_name("anvil"), "anvil");
    }

    #[test]
    fn empty_states_render_as_brackets() {
        assert_eq!(BlockStates::new().to_states_string(), "[]");
    }

    #[test]
    fn states_are_sorted() {
        let states = BlockStates::new()
            .with("open_bit", false)
            .with("facing_direction", 3)
            .with("color", "red");
        assert_eq!(
            states.to_states_string(),
            r#"["color"="red","facing_direction"=3,"open_bit"=false]"#
        );
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = BlockStates::new().with("a", 1).with("b", true);
        let b = BlockStates::new().with("b", true).with("a", 1);
        assert_eq!(a, b);
        assert_eq!(a.to_states_string(), b.to_states_string());
    }

    #[test]
    fn parse_canonical_form() {
        let s = r#"["damage"="slightly_damaged","direction"=2]"#;
        let states = BlockStates::parse(s).unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states.get_int("direction"), Some(2));
        assert_eq!(
            states.get("damage"),
            Some(&StateValue::Str("slightly_damaged".into()))
        );
        assert_eq!(states.to_states_string(), s);
    }

    #[test]
    fn parse_lenient_forms() {
        let states = BlockStates::parse("[facing_direction:1, open_bit=true, kind=oak]").unwrap();
        assert_eq!(states.get_int("facing_direction"), Some(1));
        assert_eq!(states.get("open_bit"), Some(&StateValue::Bool(true)));
        assert_eq!(states.get("kind"), Some(&StateValue::Str("oak".into())));
    }

    #[test]
    fn parse_empty_inputs() {
        assert!(BlockStates::parse("").unwrap().is_empty());
        assert!(BlockStates::parse("[]").unwrap().is_empty());
        assert!(BlockStates::parse(" [ ] ").unwrap().is_empty());
    }

    #[test]
    fn parse_namespaced_key() {
        let states = BlockStates::parse(r#"["minecraft:cardinal_direction"="north"]"#).unwrap();
        assert_eq!(
            states.get("minecraft:cardinal_direction"),
            Some(&StateValue::Str("north".into()))
        );
    }

    #[test]
    fn parse_quoted_comma() {
        let states = BlockStates::parse(r#"["label"="a,b"]"#).unwrap();
        assert_eq!(states.get("label"), Some(&StateValue::Str("a,b".into())));
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            BlockStates::parse("facing=1"),
            Err(StatesParseError::MissingBrackets)
        ));
        assert!(matches!(
            BlockStates::parse("[facing]"),
            Err(StatesParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            BlockStates::parse(r#"["a"="open]"#),
            Err(StatesParseError::UnterminatedString)
        ));
        assert!(matches!(
            BlockStates::parse("[=1]"),
            Err(StatesParseError::EmptyKey)
        ));
        assert!(matches!(
            BlockStates::parse("[a=]"),
            Err(StatesParseError::EmptyValue)
        ));
    }

    #[test]
    fn collect_from_pairs() {
        let states: BlockStates = [("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(states.to_states_string(), r#"["x"=1,"y"=2]"#);
    }
}
