use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

/// A single property line: `NAME;PARAM=a,b:value`
///
/// The value is kept exactly as it appeared on the wire (still escaped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name, upper-cased
    pub name: String,
    /// Parameters in source order
    pub params: IndexMap<String, Vec<String>>,
    /// Raw value text
    pub value: String,
}

impl ContentLine {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ContentLine {
            name: name.into().to_ascii_uppercase(),
            params: IndexMap::new(),
            value: value.into(),
        }
    }

    /// Builder-style parameter insertion
    pub fn with_param(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.params.insert(name.into().to_ascii_uppercase(), values);
        self
    }

    /// Values of a parameter, if present
    pub fn param(&self, name: &str) -> Option<&[String]> {
        self.params
            .get(&name.to_ascii_uppercase())
            .map(|v| v.as_slice())
    }

    /// True if the parameter `name` carries `value` (case-insensitive)
    pub fn has_param_value(&self, name: &str, value: &str) -> bool {
        self.param(name)
            .is_some_and(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
    }
}

// IndexMap equality ignores order, so only the order-independent parts are hashed.
impl Hash for ContentLine {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.value.hash(state);
    }
}

// Quoting is decided from the value, not remembered from the source: a
// needlessly quoted value comes back unquoted.
impl fmt::Display for ContentLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (name, values) in &self.params {
            write!(f, ";{}=", name)?;
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                if value.contains([':', ';', ',']) {
                    write!(f, "\"{}\"", value)?;
                } else {
                    f.write_str(value)?;
                }
            }
        }
        write!(f, ":{}", self.value)
    }
}

/// One entry of a [`Container`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerItem {
    Line(ContentLine),
    Component(Container),
}

impl ContainerItem {
    /// The tag used to match this item against extractors: the property
    /// name for lines, the component name for nested containers.
    pub fn tag(&self) -> &str {
        match self {
            ContainerItem::Line(line) => &line.name,
            ContainerItem::Component(container) => &container.name,
        }
    }
}

/// A named `BEGIN:NAME` ... `END:NAME` block of property lines and
/// nested components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Container {
    pub name: String,
    pub items: Vec<ContainerItem>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Container {
            name: name.into().to_ascii_uppercase(),
            items: Vec::new(),
        }
    }

    pub fn push_line(&mut self, line: ContentLine) {
        self.items.push(ContainerItem::Line(line));
    }

    pub fn push_component(&mut self, container: Container) {
        self.items.push(ContainerItem::Component(container));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Property lines directly inside this container
    pub fn lines(&self) -> impl Iterator<Item = &ContentLine> {
        self.items.iter().filter_map(|item| match item {
            ContainerItem::Line(line) => Some(line),
            ContainerItem::Component(_) => None,
        })
    }

    /// Nested components directly inside this container
    pub fn components(&self) -> impl Iterator<Item = &Container> {
        self.items.iter().filter_map(|item| match item {
            ContainerItem::Component(c) => Some(c),
            ContainerItem::Line(_) => None,
        })
    }

    /// First property line with the given name
    pub fn line(&self, name: &str) -> Option<&ContentLine> {
        self.lines().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Remove every item whose tag matches, returning them in source order.
    /// Remaining items keep their relative order.
    pub fn take(&mut self, tag: &str) -> Vec<ContainerItem> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| item.tag().eq_ignore_ascii_case(tag));
        self.items = kept;
        taken
    }

    /// Render as unfolded text lines, including the `BEGIN`/`END` markers
    pub fn to_lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.write_lines(&mut out);
        out
    }

    fn write_lines(&self, out: &mut Vec<String>) {
        out.push(format!("BEGIN:{}", self.name));
        for item in &self.items {
            match item {
                ContainerItem::Line(line) => out.push(line.to_string()),
                ContainerItem::Component(c) => c.write_lines(out),
            }
        }
        out.push(format!("END:{}", self.name));
    }
}
