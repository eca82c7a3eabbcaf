//! Class and method containers

use super::instruction::Instruction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class name in internal (slash separated) form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ClassName(String);

impl ClassName {
    /// Create a class name; dotted names are converted to internal form
    pub fn new(name: &str) -> Self {
        Self(name.replace('.', "/"))
    }

    /// Internal form, e.g. `java/util/Iterator`
    pub fn as_internal(&self) -> &str {
        &self.0
    }

    /// Dotted form, e.g. `java.util.Iterator`
    pub fn as_java_name(&self) -> String {
        self.0.replace('/', ".")
    }
}

impl From<String> for ClassName {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<ClassName> for String {
    fn from(name: ClassName) -> Self {
        name.0
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a method: declaring class, name and descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Declaring class
    pub class: ClassName,
    /// Method name
    pub method: String,
    /// Method descriptor, distinguishing overloads
    pub descriptor: String,
}

impl Location {
    /// Create a location
    pub fn new(class: &str, method: &str, descriptor: &str) -> Self {
        Self {
            class: ClassName::new(class),
            method: method.to_string(),
            descriptor: descriptor.to_string(),
        }
    }

    /// Method name followed by descriptor, e.g. `sum([I)I`
    pub fn signature(&self) -> String {
        format!("{}{}", self.method, self.descriptor)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.class, self.method, self.descriptor)
    }
}

/// A method body as an ordered instruction list
#[derive(Debug, Clone)]
pub struct MethodTree {
    location: Location,
    instructions: Vec<Instruction>,
}

impl MethodTree {
    /// Create a method from its location and body
    pub fn new(location: Location, instructions: Vec<Instruction>) -> Self {
        Self {
            location,
            instructions,
        }
    }

    /// Method identity
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Full instruction list, markers included
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction at an offset
    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }
}

/// A class under analysis and its methods
#[derive(Debug, Clone)]
pub struct ClassTree {
    name: ClassName,
    methods: Vec<MethodTree>,
}

impl ClassTree {
    /// Create an empty class
    pub fn new(name: &str) -> Self {
        Self {
            name: ClassName::new(name),
            methods: Vec::new(),
        }
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodTree) -> Self {
        self.methods.push(method);
        self
    }

    /// Class name
    pub fn name(&self) -> &ClassName {
        &self.name
    }

    /// All methods in declaration order
    pub fn methods(&self) -> &[MethodTree] {
        &self.methods
    }

    /// Method at a location, if this class declares it
    pub fn method(&self, location: &Location) -> Option<&MethodTree> {
        if location.class != self.name {
            return None;
        }
        self.methods.iter().find(|m| {
            m.location.method == location.method && m.location.descriptor == location.descriptor
        })
    }
}
