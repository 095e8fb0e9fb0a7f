//! Read-only views over the descriptors protoc hands to a plugin.
//!
//! The views borrow from the `FileDescriptorProto`s of a
//! `CodeGeneratorRequest` and attach the Go names that protoc-gen-go assigns
//! to each declaration, so generators can refer to types the Go code
//! generator will produce.

use std::collections::HashMap;
use std::fmt;

use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    OneofDescriptorProto,
};

use crate::config::{Config, PathsMode};
use crate::error::{CodegenError, Result};

/// Method names protoc-gen-go reserves on every message type.
const RESERVED_GO_NAMES: &[&str] = &[
    "Reset",
    "String",
    "ProtoMessage",
    "Marshal",
    "Unmarshal",
    "ExtensionRangeArray",
    "ExtensionMap",
    "Descriptor",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoImportPath(pub String);

impl GoImportPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Package name implied by the last element of the import path.
    pub fn base_package_name(&self) -> GoPackageName {
        let base = self.0.rsplit('/').next().unwrap_or_default();
        GoPackageName(sanitize_identifier(base))
    }
}

impl fmt::Display for GoImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<&str> for GoImportPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for GoImportPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoPackageName(pub String);

impl GoPackageName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GoPackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Go identifier qualified by the package that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoIdent {
    pub go_name: String,
    pub go_import_path: GoImportPath,
}

impl GoIdent {
    pub fn new(go_import_path: impl Into<GoImportPath>, go_name: impl Into<String>) -> Self {
        Self {
            go_name: go_name.into(),
            go_import_path: go_import_path.into(),
        }
    }
}

/// A proto file selected for generation.
#[derive(Debug)]
pub struct File<'a> {
    pub desc: &'a FileDescriptorProto,
    pub go_import_path: GoImportPath,
    pub go_package_name: GoPackageName,
    /// Output path without extension that generated files are named after.
    pub generated_filename_prefix: String,
    /// Top-level messages in declaration order.
    pub messages: Vec<Message<'a>>,
}

impl<'a> File<'a> {
    pub fn new(desc: &'a FileDescriptorProto, config: &Config) -> Result<Self> {
        let name = desc.name();
        let go_package = desc
            .options
            .as_ref()
            .and_then(|o| o.go_package.as_deref())
            .filter(|p| !p.is_empty());

        // `go_package` may carry an explicit package name after a semicolon
        let (package_path, explicit_name) = match go_package {
            Some(p) => match p.split_once(';') {
                Some((path, pkg)) => (Some(path), Some(pkg)),
                None => (Some(p), None),
            },
            None => (None, None),
        };

        let go_import_path = match config.import_mappings.get(name) {
            Some(mapped) => GoImportPath(mapped.clone()),
            None => match package_path.filter(|p| !p.is_empty()) {
                Some(path) => GoImportPath(path.to_string()),
                None => return Err(CodegenError::MissingGoPackage(name.to_string())),
            },
        };

        let go_package_name = match explicit_name.filter(|n| !n.is_empty()) {
            Some(pkg) => GoPackageName(sanitize_identifier(pkg)),
            None => go_import_path.base_package_name(),
        };

        let stem = match name.rfind('.') {
            Some(dot) if !name[dot..].contains('/') => &name[..dot],
            _ => name,
        };
        let generated_filename_prefix = match config.paths {
            PathsMode::SourceRelative => stem.to_string(),
            PathsMode::Import => {
                let base = stem.rsplit('/').next().unwrap_or(stem);
                join_path(&[go_import_path.as_str(), base])
            }
        };

        let messages = desc
            .message_type
            .iter()
            .map(|m| Message::new(m, None, &go_import_path))
            .collect();

        Ok(Self {
            desc,
            go_import_path,
            go_package_name,
            generated_filename_prefix,
            messages,
        })
    }

    /// Proto file name, relative to the include root.
    pub fn name(&self) -> &str {
        self.desc.name()
    }
}

/// A message declaration together with its Go naming.
#[derive(Debug, Clone)]
pub struct Message<'a> {
    pub desc: &'a DescriptorProto,
    pub go_ident: GoIdent,
    /// Fields in declaration order, including oneof members.
    pub fields: Vec<Field<'a>>,
    pub oneofs: Vec<Oneof<'a>>,
    /// Nested messages in declaration order.
    pub messages: Vec<Message<'a>>,
    pub enums: Vec<Enum<'a>>,
}

/// Go names already taken within one message, mapped to whether their
/// `Get` form is taken too.
struct UsedNames(HashMap<String, bool>);

impl UsedNames {
    fn new() -> Self {
        Self(
            RESERVED_GO_NAMES
                .iter()
                .map(|n| (n.to_string(), true))
                .collect(),
        )
    }

    fn is_used(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    /// Appends `_` until `name` (and its getter, if it has one) is free.
    fn make_unique(&mut self, mut name: String, has_getter: bool) -> String {
        while self.is_used(&name) || (has_getter && self.is_used(&format!("Get{name}"))) {
            name.push('_');
        }
        self.0.insert(name.clone(), true);
        self.0.insert(format!("Get{name}"), has_getter);
        name
    }
}

impl<'a> Message<'a> {
    fn new(desc: &'a DescriptorProto, parent: Option<&GoIdent>, import_path: &GoImportPath) -> Self {
        let go_name = match parent {
            Some(parent) => format!("{}_{}", parent.go_name, go_camel_case(desc.name())),
            None => go_camel_case(desc.name()),
        };
        let go_ident = GoIdent::new(import_path.clone(), go_name);

        let messages: Vec<Message<'a>> = desc
            .nested_type
            .iter()
            .map(|m| Message::new(m, Some(&go_ident), import_path))
            .collect();
        let enums: Vec<Enum<'a>> = desc
            .enum_type
            .iter()
            .map(|e| Enum::new(e, Some(&go_ident), import_path))
            .collect();

        let mut names = UsedNames::new();
        let mut oneof_names: Vec<Option<String>> = vec![None; desc.oneof_decl.len()];

        let mut fields: Vec<Field<'a>> = Vec::with_capacity(desc.field.len());
        for field in &desc.field {
            let go_name = names.make_unique(go_camel_case(field.name()), true);

            let oneof_index = field
                .oneof_index
                .and_then(|i| usize::try_from(i).ok())
                .filter(|i| *i < oneof_names.len());

            let ident_name = match oneof_index {
                Some(index) => {
                    // a oneof is named when its first member is reached, without a getter
                    if oneof_names[index].is_none() {
                        let oneof_name = go_camel_case(desc.oneof_decl[index].name());
                        oneof_names[index] = Some(names.make_unique(oneof_name, false));
                    }

                    // Oneof members are reached through a wrapper type named after the field
                    let mut ident_name = format!("{}_{}", go_ident.go_name, go_name);
                    while messages.iter().any(|m| m.go_ident.go_name == ident_name)
                        || enums.iter().any(|e| e.go_ident.go_name == ident_name)
                    {
                        ident_name.push('_');
                    }
                    ident_name
                }
                None => go_name.clone(),
            };

            fields.push(Field {
                desc: field,
                go_name,
                go_ident: GoIdent::new(import_path.clone(), ident_name),
                oneof_index,
            });
        }

        let oneofs = desc
            .oneof_decl
            .iter()
            .zip(oneof_names)
            .enumerate()
            .map(|(index, (oneof, go_name))| {
                let go_name = go_name.unwrap_or_else(|| go_camel_case(oneof.name()));
                Oneof {
                    desc: oneof,
                    go_ident: GoIdent::new(
                        import_path.clone(),
                        format!("{}_{}", go_ident.go_name, go_name),
                    ),
                    go_name,
                    fields: fields
                        .iter()
                        .filter(|f| f.oneof_index == Some(index))
                        .cloned()
                        .collect(),
                }
            })
            .collect();

        Self {
            desc,
            go_ident,
            fields,
            oneofs,
            messages,
            enums,
        }
    }

    /// Proto name of the message, without package qualification.
    pub fn name(&self) -> &str {
        self.desc.name()
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field<'a>> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

#[derive(Debug, Clone)]
pub struct Field<'a> {
    pub desc: &'a FieldDescriptorProto,
    pub go_name: String,
    /// For oneof members this names the wrapper type, e.g. `GetEventsResponse_Exec`.
    pub go_ident: GoIdent,
    /// Index into the containing message's oneofs.
    pub oneof_index: Option<usize>,
}

impl Field<'_> {
    pub fn name(&self) -> &str {
        self.desc.name()
    }
}

#[derive(Debug, Clone)]
pub struct Oneof<'a> {
    pub desc: &'a OneofDescriptorProto,
    pub go_name: String,
    pub go_ident: GoIdent,
    /// Member fields in declaration order.
    pub fields: Vec<Field<'a>>,
}

impl Oneof<'_> {
    pub fn name(&self) -> &str {
        self.desc.name()
    }
}

#[derive(Debug, Clone)]
pub struct Enum<'a> {
    pub desc: &'a EnumDescriptorProto,
    pub go_ident: GoIdent,
}

impl<'a> Enum<'a> {
    fn new(desc: &'a EnumDescriptorProto, parent: Option<&GoIdent>, import_path: &GoImportPath) -> Self {
        let go_name = match parent {
            Some(parent) => format!("{}_{}", parent.go_name, go_camel_case(desc.name())),
            None => go_camel_case(desc.name()),
        };
        Self {
            desc,
            go_ident: GoIdent::new(import_path.clone(), go_name),
        }
    }
}

/// Converts a proto name into the CamelCase form protoc-gen-go uses for Go identifiers.
pub fn go_camel_case(s: &str) -> String {
    // works on bytes; non-ASCII bytes are copied through untouched
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(s.len() + 1);
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let next_is_lower = bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);
        match c {
            b'.' if next_is_lower => {}
            b'.' => out.push(b'_'),
            b'_' if i == 0 || bytes[i - 1] == b'.' => out.push(b'X'),
            b'_' if next_is_lower => {}
            c if c.is_ascii_digit() => out.push(c),
            c => {
                out.push(c.to_ascii_uppercase());
                while bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase) {
                    i += 1;
                    out.push(bytes[i]);
                }
            }
        }
        i += 1;
    }
    String::from_utf8(out)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Rewrites `s` into a valid Go identifier.
///
/// Characters other than letters and digits become `_`; keywords and names
/// not starting with a letter get a leading `_`.
pub(crate) fn sanitize_identifier(s: &str) -> String {
    let out: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if GO_KEYWORDS.contains(&out.as_str()) || !out.starts_with(char::is_alphabetic) {
        return format!("_{out}");
    }
    out
}

/// Joins slash separated path segments, dropping empty and `.` elements.
pub(crate) fn join_path(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
