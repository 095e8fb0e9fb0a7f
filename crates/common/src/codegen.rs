//! Go source emission helpers.

use std::collections::{BTreeMap, HashSet};

use crate::config::Config;
use crate::schema::{join_path, File, GoIdent, GoImportPath, GoPackageName};

/// Name of the plugin as written into every generated file.
pub const PLUGIN_NAME: &str = "protoc-gen-go-tetragon";

/// A Go source file being generated.
///
/// Lines are buffered through [`GeneratedFile::p`]; identifiers from other
/// packages are registered through [`GeneratedFile::qualified_go_ident`] and
/// turned into an import block by [`GeneratedFile::content`].
#[derive(Debug)]
pub struct GeneratedFile {
    filename: String,
    go_import_path: GoImportPath,
    buf: Vec<String>,
    package_names: BTreeMap<GoImportPath, GoPackageName>,
    used_package_names: HashSet<GoPackageName>,
}

impl GeneratedFile {
    pub fn new(filename: impl Into<String>, go_import_path: GoImportPath) -> Self {
        Self {
            filename: filename.into(),
            go_import_path,
            buf: Vec::new(),
            package_names: BTreeMap::new(),
            used_package_names: HashSet::new(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn go_import_path(&self) -> &GoImportPath {
        &self.go_import_path
    }

    /// Appends a line. Pass an empty string for a blank line.
    pub fn p(&mut self, line: impl AsRef<str>) {
        self.buf.push(line.as_ref().to_string());
    }

    /// Returns the name to use for `ident` inside this file, importing its
    /// package if needed.
    pub fn qualified_go_ident(&mut self, ident: &GoIdent) -> String {
        if ident.go_import_path == self.go_import_path {
            return ident.go_name.clone();
        }
        if let Some(pkg) = self.package_names.get(&ident.go_import_path) {
            return format!("{}.{}", pkg, ident.go_name);
        }

        let base = ident.go_import_path.base_package_name();
        let mut pkg = base.clone();
        let mut n = 1;
        while self.used_package_names.contains(&pkg) {
            pkg = GoPackageName(format!("{}{}", base, n));
            n += 1;
        }
        self.used_package_names.insert(pkg.clone());
        self.package_names
            .insert(ident.go_import_path.clone(), pkg.clone());

        format!("{}.{}", pkg, ident.go_name)
    }

    /// Renders the file, placing the import block right after the package clause.
    ///
    /// A buffer without a package clause gets the import block at the top.
    pub fn content(&self) -> String {
        let imports = self.import_block();
        let mut out = String::new();
        let mut imports_written = imports.is_empty();

        for line in &self.buf {
            out.push_str(line);
            out.push('\n');

            if !imports_written && line.starts_with("package ") {
                out.push('\n');
                out.push_str(&imports);
                imports_written = true;
            }
        }

        if !imports_written {
            out.insert_str(0, &format!("{imports}\n"));
        }
        out
    }

    fn import_block(&self) -> String {
        if self.package_names.is_empty() {
            return String::new();
        }
        let mut block = String::from("import (\n");
        for (path, pkg) in &self.package_names {
            block.push_str(&format!("\t{} {}\n", pkg, path));
        }
        block.push_str(")\n");
        block
    }
}

/// Creates `codegen/<pkg>/<pkg>.pb.go` next to the API package of `file`.
///
/// The file starts with the license header, the generated-code marker and
/// the package clause.
pub fn new_generated_file(file: &File<'_>, pkg: &str, config: &Config) -> GeneratedFile {
    let import_path = join_path(&[file.go_import_path.as_str(), "codegen", pkg]);
    let prefix = file
        .generated_filename_prefix
        .strip_suffix(config.api_file_suffix.as_str())
        .unwrap_or(&file.generated_filename_prefix);
    let file_name = join_path(&[prefix, "codegen", pkg, &format!("{pkg}.pb.go")]);

    tracing::debug!(file = %file_name, import_path = %import_path, "New generated file");

    let mut g = GeneratedFile::new(file_name, GoImportPath(import_path));
    for line in config.license_header.lines() {
        g.p(line);
    }
    g.p("");
    g.p(format!("// Code generated by {PLUGIN_NAME}. DO NOT EDIT"));
    g.p("");
    g.p(format!("package {pkg}"));
    g.p("");
    g
}

/// Returns a qualified Go identifier for `name` in the package at `import_path`.
pub fn go_ident(g: &mut GeneratedFile, import_path: &str, name: &str) -> String {
    g.qualified_go_ident(&GoIdent::new(import_path, name))
}

/// Shorthand for [`go_ident`] in the FGS API package.
pub fn api_ident(g: &mut GeneratedFile, config: &Config, name: &str) -> String {
    go_ident(g, &config.api_import_path, name)
}

/// Generates a call to `logger.GetLogger()`.
pub fn logger(g: &mut GeneratedFile, config: &Config) -> String {
    format!("{}()", go_ident(g, &config.logger_import_path, "GetLogger"))
}

/// Generates a call to `fmt.Errorf` with the format string quoted.
pub fn fmt_errorf(g: &mut GeneratedFile, format: &str, args: &[&str]) -> String {
    let quoted = format!("\"{format}\"");
    let args: Vec<&str> = std::iter::once(quoted.as_str())
        .chain(args.iter().copied())
        .collect();
    format!("{}({})", go_ident(g, "fmt", "Errorf"), args.join(", "))
}
