//! Declaration validation
//!
//! Before a module set reaches the engine, every module is scanned for its
//! `package` clause and its top-level rule heads. The merged namespace is
//! then checked for declarations that cannot coexist, so conflicts surface at
//! prepare time and name both modules involved.
//!
//! The scan only looks at statements that start at nesting depth zero.
//! Braces, brackets and parentheses inside string literals, raw strings and
//! comments are ignored while tracking depth.
//!
//! # Conflicts
//!
//! - the same rule declared with different kinds (complete, partial set,
//!   partial object, function)
//! - a rule assigned with `:=` and declared again
//! - two `default` declarations of one rule
//! - a rule whose path is also a package path
//!
//! Rule heads are classified per the module's dialect: a module importing
//! `rego.v1` reads `p[x] if { ... }` as an object entry, older modules read
//! it as a set member.

use crate::error::CompileError;
use crate::resolver::CompilationUnit;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use verdict_core::module::is_identifier;
use verdict_core::QueryPath;

/// What kind of value a rule head declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// A single value (`p := v`, `p = v`, `p if { ... }`)
    Complete,
    /// `default p := v`
    Default,
    /// `p contains x`, or `p[x] { ... }` outside `rego.v1`
    PartialSet,
    /// `p[k] := v`, a dotted ref head `p.q := v`, or `p[x] if { ... }`
    /// under `rego.v1`
    PartialObject,
    /// `f(x) := v`
    Function,
}

impl RuleKind {
    /// Defaults provide the fallback of a complete rule
    fn family(self) -> RuleKind {
        match self {
            RuleKind::Default => RuleKind::Complete,
            kind => kind,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::Complete => "complete rule",
            RuleKind::Default => "default rule",
            RuleKind::PartialSet => "partial set rule",
            RuleKind::PartialObject => "partial object rule",
            RuleKind::Function => "function",
        };
        f.write_str(name)
    }
}

/// One top-level rule head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDeclaration {
    pub name: String,
    /// Static part of the head, dot separated (`checks.allow` for a ref head)
    pub path: String,
    pub kind: RuleKind,
    /// Declared with `:=`
    pub assign: bool,
    pub line: usize,
}

/// Package and rule heads of one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDeclarations {
    pub module: String,
    pub package: String,
    /// Module imports `rego.v1`
    pub rego_v1: bool,
    pub rules: Vec<RuleDeclaration>,
}

#[derive(Debug, Clone)]
struct Entry {
    module: String,
    kind: RuleKind,
    assign: bool,
}

/// Merged declarations of a whole compilation unit
#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    modules: Vec<ModuleDeclarations>,
    /// (package, rule) -> kind
    rules: BTreeMap<(String, String), RuleKind>,
}

impl DeclarationIndex {
    pub fn modules(&self) -> &[ModuleDeclarations] {
        &self.modules
    }

    /// Kind of a rule in a package, if any module declares it
    pub fn kind(&self, package: &str, rule: &str) -> Option<RuleKind> {
        self.rules
            .get(&(package.to_string(), rule.to_string()))
            .copied()
    }

    pub fn declares(&self, package: &str, rule: &str) -> bool {
        self.kind(package, rule).is_some()
    }

    /// Whether a query path names a declared rule
    ///
    /// The path matches a rule when it equals the package plus the rule's
    /// head path, or when it stops inside a ref head (`data.app.checks` for
    /// `checks.allow` in `package app`).
    pub fn resolves(&self, query: &QueryPath) -> bool {
        let target = query.as_str().strip_prefix("data.").unwrap_or(query.as_str());

        self.modules.iter().any(|module| {
            module.rules.iter().any(|rule| {
                let declared = format!("{}.{}", module.package, rule.path);
                declared == target
                    || (target.len() > module.package.len()
                        && declared
                            .strip_prefix(target)
                            .is_some_and(|rest| rest.starts_with('.')))
            })
        })
    }

    /// Distinct packages, sorted
    pub fn packages(&self) -> Vec<&str> {
        let mut packages: Vec<&str> = self.modules.iter().map(|m| m.package.as_str()).collect();
        packages.sort_unstable();
        packages.dedup();
        packages
    }
}

/// Scan every module and check the merged namespace
pub fn validate(unit: &CompilationUnit) -> Result<DeclarationIndex, CompileError> {
    let mut scanned = Vec::with_capacity(unit.modules().len());
    for module in unit.modules() {
        scanned.push(scan_module(&module.name, &module.text)?);
    }

    let mut seen: HashMap<(String, String), Vec<Entry>> = HashMap::new();
    for declarations in &scanned {
        for rule in &declarations.rules {
            let key = (declarations.package.clone(), rule.name.clone());
            let entry = Entry {
                module: declarations.module.clone(),
                kind: rule.kind,
                assign: rule.assign,
            };
            let existing = seen.entry(key).or_default();
            for earlier in existing.iter() {
                check_pair(&declarations.package, &rule.name, earlier, &entry)?;
            }
            existing.push(entry);
        }
    }

    check_package_collisions(&scanned)?;

    let rules = seen
        .into_iter()
        .map(|(key, entries)| {
            let kind = entries
                .iter()
                .map(|e| e.kind.family())
                .next()
                .unwrap_or(RuleKind::Complete);
            (key, kind)
        })
        .collect();

    let index = DeclarationIndex {
        modules: scanned,
        rules,
    };

    let query = unit.query_path();
    if !index.resolves(query) {
        return Err(CompileError::QueryPathNotFound {
            query: query.to_string(),
        });
    }

    Ok(index)
}

fn check_pair(
    package: &str,
    rule: &str,
    earlier: &Entry,
    later: &Entry,
) -> Result<(), CompileError> {
    let conflict = |reason: String| CompileError::ConflictingDeclaration {
        rule: format!("{}.{}", package, rule),
        first_module: earlier.module.clone(),
        second_module: later.module.clone(),
        reason,
    };

    if earlier.kind.family() != later.kind.family() {
        return Err(conflict(format!(
            "declared as a {} and as a {}",
            earlier.kind, later.kind
        )));
    }

    match (earlier.kind, later.kind) {
        (RuleKind::Default, RuleKind::Default) => {
            Err(conflict("multiple default declarations".to_string()))
        }
        (RuleKind::Complete, RuleKind::Complete) if earlier.assign || later.assign => Err(
            conflict("declared with := and declared again".to_string()),
        ),
        _ => Ok(()),
    }
}

fn check_package_collisions(scanned: &[ModuleDeclarations]) -> Result<(), CompileError> {
    let packages: HashMap<&str, &str> = scanned
        .iter()
        .map(|m| (m.package.as_str(), m.module.as_str()))
        .collect();

    for declarations in scanned {
        for rule in &declarations.rules {
            let path = format!("{}.{}", declarations.package, rule.name);
            if let Some(module) = packages.get(path.as_str()) {
                return Err(CompileError::ConflictingDeclaration {
                    rule: path.clone(),
                    first_module: declarations.module.clone(),
                    second_module: module.to_string(),
                    reason: format!("rule '{}' collides with package '{}'", rule.name, path),
                });
            }
        }
    }
    Ok(())
}

/// Scan one module for its package and top-level rule heads
pub fn scan_module(module: &str, text: &str) -> Result<ModuleDeclarations, CompileError> {
    let mut state = ScanState::default();
    let mut package = None;
    let mut rego_v1 = false;
    let mut rules = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if state.at_top_level() {
            match classify(line.trim(), rego_v1) {
                Some(Statement::Package(name)) if package.is_none() => package = Some(name),
                Some(Statement::Import(path)) if path == "rego.v1" => rego_v1 = true,
                Some(Statement::Rule {
                    name,
                    path,
                    kind,
                    assign,
                }) => rules.push(RuleDeclaration {
                    name,
                    path,
                    kind,
                    assign,
                    line: index + 1,
                }),
                _ => {}
            }
        }
        state.scan_line(line);
    }

    let package = package.ok_or_else(|| CompileError::MissingPackage {
        module: module.to_string(),
    })?;

    Ok(ModuleDeclarations {
        module: module.to_string(),
        package,
        rego_v1,
        rules,
    })
}

#[derive(Debug, Default)]
struct ScanState {
    depth: usize,
    in_raw_string: bool,
}

impl ScanState {
    fn at_top_level(&self) -> bool {
        self.depth == 0 && !self.in_raw_string
    }

    fn scan_line(&mut self, line: &str) {
        let mut chars = line.chars();
        let mut in_string = false;

        while let Some(c) = chars.next() {
            if self.in_raw_string {
                if c == '`' {
                    self.in_raw_string = false;
                }
                continue;
            }
            if in_string {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '#' => break,
                '"' => in_string = true,
                '`' => self.in_raw_string = true,
                '{' | '[' | '(' => self.depth += 1,
                '}' | ']' | ')' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Statement {
    Package(String),
    Import(String),
    Rule {
        name: String,
        path: String,
        kind: RuleKind,
        assign: bool,
    },
}

fn leading_identifier(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

fn starts_with_word(s: &str, word: &str) -> bool {
    s.strip_prefix(word)
        .map(|rest| rest.is_empty() || !(rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_')))
        .unwrap_or(false)
}

/// Split the dotted tail of a ref head (`.allow` in `checks.allow := ...`)
fn ref_tail(mut rest: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    while let Some(after_dot) = rest.strip_prefix('.') {
        let segment = leading_identifier(after_dot);
        if !is_identifier(segment) {
            break;
        }
        segments.push(segment);
        rest = &after_dot[segment.len()..];
    }
    segments
}

fn classify(line: &str, rego_v1: bool) -> Option<Statement> {
    let name = leading_identifier(line);
    if !is_identifier(name) {
        return None;
    }
    let rest = line[name.len()..].trim_start();

    match name {
        "package" | "import" => {
            let path = rest.split(|c: char| c.is_whitespace() || c == '#').next()?;
            if path.is_empty() {
                return None;
            }
            return Some(if name == "package" {
                Statement::Package(path.to_string())
            } else {
                Statement::Import(path.to_string())
            });
        }
        "else" => return None,
        "default" => {
            let rule = leading_identifier(rest);
            if !is_identifier(rule) {
                return None;
            }
            let tail = ref_tail(&rest[rule.len()..]);
            let mut path = vec![rule];
            path.extend(tail);
            return Some(Statement::Rule {
                name: rule.to_string(),
                path: path.join("."),
                kind: RuleKind::Default,
                assign: false,
            });
        }
        _ => {}
    }

    let rule = |kind: RuleKind, assign: bool| {
        Some(Statement::Rule {
            name: name.to_string(),
            path: name.to_string(),
            kind,
            assign,
        })
    };

    if rest.starts_with('(') {
        rule(RuleKind::Function, false)
    } else if rest.starts_with('.') {
        let tail = ref_tail(rest);
        if tail.is_empty() {
            return None;
        }
        let mut path = vec![name];
        path.extend(tail);
        Some(Statement::Rule {
            name: name.to_string(),
            path: path.join("."),
            kind: RuleKind::PartialObject,
            assign: false,
        })
    } else if let Some(after_open) = rest.strip_prefix('[') {
        let after_key = after_open
            .find(']')
            .map(|i| after_open[i + 1..].trim_start())
            .unwrap_or("");
        let has_value =
            after_key.starts_with(":=") || (after_key.starts_with('=') && !after_key.starts_with("=="));
        if has_value || rego_v1 {
            rule(RuleKind::PartialObject, false)
        } else {
            rule(RuleKind::PartialSet, false)
        }
    } else if starts_with_word(rest, "contains") {
        rule(RuleKind::PartialSet, false)
    } else if rest.starts_with(":=") {
        rule(RuleKind::Complete, true)
    } else if rest.starts_with('=') && !rest.starts_with("==") {
        rule(RuleKind::Complete, false)
    } else if rest.is_empty()
        || rest.starts_with('{')
        || rest.starts_with('#')
        || starts_with_word(rest, "if")
    {
        rule(RuleKind::Complete, false)
    } else {
        None
    }
}
