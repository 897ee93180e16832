use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::error::EngineError;
use super::operation::Operation;
use crate::core::config::EngineConfig;
use crate::core::value::Value;

/// Builds an operation from its resolved dependencies.
pub type Factory =
    Box<dyn Fn(&Dependencies, &EngineConfig) -> Result<Operation, EngineError> + Send + Sync>;

/// Declaration of one operation: name, what it composes, how to build it.
pub struct OperationDecl {
    pub name: String,
    pub dependencies: Vec<String>,
    pub factory: Factory,
}

impl OperationDecl {
    pub fn new<F>(name: &str, dependencies: &[&str], factory: F) -> Self
    where
        F: Fn(&Dependencies, &EngineConfig) -> Result<Operation, EngineError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            factory: Box::new(factory),
        }
    }
}

/// Already-built operations handed to a factory. Only the declared
/// dependencies are visible.
pub struct Dependencies {
    operation: String,
    ops: HashMap<String, Arc<Operation>>,
}

impl Dependencies {
    pub fn get(&self, name: &str) -> Result<Arc<Operation>, EngineError> {
        self.ops
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::MissingDependency {
                operation: self.operation.clone(),
                dependency: name.to_string(),
            })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

pub struct RegistryBuilder {
    config: EngineConfig,
    decls: Vec<OperationDecl>,
}

impl RegistryBuilder {
    pub fn declare(mut self, decl: OperationDecl) -> Self {
        self.decls.push(decl);
        self
    }

    pub fn declare_all(mut self, decls: impl IntoIterator<Item = OperationDecl>) -> Self {
        self.decls.extend(decls);
        self
    }

    /// Builds every declaration after its dependencies.
    pub fn build(self) -> Result<Registry, EngineError> {
        let mut by_name: HashMap<&str, &OperationDecl> = HashMap::new();
        for decl in &self.decls {
            if by_name.insert(decl.name.as_str(), decl).is_some() {
                return Err(EngineError::DuplicateOperation(decl.name.clone()));
            }
        }

        let mut order = Vec::with_capacity(self.decls.len());
        let mut state: HashMap<&str, Visit> = HashMap::new();
        for decl in &self.decls {
            let mut path = Vec::new();
            visit(decl.name.as_str(), &by_name, &mut state, &mut path, &mut order)?;
        }

        let mut operations: HashMap<String, Arc<Operation>> = HashMap::new();
        for name in &order {
            let decl = by_name[name];
            let deps = Dependencies {
                operation: decl.name.clone(),
                ops: decl
                    .dependencies
                    .iter()
                    .filter_map(|d| operations.get(d).map(|op| (d.clone(), op.clone())))
                    .collect(),
            };
            let op = (decl.factory)(&deps, &self.config)?;
            operations.insert(decl.name.clone(), Arc::new(op));
        }

        let order: Vec<String> = order.into_iter().map(str::to_string).collect();
        info!(operations = ?order, "operation registry built");

        Ok(Registry {
            config: self.config,
            operations,
            order,
        })
    }
}

fn visit<'a>(
    name: &'a str,
    decls: &HashMap<&'a str, &'a OperationDecl>,
    state: &mut HashMap<&'a str, Visit>,
    path: &mut Vec<&'a str>,
    order: &mut Vec<&'a str>,
) -> Result<(), EngineError> {
    match state.get(name) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => {
            let start = path.iter().position(|p| *p == name).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|p| p.to_string()).collect();
            cycle.push(name.to_string());
            return Err(EngineError::DependencyCycle(cycle));
        }
        None => {}
    }

    let decl = decls[name];
    state.insert(name, Visit::InProgress);
    path.push(name);
    for dep in &decl.dependencies {
        let Some((dep_name, _)) = decls.get_key_value(dep.as_str()) else {
            return Err(EngineError::MissingDependency {
                operation: name.to_string(),
                dependency: dep.clone(),
            });
        };
        visit(*dep_name, decls, state, path, order)?;
    }
    path.pop();
    state.insert(name, Visit::Done);
    order.push(name);
    Ok(())
}

/// Every operation of the process, built once and shared read-only.
pub struct Registry {
    config: EngineConfig,
    operations: HashMap<String, Arc<Operation>>,
    order: Vec<String>,
}

static STANDARD: OnceCell<Registry> = OnceCell::new();

impl Registry {
    pub fn builder(config: EngineConfig) -> RegistryBuilder {
        RegistryBuilder {
            config,
            decls: Vec::new(),
        }
    }

    /// The built-in operations (`floor`, `ceil`, `fix`) for a configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        Self::builder(config)
            .declare_all(crate::functions::declarations())
            .build()
    }

    /// Process-wide registry built from `EngineConfig::load()` on first use.
    pub fn standard() -> Result<&'static Registry, EngineError> {
        STANDARD.get_or_try_init(|| Registry::with_config(EngineConfig::load()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn get(&self, name: &str) -> Result<Arc<Operation>, EngineError> {
        self.operations
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownOperation(name.to_string()))
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, EngineError> {
        self.get(name)?.call(args)
    }

    /// Operation names in construction order (dependencies first)
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn operations(&self) -> impl Iterator<Item = &Arc<Operation>> + '_ {
        self.order.iter().filter_map(|name| self.operations.get(name))
    }
}
