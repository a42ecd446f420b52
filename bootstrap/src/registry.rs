//! Registry of managed tools.

use std::collections::BTreeMap;

use anyhow::{Result, bail};

use crate::io::config::BootstrapConfig;
use crate::tools::Initializer;
use crate::tools::bun::Bun;
use crate::tools::uv::Uv;

/// Name-keyed set of initializers, fixed once built.
///
/// Iteration follows sorted name order, which is also the order tools are
/// reconciled in.
pub struct Registry {
    tools: BTreeMap<String, Box<dyn Initializer>>,
}

impl Registry {
    /// Build a registry, rejecting duplicate names.
    pub fn from_tools(tools: Vec<Box<dyn Initializer>>) -> Result<Self> {
        let mut map: BTreeMap<String, Box<dyn Initializer>> = BTreeMap::new();
        for tool in tools {
            let name = tool.name().to_string();
            if name.trim().is_empty() {
                bail!("tool name must not be empty");
            }
            if map.contains_key(&name) {
                bail!("duplicate tool name '{name}'");
            }
            map.insert(name, tool);
        }
        Ok(Self { tools: map })
    }

    /// The tools this bootstrap knows how to manage.
    pub fn builtin(cfg: &BootstrapConfig) -> Result<Self> {
        Self::from_tools(vec![
            Box::new(Uv::new(cfg.mirrors.pypi.clone())),
            Box::new(Bun::new(cfg.mirrors.npm.clone())),
        ])
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Initializer> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Initializer> {
        self.tools.values().map(|tool| tool.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registers_uv_and_bun_in_name_order() {
        let registry = Registry::builtin(&BootstrapConfig::default()).expect("registry");
        assert_eq!(registry.names(), vec!["bun", "uv"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("uv").is_some());
        assert!(registry.get("pip").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Registry::from_tools(vec![
            Box::new(Uv::new("https://a.example/simple/".to_string())),
            Box::new(Uv::new("https://b.example/simple/".to_string())),
        ])
        .err()
        .expect("duplicate rejected");
        assert!(err.to_string().contains("duplicate tool name 'uv'"));
    }
}
