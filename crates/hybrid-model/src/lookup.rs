// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Name resolution over the model: modules, classes, methods and the
//! interface signatures that carry method contracts.

use crate::ast::{Block, ClassDecl, InterfaceDecl, InterfaceMethod, MethodImpl, MethodSig, Model, ModuleDecl};
use crate::ModelError;
use std::collections::BTreeSet;

/// Prefix of the standard library modules, which are never verified.
const STDLIB_PREFIX: &str = "ABS.";

impl Model {
    pub fn find_module(&self, name: &str) -> Option<&ModuleDecl> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Modules written by the user (standard library excluded)
    pub fn user_modules(&self) -> impl Iterator<Item = &ModuleDecl> {
        self.modules
            .iter()
            .filter(|m| !m.name.starts_with(STDLIB_PREFIX))
    }

    /// Find a class by its qualified name `<module>.<class>`.
    /// Module names may themselves contain dots.
    pub fn find_class(&self, qualified: &str) -> Result<&ClassDecl, ModelError> {
        let (module_name, class_name) = qualified
            .rsplit_once('.')
            .ok_or_else(|| ModelError::InvalidPath(qualified.to_string()))?;
        let module = self
            .find_module(module_name)
            .ok_or_else(|| ModelError::ModuleNotFound(module_name.to_string()))?;
        module
            .classes
            .iter()
            .find(|c| c.name == class_name)
            .ok_or_else(|| ModelError::ClassNotFound(qualified.to_string()))
    }

    /// Find a class by qualified name or, failing that, by its simple name in any module
    pub fn find_class_by_name(&self, name: &str) -> Result<&ClassDecl, ModelError> {
        if name.contains('.') {
            if let Ok(class) = self.find_class(name) {
                return Ok(class);
            }
        }
        let simple = name.rsplit('.').next().unwrap_or(name);
        self.modules
            .iter()
            .flat_map(|m| m.classes.iter())
            .find(|c| c.name == simple)
            .ok_or_else(|| ModelError::ClassNotFound(name.to_string()))
    }

    /// Find a method by its qualified name `<module>.<class>.<method>`.
    pub fn find_method(&self, qualified: &str) -> Result<(&ClassDecl, &MethodImpl), ModelError> {
        let (class_path, method_name) = qualified
            .rsplit_once('.')
            .ok_or_else(|| ModelError::InvalidPath(qualified.to_string()))?;
        let class = self.find_class(class_path)?;
        let method = class
            .method(method_name)
            .ok_or_else(|| ModelError::MethodNotFound(qualified.to_string()))?;
        Ok((class, method))
    }

    pub fn find_interface(&self, name: &str) -> Option<&InterfaceDecl> {
        let simple = name.rsplit('.').next().unwrap_or(name);
        self.modules
            .iter()
            .flat_map(|m| m.interfaces.iter())
            .find(|i| i.name == name || i.name == simple)
    }

    /// Find the signature matching `sig` in the named interface or any interface it extends
    pub fn find_sig_in_interface(&self, interface: &str, sig: &MethodSig) -> Option<&InterfaceMethod> {
        let mut visited = BTreeSet::new();
        let mut pending = vec![interface.to_string()];
        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(decl) = self.find_interface(&name) else {
                continue;
            };
            if let Some(found) = decl.methods.iter().find(|m| m.sig.matches(sig)) {
                return Some(found);
            }
            pending.extend(decl.extends.iter().cloned());
        }
        None
    }

    /// Find the interface signature implemented by a method of `class`
    pub fn find_interface_sig(&self, class: &ClassDecl, sig: &MethodSig) -> Option<&InterfaceMethod> {
        class
            .implements
            .iter()
            .find_map(|interface| self.find_sig_in_interface(interface, sig))
    }

    /// The first main block in the model
    pub fn main_block(&self) -> Option<&Block> {
        self.modules.iter().find_map(|m| m.main_block.as_ref())
    }
}

impl ClassDecl {
    pub fn method(&self, name: &str) -> Option<&MethodImpl> {
        self.methods.iter().find(|m| m.sig.name == name)
    }

    pub fn method_by_sig(&self, sig: &MethodSig) -> Option<&MethodImpl> {
        self.methods.iter().find(|m| m.sig.matches(sig))
    }

    /// The `run` method, activated on object creation
    pub fn run_method(&self) -> Option<&MethodImpl> {
        self.method("run")
    }

    pub fn is_physical(&self) -> bool {
        self.physical.is_some()
    }

    /// Names of class parameters, discrete fields and continuous fields, in declaration order
    pub fn field_names(&self) -> Vec<String> {
        let physical = self.physical.iter().flat_map(|p| p.fields.iter());
        self.params
            .iter()
            .map(|p| p.name.clone())
            .chain(self.fields.iter().map(|f| f.name.clone()))
            .chain(physical.map(|f| f.name.clone()))
            .collect()
    }
}
