//! The program linker: resolves contract imports, assigns binding slots and
//! emits the composed WGSL for one program.
//!
//! Composition is where cross-module correctness lives.  Each program gets
//! its own slot table, but every program importing a contract sees the one
//! canonical struct declaration held by the registry, so two programs can
//! never disagree on a contract's layout.  All failures here surface before
//! any GPU submission.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use log::{debug, info};

use crate::contract::{camera, fog, light, Contract};
use crate::error::LinkError;
use crate::variant::ProgramDesc;

/// Group index assigned to imported contracts.
pub const IMPORT_GROUP: u32 = 0;
/// Group index assigned to program-local resources.
pub const LOCAL_GROUP: u32 = 1;

/// Slot assignment for one resource of a linked program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingAssignment {
    /// Contract name for imports, variable name for locals.
    pub name: String,
    pub group: u32,
    pub binding: u32,
    /// Uniform ABI size for imported contracts; `None` for locals.
    pub byte_size: Option<u32>,
}

/// Resolves contract imports into concrete binding slots per program.
pub struct ProgramLinker {
    contracts: BTreeMap<&'static str, Contract>,
}

impl ProgramLinker {
    /// Creates a linker with the built-in camera, light and fog contracts
    /// registered.
    pub fn new() -> Self {
        let mut contracts = BTreeMap::new();
        for contract in [camera::CAMERA, light::LIGHT, fog::FOG] {
            contracts.insert(contract.name, contract);
        }
        Self { contracts }
    }

    /// Registers a contract.  A redefinition is accepted only when it is
    /// structurally identical to the canonical declaration.
    pub fn register(&mut self, contract: Contract) -> Result<(), LinkError> {
        if let Some(existing) = self.contracts.get(contract.name) {
            if !existing.matches(&contract) {
                return Err(LinkError::LayoutMismatch(contract.name.to_string()));
            }
            return Ok(());
        }
        debug!("registered contract `{}`", contract.name);
        self.contracts.insert(contract.name, contract);
        Ok(())
    }

    /// Looks up a registered contract.
    pub fn contract(&self, name: &str) -> Option<&Contract> {
        self.contracts.get(name)
    }

    /// Composes one program: resolves its imports, checks the stage pairing,
    /// assigns unique binding slots and emits the final WGSL.
    pub fn link(&self, desc: &ProgramDesc) -> Result<LinkedProgram, LinkError> {
        let imports = self.resolve_imports(desc)?;
        check_stage_pairing(desc)?;

        let mut bindings = Vec::new();
        for (index, contract) in imports.iter().enumerate() {
            bindings.push(BindingAssignment {
                name: contract.name.to_string(),
                group: IMPORT_GROUP,
                binding: index as u32,
                byte_size: Some(contract.byte_size()),
            });
        }
        for (index, local) in desc.locals.iter().enumerate() {
            bindings.push(BindingAssignment {
                name: local.var_name.to_string(),
                group: LOCAL_GROUP,
                binding: index as u32,
                byte_size: None,
            });
        }

        let mut used = HashSet::new();
        for assignment in &bindings {
            if !used.insert((assignment.group, assignment.binding)) {
                return Err(LinkError::BindingCollision {
                    program: desc.name.to_string(),
                    group: assignment.group,
                    binding: assignment.binding,
                });
            }
            debug!(
                "{}: {} -> (group {}, binding {})",
                desc.name, assignment.name, assignment.group, assignment.binding
            );
        }

        let source = emit(desc, &imports);
        info!(
            "linked program `{}` ({} imports, {} locals)",
            desc.name,
            imports.len(),
            desc.locals.len()
        );

        Ok(LinkedProgram {
            name: desc.name,
            source,
            bindings,
        })
    }

    fn resolve_imports(&self, desc: &ProgramDesc) -> Result<Vec<&Contract>, LinkError> {
        let mut seen = HashSet::new();
        let mut imports = Vec::new();
        for &name in desc.imports {
            if !seen.insert(name) {
                return Err(LinkError::DuplicateImport {
                    program: desc.name.to_string(),
                    import: name.to_string(),
                });
            }
            let contract = self.contracts.get(name).ok_or_else(|| LinkError::MissingImport {
                program: desc.name.to_string(),
                import: name.to_string(),
            })?;
            imports.push(contract);
        }

        for contract in &imports {
            for &required in contract.requires {
                if !seen.contains(required) {
                    return Err(LinkError::MissingDependency {
                        program: desc.name.to_string(),
                        import: contract.name.to_string(),
                        required: required.to_string(),
                    });
                }
            }
        }
        Ok(imports)
    }
}

impl Default for ProgramLinker {
    fn default() -> Self {
        Self::new()
    }
}

/// The fragment stage may only read canonical fields its paired vertex
/// stage populates; a mismatched pairing is a composition error, never a
/// runtime one.
fn check_stage_pairing(desc: &ProgramDesc) -> Result<(), LinkError> {
    for field in desc.fragment_requires {
        if !desc.vertex_provides.contains(field) {
            return Err(LinkError::FieldMismatch {
                program: desc.name.to_string(),
                field: format!("{field:?}"),
            });
        }
    }
    Ok(())
}

/// Emission order: canonical struct declarations, binding declarations,
/// contract functions, then the variant's stage sources.
fn emit(desc: &ProgramDesc, imports: &[&Contract]) -> String {
    let mut source = String::new();
    for contract in imports {
        source.push_str(&contract.struct_decl());
        source.push('\n');
    }
    for (index, contract) in imports.iter().enumerate() {
        let _ = writeln!(
            source,
            "@group({IMPORT_GROUP}) @binding({index})\nvar<uniform> {}: {};\n",
            contract.var_name, contract.name
        );
    }
    for (index, local) in desc.locals.iter().enumerate() {
        let _ = writeln!(
            source,
            "@group({LOCAL_GROUP}) @binding({index})\nvar {}: {};\n",
            local.var_name, local.wgsl_ty
        );
    }
    for contract in imports {
        if !contract.functions.is_empty() {
            source.push_str(contract.functions.trim());
            source.push_str("\n\n");
        }
    }
    source.push_str(desc.vertex_source.trim());
    source.push_str("\n\n");
    source.push_str(desc.fragment_source.trim());
    source.push('\n');
    source
}

/// A composed program: the final WGSL plus the slot table host code binds
/// against.
#[derive(Clone, Debug)]
pub struct LinkedProgram {
    name: &'static str,
    source: String,
    bindings: Vec<BindingAssignment>,
}

impl LinkedProgram {
    pub fn name(&self) -> &str {
        self.name
    }

    /// The composed WGSL source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every slot assignment of the program.
    pub fn bindings(&self) -> &[BindingAssignment] {
        &self.bindings
    }

    /// Assignments for the imported uniform contracts, in slot order.
    pub fn uniform_bindings(&self) -> impl Iterator<Item = &BindingAssignment> {
        self.bindings.iter().filter(|b| b.byte_size.is_some())
    }

    /// Assignments for program-local resources, in slot order.
    pub fn local_bindings(&self) -> impl Iterator<Item = &BindingAssignment> {
        self.bindings.iter().filter(|b| b.byte_size.is_none())
    }

    /// The slot assigned to the named contract or local resource.
    pub fn binding(&self, name: &str) -> Option<(u32, u32)> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| (b.group, b.binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractField, WgslType};
    use crate::variant::{self, CanonicalField};

    fn test_desc() -> ProgramDesc {
        ProgramDesc {
            name: "probe",
            imports: &["Fog"],
            locals: &[],
            vertex_provides: &[CanonicalField::ScreenT],
            fragment_requires: &[CanonicalField::ScreenT],
            vertex_source: "",
            fragment_source: "",
        }
    }

    #[test]
    fn unknown_imports_are_rejected() {
        let linker = ProgramLinker::new();
        let mut desc = test_desc();
        desc.imports = &["Shadow"];
        let err = linker.link(&desc).unwrap_err();
        assert!(matches!(err, LinkError::MissingImport { .. }));
    }

    #[test]
    fn duplicate_imports_are_rejected() {
        let linker = ProgramLinker::new();
        let mut desc = test_desc();
        desc.imports = &["Fog", "Fog"];
        let err = linker.link(&desc).unwrap_err();
        assert!(matches!(err, LinkError::DuplicateImport { .. }));
    }

    #[test]
    fn light_without_camera_is_rejected() {
        let linker = ProgramLinker::new();
        let mut desc = test_desc();
        desc.imports = &["Light"];
        let err = linker.link(&desc).unwrap_err();
        assert_eq!(
            err,
            LinkError::MissingDependency {
                program: "probe".into(),
                import: "Light".into(),
                required: "Camera".into(),
            }
        );
    }

    #[test]
    fn unprovided_fragment_reads_are_rejected() {
        let linker = ProgramLinker::new();
        let mut desc = test_desc();
        desc.fragment_requires = &[CanonicalField::WorldNormal];
        let err = linker.link(&desc).unwrap_err();
        assert!(matches!(err, LinkError::FieldMismatch { .. }));
    }

    #[test]
    fn conflicting_registration_is_rejected() {
        let mut linker = ProgramLinker::new();
        let conflicting = Contract {
            name: "Fog",
            var_name: "u_fog",
            fields: &[ContractField {
                name: "density",
                ty: WgslType::F32,
            }],
            requires: &[],
            functions: "",
        };
        assert_eq!(
            linker.register(conflicting).unwrap_err(),
            LinkError::LayoutMismatch("Fog".into())
        );
        // an identical redefinition is fine
        assert!(linker.register(crate::contract::fog::FOG).is_ok());
    }

    #[test]
    fn imports_are_assigned_group_zero_in_declaration_order() {
        let linker = ProgramLinker::new();
        let program = linker.link(&variant::instanced::INSTANCED).unwrap();
        assert_eq!(program.binding("Camera"), Some((0, 0)));
        assert_eq!(program.binding("Light"), Some((0, 1)));
        assert_eq!(program.binding("Fog"), Some((0, 2)));
    }

    #[test]
    fn sparse_programs_get_their_own_slot_table() {
        let linker = ProgramLinker::new();
        let program = linker.link(&variant::background::BACKGROUND).unwrap();
        assert_eq!(program.binding("Fog"), Some((0, 0)));
        assert_eq!(program.binding("Camera"), None);
    }

    #[test]
    fn locals_are_assigned_their_own_group() {
        let linker = ProgramLinker::new();
        let program = linker.link(&variant::textured::TEXTURED).unwrap();
        assert_eq!(program.binding("s_diffuse"), Some((1, 0)));
        assert_eq!(program.binding("t_diffuse"), Some((1, 1)));
        assert_eq!(program.local_bindings().count(), 2);
    }

    #[test]
    fn uniform_bindings_carry_abi_sizes() {
        let linker = ProgramLinker::new();
        let program = linker.link(&variant::solid::SOLID).unwrap();
        let sizes: Vec<Option<u32>> =
            program.uniform_bindings().map(|b| b.byte_size).collect();
        assert_eq!(sizes, [Some(144), Some(32)]);
    }

    #[test]
    fn emitted_source_declares_contracts_before_stage_code() {
        let linker = ProgramLinker::new();
        let program = linker.link(&variant::solid::SOLID).unwrap();
        let source = program.source();
        let camera_decl = source.find("struct Camera {").unwrap();
        let binding_decl = source.find("var<uniform> u_camera: Camera;").unwrap();
        let vs = source.find("fn vs_main").unwrap();
        assert!(camera_decl < binding_decl);
        assert!(binding_decl < vs);
    }
}
