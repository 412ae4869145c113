//! Link every program and push the emitted WGSL through naga, the same
//! front end wgpu runs at pipeline creation.

use std::collections::HashSet;

use shadelink::contract::{camera, ContractField, WgslType};
use shadelink::variant::{self, background, instanced};
use shadelink::{Contract, LinkError, ProgramLinker};

fn validate(name: &str, source: &str) -> naga::Module {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|err| panic!("{name}: parse failed: {}\n{source}", err.message()));
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .unwrap_or_else(|err| panic!("{name}: validation failed: {err:?}\n{source}"));
    module
}

#[test]
fn every_program_emits_valid_wgsl() {
    let linker = ProgramLinker::new();
    for desc in variant::ALL {
        let program = linker.link(desc).unwrap();
        let module = validate(program.name(), program.source());

        let entry_points: Vec<&str> = module
            .entry_points
            .iter()
            .map(|ep| ep.name.as_str())
            .collect();
        assert!(entry_points.contains(&"vs_main"), "{}", program.name());
        assert!(entry_points.contains(&"fs_main"), "{}", program.name());
    }
}

#[test]
fn binding_slots_are_unique_within_each_program() {
    let linker = ProgramLinker::new();
    for desc in variant::ALL {
        let program = linker.link(desc).unwrap();
        let mut used = HashSet::new();
        for binding in program.bindings() {
            assert!(
                used.insert((binding.group, binding.binding)),
                "{}: slot ({}, {}) assigned twice",
                program.name(),
                binding.group,
                binding.binding
            );
        }
    }
}

#[test]
fn importers_share_one_struct_declaration() {
    let linker = ProgramLinker::new();
    let camera_decl = camera::CAMERA.struct_decl();
    let mut importers = 0;
    for desc in variant::ALL {
        if !desc.imports.contains(&"Camera") {
            continue;
        }
        importers += 1;
        let program = linker.link(desc).unwrap();
        assert!(
            program.source().contains(&camera_decl),
            "{}: camera declaration diverged",
            program.name()
        );
    }
    assert_eq!(importers, 4);
}

#[test]
fn slot_tables_are_per_program() {
    let linker = ProgramLinker::new();
    let dense = linker.link(&instanced::INSTANCED).unwrap();
    let sparse = linker.link(&background::BACKGROUND).unwrap();
    // the same contract lands on different slots in different programs
    assert_eq!(dense.binding("Fog"), Some((0, 2)));
    assert_eq!(sparse.binding("Fog"), Some((0, 0)));
}

#[test]
fn divergent_contract_redefinition_is_rejected() {
    let mut linker = ProgramLinker::new();
    let divergent = Contract {
        name: "Camera",
        var_name: "u_camera",
        fields: &[ContractField {
            name: "view_projection",
            ty: WgslType::Mat4,
        }],
        requires: &[],
        functions: "",
    };
    assert_eq!(
        linker.register(divergent).unwrap_err(),
        LinkError::LayoutMismatch("Camera".into())
    );
}

#[test]
fn uniform_sizes_match_the_wgsl_layout() {
    // the host-side byte sizes the linker reports must agree with what naga
    // derives from the emitted declarations
    let linker = ProgramLinker::new();
    let program = linker.link(&instanced::INSTANCED).unwrap();
    let module = validate(program.name(), program.source());

    for binding in program.uniform_bindings() {
        let (_, ty) = module
            .types
            .iter()
            .find(|(_, ty)| ty.name.as_deref() == Some(binding.name.as_str()))
            .unwrap_or_else(|| panic!("{} not declared", binding.name));
        let naga::TypeInner::Struct { span, .. } = &ty.inner else {
            panic!("{} is not a struct", binding.name);
        };
        assert_eq!(
            Some(span.next_multiple_of(16)),
            binding.byte_size,
            "{}: size mismatch",
            binding.name
        );
    }
}
