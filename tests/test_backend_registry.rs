//! Backend selection properties

use cdirec::{BackendError, BackendKind, BackendRegistry, Dims, LibraryName, SubBackend};
use proptest::prelude::*;

fn library_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("af"),
        Just("cpu"),
        Just("opencl"),
        Just("cuda"),
        Just("cp"),
        Just("np"),
    ]
}

#[test]
fn cuda_layers_on_af_variant_for_rank() {
    let registry = BackendRegistry::new();
    for (ndim, dims) in [(1, Dims::One), (2, Dims::Two), (3, Dims::Three)] {
        let handle = registry.select("cuda", ndim).unwrap();
        assert_eq!(
            handle.kind(),
            BackendKind::Af {
                dims,
                sub: Some(SubBackend::Cuda)
            }
        );
        assert_eq!(handle.library(), LibraryName::Cuda);
    }
}

#[test]
fn separate_registries_agree() {
    let a = BackendRegistry::new().select("opencl", 3).unwrap();
    let b = BackendRegistry::new().select("opencl", 3).unwrap();
    assert_eq!(a, b);
}

proptest! {
    #[test]
    fn prop_selection_is_deterministic(name in library_name(), ndim in 0usize..8) {
        let registry = BackendRegistry::new();
        let first = registry.select(name, ndim);
        let second = registry.select(name, ndim);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "selection changed between calls"),
        }
    }

    #[test]
    fn prop_af_family_needs_rank_one_to_three(
        name in prop_oneof![Just("af"), Just("cpu"), Just("opencl"), Just("cuda")],
        ndim in 0usize..10,
    ) {
        let result = BackendRegistry::new().select(name, ndim);
        if (1..=3).contains(&ndim) {
            prop_assert!(result.is_ok());
        } else {
            let is_unsupported = matches!(
                result,
                Err(BackendError::UnsupportedDimensionality { .. })
            );
            prop_assert!(is_unsupported);
        }
    }

    #[test]
    fn prop_unknown_names_are_rejected(name in "[a-z]{1,8}") {
        prop_assume!(!["af", "cpu", "opencl", "cuda", "cp", "np"].contains(&name.as_str()));
        let is_unknown = matches!(
            BackendRegistry::new().select(&name, 2),
            Err(BackendError::UnknownBackend { .. })
        );
        prop_assert!(is_unknown);
    }
}
