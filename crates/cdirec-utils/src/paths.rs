//! Filesystem layout of a reconstruction run
//!
//! ```text
//! <parent_dir>/
//!   results_AI/              scratch seed artifacts from the AI guess generator
//!   results_phasing[_<x>]/   saved reconstruction (derived from config_rec[_<x>])
//! ```

use std::path::{Path, PathBuf};

/// Token in config file names that marks a reconstruction config.
pub const CONFIG_PREFIX_TOKEN: &str = "config_rec";

/// Token that replaces [`CONFIG_PREFIX_TOKEN`] in the derived results directory.
pub const RESULTS_PREFIX_TOKEN: &str = "results_phasing";

/// Name of the AI guess scratch directory under the parent directory.
pub const AI_GUESS_DIR_NAME: &str = "results_AI";

/// Results directory name for a config file name.
///
/// Every occurrence of `config_rec` becomes `results_phasing`; a name without
/// the token is returned unchanged.
#[must_use]
pub fn results_dir_name(config_file_name: &str) -> String {
    config_file_name.replace(CONFIG_PREFIX_TOKEN, RESULTS_PREFIX_TOKEN)
}

/// Save directory derived from the config path, rooted at `parent_dir`.
#[must_use]
pub fn derive_save_dir(config_path: &Path, parent_dir: &Path) -> PathBuf {
    let file_name = config_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    parent_dir.join(results_dir_name(&file_name))
}

/// Scratch directory for AI guess artifacts.
#[must_use]
pub fn ai_guess_dir(parent_dir: &Path) -> PathBuf {
    parent_dir.join(AI_GUESS_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_token_is_replaced() {
        let save_dir = derive_save_dir(
            Path::new("/exp/scan_54/conf/config_rec"),
            Path::new("/exp/scan_54"),
        );
        assert_eq!(save_dir, PathBuf::from("/exp/scan_54/results_phasing"));
    }

    #[test]
    fn test_suffix_survives_replacement() {
        let save_dir = derive_save_dir(Path::new("conf/config_rec_ga"), Path::new("/exp"));
        assert_eq!(save_dir, PathBuf::from("/exp/results_phasing_ga"));
    }

    #[test]
    fn test_name_without_token_is_unchanged() {
        let save_dir = derive_save_dir(Path::new("conf/my_run.toml"), Path::new("/exp"));
        assert_eq!(save_dir, PathBuf::from("/exp/my_run.toml"));
    }

    #[test]
    fn test_only_file_name_is_rewritten() {
        let save_dir = derive_save_dir(Path::new("/config_rec/dir/config_rec"), Path::new("/exp"));
        assert_eq!(save_dir, PathBuf::from("/exp/results_phasing"));
    }

    #[test]
    fn test_ai_guess_dir() {
        assert_eq!(
            ai_guess_dir(Path::new("/exp")),
            PathBuf::from("/exp/results_AI")
        );
    }

    proptest! {
        #[test]
        fn prop_derivation_is_reversible(suffix in "[a-z0-9_]{0,12}") {
            prop_assume!(!suffix.contains(CONFIG_PREFIX_TOKEN));
            let name = format!("{CONFIG_PREFIX_TOKEN}{suffix}");
            let derived = results_dir_name(&name);
            prop_assert_eq!(&derived, &format!("{RESULTS_PREFIX_TOKEN}{suffix}"));
            prop_assert_eq!(derived.replace(RESULTS_PREFIX_TOKEN, CONFIG_PREFIX_TOKEN), name);
        }

        #[test]
        fn prop_names_without_token_pass_through(name in "[a-z]{1,8}\\.toml") {
            prop_assume!(!name.contains(CONFIG_PREFIX_TOKEN));
            prop_assert_eq!(results_dir_name(&name), name);
        }
    }
}
