//! Property tests for submodule name derivation

use git_nest::classifier::sanitize_name;
use proptest::prelude::*;

proptest! {
    #[test]
    fn sanitized_names_use_only_safe_characters(name in "\\PC{0,40}") {
        let sanitized = sanitize_name(&name);
        prop_assert!(sanitized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
    }

    #[test]
    fn sanitizing_is_idempotent(name in "\\PC{0,40}") {
        let once = sanitize_name(&name);
        prop_assert_eq!(sanitize_name(&once), once);
    }

    #[test]
    fn spaces_become_underscores(left in "[a-z]{1,8}", right in "[a-z]{1,8}") {
        prop_assert_eq!(
            sanitize_name(&format!("{left} {right}")),
            format!("{left}_{right}")
        );
    }

    #[test]
    fn safe_names_are_unchanged(name in "[A-Za-z0-9._-]{1,30}") {
        prop_assert_eq!(sanitize_name(&name), name);
    }
}
