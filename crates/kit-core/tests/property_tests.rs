use std::collections::HashSet;
use std::fs;

use kit_core::ConflictStrategy;
use kit_core::conflict::{plan, rename_target};
use proptest::prelude::*;
use tempfile::TempDir;

proptest! {
    #[test]
    fn rename_never_collides(stem in "[a-z][a-z0-9_]{0,11}", existing in 0usize..6) {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join(format!("{stem}.md"));
        fs::write(&target, "original").unwrap();
        for n in 1..=existing {
            fs::write(dir.path().join(format!("{stem}-{n}.md")), "taken").unwrap();
        }

        let mut seen = HashSet::new();
        for _ in 0..3 {
            let info = plan(&stem, &target, ConflictStrategy::Rename).unwrap();
            let new_path = info.new_path.unwrap();
            prop_assert!(!new_path.exists());
            prop_assert_eq!(new_path.parent(), target.parent());
            prop_assert!(seen.insert(new_path.clone()));
            fs::write(&new_path, "renamed").unwrap();
        }
        prop_assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn rename_keeps_the_extension(stem in "[a-z]{1,8}", ext in "[a-z]{1,4}") {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join(format!("{stem}.{ext}"));
        let renamed = rename_target(&target);
        prop_assert_eq!(renamed.extension().and_then(|e| e.to_str()), Some(ext.as_str()));
        let expected = format!("{stem}-1");
        prop_assert_eq!(renamed.file_stem().and_then(|s| s.to_str()), Some(expected.as_str()));
    }

    #[test]
    fn strategy_parse_is_case_insensitive(index in 0usize..3, upper in any::<bool>()) {
        let name = ["skip", "rename", "overwrite"][index];
        let input = if upper { name.to_uppercase() } else { name.to_string() };
        let parsed: ConflictStrategy = input.parse().unwrap();
        prop_assert_eq!(parsed.as_str(), name);
    }
}
