use kit_fs::checksum::{self, Algorithm};
use kit_fs::NormalizedPath;
use proptest::prelude::*;

fn algorithm() -> impl Strategy<Value = Algorithm> {
    prop_oneof![
        Just(Algorithm::Sha256),
        Just(Algorithm::Sha1),
        Just(Algorithm::Md5),
    ]
}

proptest! {
    #[test]
    fn checksum_verifies_its_own_content(
        content in proptest::collection::vec(any::<u8>(), 0..2048),
        alg in algorithm(),
    ) {
        let digest = checksum::calculate(&content, alg);
        prop_assert!(checksum::verify(&content, &digest, alg));
        prop_assert_eq!(digest.len(), alg.hex_len());
        prop_assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn single_byte_mutation_breaks_verification(
        content in proptest::collection::vec(any::<u8>(), 1..2048),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
        alg in algorithm(),
    ) {
        let digest = checksum::calculate(&content, alg);
        let mut mutated = content.clone();
        let i = index.index(mutated.len());
        mutated[i] ^= flip;
        prop_assert!(!checksum::verify(&mutated, &digest, alg));
    }

    #[test]
    fn normalized_paths_never_contain_backslashes(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        prop_assert!(!path.as_str().contains('\\'));
    }
}
