//! Property-based tests for locator parsing.
//!
//! These tests use proptest to generate random inputs and verify that
//! the parser invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::components::Transport;
    use crate::locator::parse;
    use crate::options::Options;
    use crate::refs::{classify, Revision};
    use proptest::prelude::*;

    /// Strategy producing locators that follow the grammar.
    fn well_formed_locator() -> impl Strategy<Value = String> {
        (
            prop_oneof![
                Just("git+https"),
                Just("git+ssh"),
                Just("git+http"),
                Just("https"),
                Just("ssh"),
            ],
            // Labels start with a letter so no host reads as an IPv4 address
            "[a-z][a-z0-9-]{0,8}(\\.[a-z][a-z0-9-]{0,6}){0,2}",
            "(/[A-Za-z0-9_.-]{1,10}){0,3}",
            proptest::option::of("[A-Za-z0-9_./-]{1,40}"),
            proptest::option::of("[A-Za-z0-9_./%-]{0,20}"),
        )
            .prop_map(|(scheme, host, path, r, frag)| {
                let mut s = format!("{}://{}{}", scheme, host, path);
                if let Some(r) = r {
                    s.push('@');
                    s.push_str(&r);
                }
                if let Some(f) = frag {
                    s.push('#');
                    s.push_str(&f);
                }
                s
            })
    }

    proptest! {
        /// Property: parsing never panics, whatever the input
        #[test]
        fn parse_never_panics(input in ".*", ref_is_branch in any::<bool>()) {
            let opts = Options::default().with_ref_as_branch(ref_is_branch);
            let _ = parse(&input, &opts);
        }

        /// Property: well formed locators parse and carry at most one revision kind
        #[test]
        fn well_formed_locators_parse(input in well_formed_locator(), ref_is_branch in any::<bool>()) {
            let opts = Options::default().with_ref_as_branch(ref_is_branch);
            let parsed = parse(&input, &opts);
            // Fragments with stray '%' may be rejected; everything else must parse
            if !input.contains('%') {
                prop_assert!(parsed.is_ok(), "failed to parse {:?}: {:?}", input, parsed);
            }
            if let Ok(c) = parsed {
                let set = [c.commit(), c.tag(), c.branch()]
                    .iter()
                    .filter(|s| !s.is_empty())
                    .count();
                prop_assert!(set <= 1);
                if c.ref_string.is_empty() {
                    prop_assert_eq!(c.revision, None);
                }
            }
        }

        /// Property: parsing is deterministic
        #[test]
        fn parse_is_deterministic(input in ".*") {
            let opts = Options::default();
            prop_assert_eq!(parse(&input, &opts), parse(&input, &opts));
        }

        /// Property: the raw ref token is preserved whenever a revision is classified
        #[test]
        fn ref_string_is_preserved(r in "[A-Za-z0-9_.-]{1,40}") {
            let input = format!("git+https://github.com/example/test@{}", r);
            let c = parse(&input, &Options::default()).unwrap();
            prop_assert_eq!(&c.ref_string, &r);
            prop_assert_eq!(c.revision, classify(&r, false));
        }

        /// Property: lowercase hex of length 7 or 40 is always a commit
        #[test]
        fn hex_tokens_are_commits(sha in "[a-f0-9]{40}", short in "[a-f0-9]{7}", b in any::<bool>()) {
            prop_assert_eq!(classify(&sha, b), Some(Revision::Commit(sha.clone())));
            prop_assert_eq!(classify(&short, b), Some(Revision::Commit(short.clone())));
        }

        /// Property: file locators never carry a hostname
        #[test]
        fn file_locators_have_no_host(path in "(/[a-z0-9]{1,8}){1,4}", host in "[a-z]{0,8}") {
            let c = parse(&format!("git+file://{}{}", host, path), &Options::default()).unwrap();
            prop_assert_eq!(c.transport, Transport::File);
            prop_assert!(c.hostname.is_empty());
            prop_assert!(!c.repo_path.is_empty());
        }
    }
}
