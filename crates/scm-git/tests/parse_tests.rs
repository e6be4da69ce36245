use pretty_assertions::assert_eq;
use rstest::rstest;
use scm_git::parse::{
    choose_default_remote, first_line, normalize_tag_name, parse_branches, parse_log_entries,
    parse_ls_tree, parse_rev_list, parse_tag_names, parse_tag_refs,
};
use scm_git::{Error, ObjectId};

const SHA_A: &str = "0123456789abcdef0123456789abcdef01234567";
const SHA_B: &str = "89abcdef0123456789abcdef0123456789abcdef";

fn oid(s: &str) -> ObjectId {
    s.parse().unwrap()
}

#[rstest]
#[case("", None)]
#[case("\n\n", None)]
#[case("abc\n", Some("abc"))]
#[case("  abc  \n\n", Some("abc"))]
fn test_first_line(#[case] output: &str, #[case] expected: Option<&str>) {
    assert_eq!(first_line(output).unwrap(), expected);
}

#[test]
fn test_first_line_rejects_two_lines() {
    let err = first_line("abc\ndef\n").unwrap_err();
    assert!(matches!(err, Error::AmbiguousResult { .. }));
    assert!(err.to_string().starts_with("Result has multiple lines"));
}

#[rstest]
#[case(format!("160000 commit {SHA_A}\tvendor/lib"), true)]
#[case(format!("100644 blob {SHA_A}\tREADME.md"), false)]
#[case(format!("040000 tree {SHA_A}\tsrc"), false)]
fn test_ls_tree_classifies_submodules(#[case] line: String, #[case] submodule: bool) {
    let entries = parse_ls_tree(&line).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].is_submodule(), submodule);
    assert_eq!(entries[0].object, oid(SHA_A));
}

#[test]
fn test_ls_tree_keeps_spaces_in_paths() {
    let entries = parse_ls_tree(&format!("100644 blob {SHA_A}\tdocs/release notes.md\n")).unwrap();
    assert_eq!(entries[0].file, "docs/release notes.md");
    assert_eq!(entries[0].mode, "100644");
    assert_eq!(entries[0].kind, "blob");
}

#[test]
fn test_ls_tree_rejects_short_line() {
    assert!(matches!(
        parse_ls_tree("100644 blob"),
        Err(Error::UnexpectedOutput { what: "ls-tree", .. })
    ));
}

#[test]
fn test_branches_skip_detached_and_aliases() {
    let output = "\
* (HEAD detached at 1234567)
  main
  remotes/origin/HEAD -> origin/main
  remotes/origin/main
  remotes/origin/feature/x
";
    let mut resolved = Vec::new();
    let branches = parse_branches(output, |name| {
        resolved.push(name.to_string());
        Ok(oid(SHA_B))
    })
    .unwrap();

    let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["main", "origin/main", "origin/feature/x"]);
    assert_eq!(
        resolved,
        vec!["main", "remotes/origin/main", "remotes/origin/feature/x"]
    );
    assert!(branches.iter().all(|b| b.sha1 == oid(SHA_B)));
}

#[test]
fn test_branches_propagate_resolution_failure() {
    let result = parse_branches("  main\n", |name| {
        Err(Error::EmptyResult {
            command: format!("git rev-parse {name}"),
        })
    });
    assert!(matches!(result, Err(Error::EmptyResult { .. })));
}

#[test]
fn test_rev_list_preserves_order() {
    let ids = parse_rev_list(&format!("{SHA_B}\n{SHA_A}\n")).unwrap();
    assert_eq!(ids, vec![oid(SHA_B), oid(SHA_A)]);
}

#[test]
fn test_rev_list_rejects_abbreviated_ids() {
    assert!(matches!(
        parse_rev_list("0123456\n"),
        Err(Error::InvalidObjectId { .. })
    ));
}

#[test]
fn test_tag_names_deduplicate() {
    let tags = parse_tag_names("v1\nv2\nv1\n\n");
    assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["v1", "v2"]);
}

#[test]
fn test_tag_refs_use_peeled_target() {
    let output = format!("annotated {SHA_A} {SHA_B}\nlight {SHA_B}\n");
    let tags = parse_tag_refs(&output).unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].name, "annotated");
    assert_eq!(tags[0].sha1, oid(SHA_B));
    assert_eq!(tags[1].sha1, oid(SHA_B));
}

#[test]
fn test_log_entries() {
    let entries = parse_log_entries(&format!("{SHA_A}#1700000000\n'{SHA_B}#0'\n")).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, oid(SHA_A));
    assert_eq!(entries[0].timestamp.timestamp(), 1_700_000_000);
    assert_eq!(entries[1].timestamp.timestamp(), 0);
}

#[test]
fn test_log_entries_reject_missing_separator() {
    assert!(matches!(
        parse_log_entries(SHA_A),
        Err(Error::UnexpectedOutput { what: "log", .. })
    ));
}

#[rstest]
#[case(&["origin", "upstream"], "origin", "origin")]
#[case(&["upstream"], "origin", "upstream")]
#[case(&["fork", "origin"], "origin", "origin")]
fn test_choose_default_remote(#[case] remotes: &[&str], #[case] preferred: &str, #[case] expected: &str) {
    let remotes: Vec<String> = remotes.iter().map(|r| r.to_string()).collect();
    assert_eq!(choose_default_remote(&remotes, preferred).unwrap(), expected);
}

#[test]
fn test_choose_default_remote_empty() {
    assert!(matches!(choose_default_remote(&[], "origin"), Err(Error::NoRemotes)));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_normalized_tag_names_have_no_spaces(name in "[a-z0-9 ._-]{1,32}") {
            let normalized = normalize_tag_name(&name);
            prop_assert!(!normalized.contains(' '));
            prop_assert_eq!(normalized.len(), name.len());
            prop_assert_eq!(normalize_tag_name(&normalized), normalized.clone());
        }

        #[test]
        fn test_first_line_accepts_any_single_line(line in "[a-zA-Z0-9/._-]{1,40}", pad in 0usize..3) {
            let output = format!("{}{}\n", "\n".repeat(pad), line);
            prop_assert_eq!(first_line(&output).unwrap(), Some(line.as_str()));
        }
    }
}
