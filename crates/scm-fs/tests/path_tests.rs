use rstest::rstest;
use scm_fs::NormalizedPath;

#[test]
fn test_backslashes_normalized() {
    let path = NormalizedPath::new("C:\\work\\repo");
    assert_eq!(path.as_str(), "C:/work/repo");
}

#[rstest]
#[case("/srv/repo", "libs/foo", "/srv/repo/libs/foo")]
#[case("/srv/repo/", "libs/foo", "/srv/repo/libs/foo")]
#[case("/srv/repo", "/libs/foo", "/srv/repo/libs/foo")]
#[case("", ".git", "/.git")]
#[case("relative", "sub\\dir", "relative/sub/dir")]
fn test_join(#[case] base: &str, #[case] segment: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(base).join(segment).as_str(), expected);
}

#[test]
fn test_file_name() {
    assert_eq!(NormalizedPath::new("/srv/super/libs").file_name(), Some("libs"));
    assert_eq!(NormalizedPath::new("/srv/super/libs/").file_name(), Some("libs"));
    assert_eq!(NormalizedPath::new("/").file_name(), None);
}

#[test]
fn test_extension() {
    assert_eq!(NormalizedPath::new("settings.toml").extension(), Some("toml"));
    assert_eq!(NormalizedPath::new("dir/.gitmodules").extension(), None);
    assert_eq!(NormalizedPath::new("Makefile").extension(), None);
}
