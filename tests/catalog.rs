// tests/catalog.rs

//! Integration tests for catalog loading and library selection.

mod common;

use common::{archive_dir, make_tarball, test_config};
use getlibs::hooks::install_hooks;
use getlibs::{CancelToken, Catalog, Error, build_all};
use std::fs;

#[test]
fn test_unknown_library_rejected_before_any_work() {
    let temp = tempfile::tempdir().unwrap();
    let catalog = Catalog::builtin().unwrap();

    let result = catalog.select(&["gtest", "not-a-library"]);

    match result {
        Err(Error::UnknownRecipe { name, available }) => {
            assert_eq!(name, "not-a-library");
            assert!(available.contains("gtest"));
            assert!(available.contains("boost"));
        }
        other => panic!("expected UnknownRecipe, got {:?}", other),
    }
    // Nothing was created anywhere
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_builtin_catalog_recipes() {
    let catalog = Catalog::builtin().unwrap();

    let gtest = catalog.get("gtest").unwrap();
    assert_eq!(gtest.check, "lib/libgtest.a");
    assert_eq!(gtest.globs.len(), 6);

    let gnump = catalog.get("gnump").unwrap();
    assert!(gnump.cmds.iter().any(|c| c.contains("--prefix=TARGET")));

    let cppunit = catalog.get("cppunit").unwrap();
    assert!(cppunit.url.starts_with("git://"));

    let boost = catalog.select(&["boost"]).unwrap();
    assert_eq!(boost.len(), 1);
    assert!(catalog.hooks().iter().any(|h| h.applies_to(["boost"])));
    assert!(!catalog.hooks().iter().any(|h| h.applies_to(["gtest"])));
}

#[test]
fn test_custom_catalog_builds_from_file() {
    let temp = tempfile::tempdir().unwrap();
    let url = make_tarball(
        &archive_dir(&temp),
        "tiny-0.1",
        &[("tiny.h", "#define TINY 1\n")],
    );
    let target = temp.path().join("libs");
    let hook_path = temp.path().join("tiny.cfg");

    let catalog_path = temp.path().join("libs.toml");
    fs::write(
        &catalog_path,
        format!(
            r#"
[[hooks]]
path = "{hook}"
contents = "tiny = on"
recipes = ["tiny"]

[[recipe]]
name = "tiny"
description = "Header-only test library"
check = "include/tiny.h"
url = "{url}"
cmds = ["test -f {hook}"]
globs = [["*.h", "include/"]]
"#,
            hook = hook_path.display(),
            url = url
        ),
    )
    .unwrap();

    let catalog = Catalog::load(&catalog_path).unwrap();
    let recipes = catalog.select(&["tiny", "tiny"]).unwrap();
    assert_eq!(recipes.len(), 1);

    let guards = install_hooks(catalog.hooks(), &["tiny"]).unwrap();
    assert_eq!(fs::read_to_string(&hook_path).unwrap(), "tiny = on");

    let config = test_config(&temp).with_strict(true);
    let report = build_all(&recipes, &target, &config, CancelToken::new()).unwrap();

    drop(guards);
    assert!(!hook_path.exists());
    assert_eq!(report.installed(), 1);
    assert_eq!(
        fs::read_to_string(target.join("include/tiny.h")).unwrap(),
        "#define TINY 1\n"
    );
}

#[test]
fn test_invalid_catalog_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bad.toml");

    fs::write(
        &path,
        r#"
[[recipe]]
name = "dup"
check = "lib/a"
url = "http://example.com/a.tar.gz"

[[recipe]]
name = "dup"
check = "lib/b"
url = "http://example.com/b.tar.gz"
"#,
    )
    .unwrap();
    assert!(matches!(Catalog::load(&path), Err(Error::CatalogError(_))));

    assert!(matches!(
        Catalog::load(&temp.path().join("missing.toml")),
        Err(Error::CatalogError(_))
    ));
}
