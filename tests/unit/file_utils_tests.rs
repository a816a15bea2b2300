/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::{Path, PathBuf};

use ttml2srt::file_utils::{FileManager, OutputTemplate};
use crate::common;

/// Test file existence checks
#[test]
fn test_file_exists_withFileAndDirectory_shouldOnlyAcceptFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.ttml", "<tt/>")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.ttml")));
    Ok(())
}

/// Test writing creates parent directories
#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("x/y/z.txt");

    FileManager::write_to_file(&path, "content")?;
    assert_eq!(FileManager::read_to_string(&path)?, "content");
    Ok(())
}

/// Single level patterns only match the first directory level
#[test]
fn test_expand_glob_withStar_shouldMatchOneLevelSorted() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "b.ttml", "")?;
    common::create_test_file(root, "a.ttml", "")?;
    common::create_test_file(root, "c.xml", "")?;
    common::create_test_file(root, "sub/d.ttml", "")?;

    let pattern = format!("{}/*.ttml", root.display());
    let found = FileManager::expand_glob(&pattern)?;

    assert_eq!(found, vec![root.join("a.ttml"), root.join("b.ttml")]);
    Ok(())
}

/// Recursive patterns descend into subdirectories
#[test]
fn test_expand_glob_withDoubleStar_shouldMatchRecursively() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "a.ttml", "")?;
    common::create_test_file(root, "s1/b.ttml", "")?;
    common::create_test_file(root, "s1/s2/c.ttml", "")?;
    common::create_test_file(root, "s1/s2/c.srt", "")?;

    let pattern = format!("{}/**/*.ttml", root.display());
    let found = FileManager::expand_glob(&pattern)?;

    assert_eq!(
        found,
        vec![root.join("a.ttml"), root.join("s1/b.ttml"), root.join("s1/s2/c.ttml")]
    );
    Ok(())
}

/// Directories never match, even if their name does
#[test]
fn test_expand_glob_withMatchingDirectory_shouldSkipIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("folder.ttml"))?;
    common::create_test_file(root, "ep1.ttml", "")?;

    let found = FileManager::expand_glob(&format!("{}/*.ttml", root.display()))?;
    assert_eq!(found, vec![root.join("ep1.ttml")]);

    let none = FileManager::expand_glob(&format!("{}/*.none", root.display()))?;
    assert!(none.is_empty());
    Ok(())
}

/// Test output template rendering
#[test]
fn test_output_template_render_withDefaultFormat_shouldUseBasename() -> Result<()> {
    let template = OutputTemplate::parse("{filename}.srt")?;
    assert_eq!(template.render(Path::new("/subs/movie.en.ttml"))?, PathBuf::from("movie.en.srt"));

    let template = OutputTemplate::parse("{dir}/{filename}{ext}.srt")?;
    assert_eq!(
        template.render(Path::new("/subs/ep1.xml"))?,
        PathBuf::from("/subs/ep1.xml.srt")
    );
    Ok(())
}

/// Test output template validation
#[test]
fn test_output_template_parse_withBadTemplates_shouldFail() {
    assert!(OutputTemplate::parse("{basename}.srt").is_err());
    assert!(OutputTemplate::parse("{filename.srt").is_err());
    assert!(OutputTemplate::parse("").is_err());
}

/// Hidden files and directories need an explicit dot in the pattern
#[test]
fn test_expand_glob_withHiddenEntries_shouldSkipThemUnlessNamed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "ep1.ttml", "")?;
    common::create_test_file(root, ".ep1.ttml", "")?;
    common::create_test_file(root, ".cache/ep2.ttml", "")?;
    common::create_test_file(root, "s1/.old/ep3.ttml", "")?;

    let flat = FileManager::expand_glob(&format!("{}/*.ttml", root.display()))?;
    assert_eq!(flat, vec![root.join("ep1.ttml")]);

    let recursive = FileManager::expand_glob(&format!("{}/**/*.ttml", root.display()))?;
    assert_eq!(recursive, vec![root.join("ep1.ttml")]);

    let hidden = FileManager::expand_glob(&format!("{}/.*.ttml", root.display()))?;
    assert_eq!(hidden, vec![root.join(".ep1.ttml")]);

    let named = FileManager::expand_glob(&format!("{}/.cache/*.ttml", root.display()))?;
    assert_eq!(named, vec![root.join(".cache/ep2.ttml")]);
    Ok(())
}
