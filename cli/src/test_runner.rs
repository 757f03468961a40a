use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use sfc::block::Block;
use sfc::pad::PadMode;
use sfc::parser::ParseWarning;
use sfc::position::LineIndex;
use sfc::{MapOptions, ParseOptions, ParseResult};

const FIXTURE_SUFFIX: &str = ".test.vue";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

/// Expectations for one block, picked by type and position among blocks of
/// that type.
#[derive(Debug, Deserialize)]
pub struct ExpectedBlock {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub index: usize,

    /// Exact content.
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub lang: Option<String>,

    #[serde(default)]
    pub src: Option<String>,

    #[serde(default)]
    pub scoped: Option<bool>,

    /// 1-based line of the first content character.
    #[serde(default)]
    pub start_line: Option<usize>,
}

/// A source-map lookup that must land on `original_line`.
#[derive(Debug, Deserialize)]
pub struct ExpectedMapping {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub index: usize,

    pub line: usize,

    #[serde(default = "default_column")]
    pub column: usize,

    pub original_line: usize,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Padding mode: "none", "line" or "space".
    #[serde(default)]
    pub pad: Option<String>,

    /// Generate source maps, named after the fixture file.
    #[serde(default)]
    pub map: bool,

    /// Expected template content (trimmed comparison). "" expects no template.
    #[serde(default)]
    pub expect_template: Option<String>,

    /// Expected script content (trimmed comparison). "" expects no script.
    #[serde(default)]
    pub expect_script: Option<String>,

    /// Expected style contents in order (trimmed comparison).
    #[serde(default)]
    pub expect_styles: Option<Vec<String>>,

    /// Expected custom block tag names in order.
    #[serde(default)]
    pub expect_custom_blocks: Option<Vec<String>>,

    #[serde(default)]
    pub expect_blocks: Vec<ExpectedBlock>,

    #[serde(default)]
    pub expect_mappings: Vec<ExpectedMapping>,

    /// Expected warnings. If present (even empty), warning count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

fn default_column() -> usize {
    1
}

/// Parse a `.test.vue` file into its TOML config and component source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    if !content.starts_with("---") {
        return Err("missing opening --- frontmatter delimiter".into());
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };
    let description = config.description.clone();

    let pad = match config.pad.as_deref().map(str::parse::<PadMode>).transpose() {
        Ok(pad) => pad.unwrap_or_default(),
        Err(e) => return fail(description, format!("frontmatter error: {}", e)),
    };
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let options = ParseOptions {
        pad,
        map: config.map.then(|| MapOptions::new(filename)),
    };

    let result = sfc::parse(source, &options);

    match check_expectations(source, &config, &result) {
        Some(reason) => fail(description, reason),
        None => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
    }
}

/// Check every expectation in order. Returns `Some(reason)` on the first mismatch.
fn check_expectations(source: &str, config: &TestConfig, result: &ParseResult) -> Option<String> {
    if let Some(expected) = &config.expect_template {
        if let Some(reason) = check_singleton("template", result.template.as_ref(), expected) {
            return Some(reason);
        }
    }

    if let Some(expected) = &config.expect_script {
        if let Some(reason) = check_singleton("script", result.script.as_ref(), expected) {
            return Some(reason);
        }
    }

    if let Some(expected) = &config.expect_styles {
        let actual: Vec<&str> = result.styles.iter().map(|s| s.content.trim()).collect();
        let expected: Vec<&str> = expected.iter().map(|s| s.trim()).collect();
        if actual != expected {
            return Some(format!(
                "styles mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            ));
        }
    }

    if let Some(expected) = &config.expect_custom_blocks {
        let actual: Vec<&str> = result.custom_blocks.iter().map(|b| b.kind.as_str()).collect();
        if actual != *expected {
            return Some(format!(
                "custom blocks mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            ));
        }
    }

    for expected in &config.expect_blocks {
        if let Some(reason) = check_block(result, expected) {
            return Some(reason);
        }
    }

    for expected in &config.expect_mappings {
        if let Some(reason) = check_mapping(result, expected) {
            return Some(reason);
        }
    }

    if let Some(expected_warnings) = &config.expect_warnings {
        if let Some(reason) = check_warnings(source, &result.warnings, expected_warnings) {
            return Some(reason);
        }
    }

    None
}

fn check_singleton(kind: &str, block: Option<&Block>, expected: &str) -> Option<String> {
    let expected = expected.trim();
    match block {
        None if expected.is_empty() => None,
        None => Some(format!("expected a <{}> block, found none", kind)),
        Some(block) if block.content.trim() == expected => None,
        Some(block) => Some(format!(
            "{} mismatch\n  expected: {:?}\n  actual:   {:?}",
            kind,
            expected,
            block.content.trim()
        )),
    }
}

fn find_block<'r>(result: &'r ParseResult, kind: &str, index: usize) -> Option<&'r Block> {
    result
        .blocks()
        .into_iter()
        .filter(|b| b.kind.as_str() == kind)
        .nth(index)
}

fn check_block(result: &ParseResult, expected: &ExpectedBlock) -> Option<String> {
    let label = format!("<{}>[{}]", expected.kind, expected.index);
    let Some(block) = find_block(result, &expected.kind, expected.index) else {
        return Some(format!("{}: no such block", label));
    };

    if let Some(content) = &expected.content {
        if block.content != *content {
            return Some(format!(
                "{}: content mismatch\n  expected: {:?}\n  actual:   {:?}",
                label, content, block.content
            ));
        }
    }

    if expected.lang.is_some() && block.lang != expected.lang {
        return Some(format!("{}: expected lang {:?}, got {:?}", label, expected.lang, block.lang));
    }

    if expected.src.is_some() && block.src != expected.src {
        return Some(format!("{}: expected src {:?}, got {:?}", label, expected.src, block.src));
    }

    if let Some(scoped) = expected.scoped {
        if block.scoped != scoped {
            return Some(format!("{}: expected scoped = {}", label, scoped));
        }
    }

    if let Some(line) = expected.start_line {
        if block.start.line != line {
            return Some(format!(
                "{}: expected to start on line {}, starts on line {}",
                label, line, block.start.line
            ));
        }
    }

    None
}

fn check_mapping(result: &ParseResult, expected: &ExpectedMapping) -> Option<String> {
    let label = format!(
        "<{}>[{}] map {}:{}",
        expected.kind, expected.index, expected.line, expected.column
    );
    let Some(block) = find_block(result, &expected.kind, expected.index) else {
        return Some(format!("{}: no such block", label));
    };
    let Some(map) = &block.map else {
        return Some(format!("{}: block has no source map (set `map = true`)", label));
    };

    match map.original_position_for(expected.line, expected.column) {
        Some(pos) if pos.line == expected.original_line => None,
        Some(pos) => Some(format!(
            "{}: expected original line {}, got {}",
            label, expected.original_line, pos.line
        )),
        None => Some(format!("{}: no mapping", label)),
    }
}

/// Check that actual warnings match expectations. Returns `Some(reason)` on mismatch.
fn check_warnings(source: &str, warnings: &[ParseWarning], expected: &[ExpectedWarning]) -> Option<String> {
    if warnings.len() != expected.len() {
        let actual_msgs: Vec<String> = warnings.iter().map(|w| format!("  - {}", w)).collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            warnings.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    let index = LineIndex::new(source);
    for (i, (actual, expected)) in warnings.iter().zip(expected.iter()).enumerate() {
        if !actual.message.contains(&expected.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, actual
            ));
        }

        if let Some(expected_line) = expected.line {
            let actual_line = index.position(actual.span.start).line;
            if actual_line != expected_line {
                return Some(format!(
                    "warning[{}]: expected on line {}, but span is on line {}",
                    i, expected_line, actual_line
                ));
            }
        }
    }

    None
}

/// Discover fixture files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(FIXTURE_SUFFIX))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn paint(s: &str, code: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, s)
    }
}

fn label_for<'p>(result: &'p TestResult) -> &'p str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_suffix(FIXTURE_SUFFIX))
            .unwrap_or("?")
    })
}

/// Select the fixture files to run, grouped by category.
fn select_tests(path: &Path, categories: &[String]) -> Result<BTreeMap<String, Vec<PathBuf>>, String> {
    if path.is_file() {
        return Ok(BTreeMap::from([(String::new(), vec![path.to_path_buf()])]));
    }

    let all_categories = discover_categorized(path);
    if all_categories.is_empty() {
        return Err(format!("no {} files found in {}", FIXTURE_SUFFIX, path.display()));
    }
    if categories.is_empty() {
        return Ok(all_categories);
    }

    let mut filtered = BTreeMap::new();
    for requested in categories {
        let req = requested.trim_matches('/');
        let before = filtered.len();
        for (cat, files) in &all_categories {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                filtered.insert(cat.clone(), files.clone());
            }
        }
        if filtered.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all_categories
                    .keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    if filtered.is_empty() {
        return Err("no matching categories found".into());
    }
    Ok(filtered)
}

/// Run all fixture files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let selected = match select_tests(path, categories) {
        Ok(selected) => selected,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &selected {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", paint(header, "1", no_color));
        }

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), label_for(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), label_for(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", paint("ok", "32", no_color), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
    }

    #[test]
    fn bundled_fixtures_pass() {
        let dir = fixtures_dir();
        for files in discover_categorized(&dir).values() {
            for file in files {
                let result = run_single_test(file);
                if let TestOutcome::Fail(reason) = result.outcome {
                    panic!("{} failed:\n{}", file.display(), reason);
                }
            }
        }
        assert_eq!(run_tests(&dir, true, &[]), 0);
    }

    #[test]
    fn fixtures_are_grouped_by_folder() {
        let categories = discover_categorized(&fixtures_dir());
        assert!(categories.contains_key(""));
        assert!(categories.contains_key("padding"));
    }

    #[test]
    fn category_filter() {
        let dir = fixtures_dir();
        let selected = select_tests(&dir, &["padding".to_string()]).unwrap();
        assert_eq!(selected.keys().collect::<Vec<_>>(), ["padding"]);
        assert!(select_tests(&dir, &["nope".to_string()]).is_err());
    }

    #[test]
    fn failing_fixture_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrong.test.vue");
        std::fs::write(
            &path,
            "---\nexpect_script = \"nope\"\n---\n<script>export default {}</script>\n",
        )
        .unwrap();

        let result = run_single_test(&path);
        match result.outcome {
            TestOutcome::Fail(reason) => assert!(reason.contains("script mismatch"), "{}", reason),
            TestOutcome::Pass => panic!("expected failure"),
        }
        assert_eq!(run_tests(dir.path(), true, &[]), 1);
    }

    #[test]
    fn frontmatter_is_required() {
        assert!(parse_test_file("<template></template>").is_err());
        assert!(parse_test_file("---\npad = \"line\"\n<template>").is_err());

        let (config, source) = parse_test_file("---\npad = \"space\"\nmap = true\n---\n<style></style>").unwrap();
        assert_eq!(config.pad.as_deref(), Some("space"));
        assert!(config.map);
        assert_eq!(source, "<style></style>");
    }

    #[test]
    fn bad_pad_mode_fails_the_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pad.test.vue");
        std::fs::write(&path, "---\npad = \"sideways\"\n---\n<script></script>\n").unwrap();

        match run_single_test(&path).outcome {
            TestOutcome::Fail(reason) => assert!(reason.contains("unknown pad mode")),
            TestOutcome::Pass => panic!("expected failure"),
        }
    }
}
