use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn catalog_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("catalog");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let photos = root.join("photos");
    fs::create_dir_all(&photos).unwrap();
    fs::write(photos.join("jacket.jpg"), b"jacket photo bytes").unwrap();
    fs::write(photos.join("phone.jpg"), b"phone photo bytes").unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/catalog.sqlite"

[images]
dir = "{root}/images"

[server]
bind = "127.0.0.1:9000"

[log]
level = "warn"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("catalog.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_catalog(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = catalog_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run catalog binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn photo(config_path: &Path, name: &str) -> String {
    let root = config_path.parent().unwrap().parent().unwrap();
    root.join("photos").join(name).display().to_string()
}

fn add(config_path: &Path, name: &str, category: &str, image: &str) -> String {
    let image = photo(config_path, image);
    let (stdout, stderr, success) =
        run_catalog(config_path, &["add", name, category, "--image", &image]);
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    stdout
}

#[test]
fn test_init_creates_database_and_placeholder() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_catalog(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/catalog.sqlite").exists());
    assert!(tmp.path().join("images/default.jpg").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_catalog(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_catalog(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_add_then_list() {
    let (_tmp, config_path) = setup_test_env();
    run_catalog(&config_path, &["init"]);

    let stdout = add(&config_path, "jacket", "fashion", "jacket.jpg");
    assert!(stdout.contains("item received: jacket"));

    let (stdout, _, success) = run_catalog(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("jacket"));
    assert!(stdout.contains("fashion"));
    assert!(stdout.contains("(1 items)"));
}

#[test]
fn test_list_empty_catalog_succeeds() {
    let (_tmp, config_path) = setup_test_env();
    run_catalog(&config_path, &["init"]);

    let (stdout, _, success) = run_catalog(&config_path, &["list"]);
    assert!(success, "listing an empty catalog is not an error");
    assert!(stdout.contains("No items."));
}

#[test]
fn test_same_image_stored_once() {
    let (tmp, config_path) = setup_test_env();
    run_catalog(&config_path, &["init"]);

    add(&config_path, "jacket", "fashion", "jacket.jpg");
    add(&config_path, "jacket again", "fashion", "jacket.jpg");

    let stored: Vec<_> = fs::read_dir(tmp.path().join("images"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n != "default.jpg")
        .collect();
    assert_eq!(stored.len(), 1, "stored files: {:?}", stored);
    assert_eq!(stored[0].len(), 64 + ".jpg".len());
}

#[test]
fn test_get_by_identifier() {
    let (_tmp, config_path) = setup_test_env();
    run_catalog(&config_path, &["init"]);
    add(&config_path, "jacket", "fashion", "jacket.jpg");
    add(&config_path, "used iPhone 16e", "phone", "phone.jpg");

    let (stdout, _, success) = run_catalog(&config_path, &["get", "2"]);
    assert!(success);
    assert!(stdout.contains("used iPhone 16e"));
    assert!(stdout.contains("category:   phone"));

    let (_, stderr, success) = run_catalog(&config_path, &["get", "99"]);
    assert!(!success, "missing item should fail");
    assert!(stderr.contains("not found"), "stderr={}", stderr);

    let (_, stderr, success) = run_catalog(&config_path, &["get", "abc"]);
    assert!(!success);
    assert!(stderr.contains("invalid input"), "stderr={}", stderr);
}

#[test]
fn test_search() {
    let (_tmp, config_path) = setup_test_env();
    run_catalog(&config_path, &["init"]);
    add(&config_path, "jacket", "fashion", "jacket.jpg");
    add(&config_path, "used iPhone 16e", "phone", "phone.jpg");

    let (stdout, _, success) = run_catalog(&config_path, &["search", "iPhone"]);
    assert!(success);
    assert!(stdout.contains("used iPhone 16e"));
    assert!(!stdout.contains("jacket"));

    let (_, stderr, success) = run_catalog(&config_path, &["search", "zzz-no-match"]);
    assert!(!success, "a search with no matches is an error");
    assert!(stderr.contains("not found"), "stderr={}", stderr);
}

#[test]
fn test_categories_and_filtered_list() {
    let (_tmp, config_path) = setup_test_env();
    run_catalog(&config_path, &["init"]);
    add(&config_path, "jacket", "fashion", "jacket.jpg");
    add(&config_path, "scarf", "fashion", "jacket.jpg");
    add(&config_path, "used iPhone 16e", "phone", "phone.jpg");

    let (stdout, _, success) = run_catalog(&config_path, &["categories"]);
    assert!(success);
    assert_eq!(stdout.matches("fashion").count(), 1);
    assert!(stdout.contains("phone"));

    let (stdout, _, success) = run_catalog(&config_path, &["list", "--category", "fashion"]);
    assert!(success);
    assert!(stdout.contains("scarf"));
    assert!(!stdout.contains("iPhone"));
}

#[test]
fn test_add_requires_name() {
    let (_tmp, config_path) = setup_test_env();
    run_catalog(&config_path, &["init"]);

    let image = photo(&config_path, "jacket.jpg");
    let (_, stderr, success) = run_catalog(&config_path, &["add", "", "fashion", "--image", &image]);
    assert!(!success);
    assert!(stderr.contains("name is required"), "stderr={}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_catalog(&tmp.path().join("nope.toml"), &["list"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
