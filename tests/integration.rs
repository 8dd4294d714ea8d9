use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn slashed(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Write a config into `temp` that reads models from `models` and writes
/// below `temp/out`.
fn write_config(temp: &TempDir, models: &Path, extra: &str) -> PathBuf {
    let config = format!(
        r#"{extra}
[project]
model_package = "com.test.model"
rest_package = "com.test.rest"

[output]
path = "out"
cache_file = ".qbe-cache.json"

[[sources]]
type = "directory"
path = "{}"
"#,
        slashed(models),
    );

    let config_path = temp.path().join("qbe.config.toml");
    fs::write(&config_path, &config).unwrap();
    config_path
}

fn run(config_path: &Path, extra_args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_qbe-gen"))
        .arg("-c")
        .arg(config_path)
        .args(extra_args)
        .output()
        .expect("Failed to run qbe-gen")
}

fn read_generated(temp: &TempDir, entity: &str) -> String {
    let path = temp
        .path()
        .join("out/com/test/rest")
        .join(format!("{}SearchPredicates.java", entity));
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing {:?}: {}", path, e))
}

#[test]
fn test_end_to_end_generation() {
    let fixtures = project_root().join("tests/fixtures/petclinic");
    let temp = TempDir::new().unwrap();
    let config_path = write_config(&temp, &fixtures, "");

    let output = run(&config_path, &[]);
    assert!(
        output.status.success(),
        "qbe-gen failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Owner: every string field is searchable, dates and collections are not
    let owner = read_generated(&temp, "Owner");
    assert!(owner.contains("package com.test.rest;"));
    assert!(owner.contains("public class OwnerSearchPredicates"));
    assert!(owner.contains("import com.test.model.Owner;"));
    assert!(owner.contains("      String firstName = search.getFirstName();\n"));
    assert!(owner.contains(
        "      if (firstName != null && !\"\".equals(firstName))\n      {\n         predicatesList.add(builder.like(root.<String>get(\"firstName\"), '%' + firstName + '%'));\n      }\n"
    ));
    assert!(owner.contains("String homePage = search.getHomePage();"));
    assert!(!owner.contains("birthday"));
    assert!(!owner.contains("pets"));
    assert!(!owner.contains("getId()"));
    assert!(!owner.contains("getVersion()"));

    // Vet: int uses a zero check
    let vet = read_generated(&temp, "Vet");
    assert!(vet.contains("      int specialty = search.getSpecialty();\n      if (specialty != 0)\n"));
    assert!(!vet.contains("employedSince"));

    // Pet: boolean, int and a many-to-one reference
    let pet = read_generated(&temp, "Pet");
    assert!(pet.contains("      if (sendReminders)\n"));
    assert!(pet.contains("predicatesList.add(builder.equal(root.get(\"type\"), type));"));
    assert!(pet.contains("      Owner owner = search.getOwner();\n      if (owner != null && owner.getId() != null)\n"));
    assert!(!pet.contains("weight"));

    // Visit: two references, each imported once
    let visit = read_generated(&temp, "Visit");
    assert_eq!(visit.matches("import com.test.model.Pet;").count(), 1);
    assert_eq!(visit.matches("import com.test.model.Vet;").count(), 1);
    assert!(visit.contains("Vet vet = search.getVet();"));

    assert!(temp.path().join(".qbe-cache.json").exists());
}

#[test]
fn test_second_run_uses_cache_and_force_regenerates() {
    let fixtures = project_root().join("tests/fixtures/petclinic");
    let temp = TempDir::new().unwrap();
    let config_path = write_config(&temp, &fixtures, "");

    let first = run(&config_path, &[]);
    assert!(first.status.success());
    let before = read_generated(&temp, "Pet");

    let second = run(&config_path, &[]);
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Cached: 4, Updated: 0"), "{}", stdout);

    let forced = run(&config_path, &["--force"]);
    assert!(forced.status.success());
    let stdout = String::from_utf8_lossy(&forced.stdout);
    assert!(stdout.contains("Cached: 0, Updated: 4"), "{}", stdout);

    // Same model, same bytes
    assert_eq!(read_generated(&temp, "Pet"), before);
}

#[test]
fn test_unresolvable_reference_fails_run() {
    let temp = TempDir::new().unwrap();
    let models = temp.path().join("model");
    fs::create_dir(&models).unwrap();
    fs::write(
        models.join("visit.toml"),
        r#"
name = "Visit"

[[fields]]
name = "clinic"
kind = "manyToOne"
type = "com.test.model.Clinic"
"#,
    )
    .unwrap();
    let config_path = write_config(&temp, &models, "");

    let output = run(&config_path, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot resolve type 'com.test.model.Clinic'"), "{}", stderr);
}

#[test]
fn test_inline_entities_and_custom_hidden_fields() {
    let temp = TempDir::new().unwrap();
    let models = temp.path().join("model");
    fs::create_dir(&models).unwrap();

    let extra = r#"hidden_fields = ["^id$", "^internal"]
"#;
    let config_path = write_config(&temp, &models, extra);
    let mut config = fs::read_to_string(&config_path).unwrap();
    config.push_str(
        r#"
[[entities]]
name = "Clinic"

[[entities.fields]]
name = "name"
kind = "string"

[[entities.fields]]
name = "internalCode"
kind = "string"

[[entities.fields]]
name = "open"
kind = "boolean"
hidden = true
"#,
    );
    fs::write(&config_path, config).unwrap();

    let output = run(&config_path, &[]);
    assert!(
        output.status.success(),
        "qbe-gen failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let clinic = read_generated(&temp, "Clinic");
    assert!(clinic.contains("String name = search.getName();"));
    assert!(!clinic.contains("internalCode"));
    assert!(!clinic.contains("boolean open"));
    // version is no longer hidden by the custom patterns
    assert!(clinic.contains("int version = search.getVersion();"));
}
