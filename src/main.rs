use anyhow::{Context, Result};
use clap::Parser;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use qbe_gen::cache::Cache;
use qbe_gen::config::{Config, SourceConfig};
use qbe_gen::generator::{GeneratedFile, JavaGenerator};
use qbe_gen::inspector::{Inspector, TypeResolver};
use qbe_gen::model::{self, EntityInfo, ModelLoader};
use qbe_gen::scanner;
use qbe_gen::type_mapper::TypeMapper;

#[derive(Parser)]
#[command(name = "qbe-gen")]
#[command(about = "Query-by-example search predicate generator for JPA entity models")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "qbe.config.toml")]
    config: PathBuf,

    /// Force regenerate all entities (ignore cache)
    #[arg(short, long)]
    force: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Watch mode: monitor model files for changes and regenerate
    #[arg(short, long)]
    watch: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Directory relative paths in the config resolve against. A bare file name
/// such as the default `qbe.config.toml` has an empty parent, which means
/// the current directory.
fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Entity model files named by the `[[sources]]` tables.
fn collect_model_files(config: &Config, project_root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for source in &config.sources {
        match source {
            SourceConfig::Directory { path } => {
                let resolved = resolve_path(project_root, path);
                if !resolved.exists() {
                    anyhow::bail!("Source directory not found: {:?}", resolved);
                }
                if !resolved.is_dir() {
                    anyhow::bail!("Source path is not a directory: {:?}", resolved);
                }
                files.extend(scanner::scan_directory(&resolved)?);
            }
            SourceConfig::File { path } => {
                let resolved = resolve_path(project_root, path);
                if !resolved.exists() {
                    anyhow::bail!("Source file not found: {:?}", resolved);
                }
                if !resolved.is_file() {
                    anyhow::bail!("Source path is not a file: {:?}", resolved);
                }
                files.push(resolved);
            }
            SourceConfig::Glob { pattern } => {
                let resolved_pattern = if Path::new(pattern).is_absolute() {
                    pattern.clone()
                } else {
                    project_root.join(pattern).to_string_lossy().to_string()
                };
                files.extend(scanner::expand_glob(&resolved_pattern)?);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Run the generation process once
fn run_generation(cli: &Cli) -> Result<()> {
    let start = Instant::now();

    let config_content = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config {:?}", cli.config))?;
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    let project_root = project_root(&cli.config);

    println!("Query-by-Example Generator v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "=".repeat(50));

    let type_mapper = TypeMapper::new(&config.type_mappings);
    let inspector = Inspector::new(&type_mapper, &config.hidden_fields)
        .context("Invalid hidden_fields pattern")?;

    let cache_path = resolve_path(&project_root, &config.output.cache_file);
    let mut cache = if cli.force {
        println!("[Force mode] Ignoring cache, regenerating all entities...");
        Cache::new()
    } else {
        Cache::load(&cache_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to read cache {:?}: {}", cache_path, e);
            Cache::new()
        })
    };

    println!("\n[1/4] Scanning sources...");
    let model_files = collect_model_files(&config, &project_root)?;
    println!(
        "  Found {} model files, {} inline entities",
        model_files.len(),
        config.entities.len()
    );

    println!("\n[2/4] Loading entity models...");
    let loader = ModelLoader::new(&config.project.model_package);

    let mut entities: Vec<EntityInfo> = model_files
        .par_iter()
        .map(|path| {
            loader
                .load_file(path)
                .with_context(|| format!("Failed to load entity model {:?}", path))
        })
        .collect::<Result<Vec<_>>>()?;

    let config_hash = model::compute_hash(&config_content);
    let config_source = cli.config.to_string_lossy().to_string();
    for def in &config.entities {
        let entity = loader
            .resolve(def.clone(), &config_source, &config_hash)
            .with_context(|| format!("Invalid inline entity '{}'", def.name))?;
        entities.push(entity);
    }

    model::check_unique(&entities)?;
    entities.sort_by(|a, b| a.name.cmp(&b.name));
    println!("  Loaded {} entities", entities.len());

    let resolver = TypeResolver::with_entities(&entities);
    let generator = JavaGenerator::new(
        &inspector,
        &resolver,
        &config.project.rest_package,
        config.output.indent,
    );
    let output_root = resolve_path(&project_root, &config.output.path);

    // Output depends on the model file, the output settings and which
    // entities exist (references are resolved against them)
    let catalog: Vec<String> = entities.iter().map(|e| e.qualified_name()).collect();
    let shared = format!("{}|{}", config.fingerprint(), catalog.join(","));

    println!("\n[3/4] Checking cache...");
    let mut unchanged = 0;
    let mut stale: Vec<(&EntityInfo, String)> = Vec::new();

    for entity in &entities {
        let hash = Cache::entry_hash(&entity.file_hash, &shared);
        let output_exists = cache
            .get_entry(&entity.name)
            .map(|e| output_root.join(&e.output).exists())
            .unwrap_or(false);

        if cache.is_valid(&entity.name, &hash) && output_exists {
            unchanged += 1;
            if cli.verbose {
                println!("  [cached] {}", entity.name);
            }
        } else {
            if cli.verbose {
                println!("  [update] {}", entity.name);
            }
            stale.push((entity, hash));
        }
    }
    println!("  Cached: {}, Updated: {}", unchanged, stale.len());

    println!("\n[4/4] Generating Java...");
    let generated: Vec<(&EntityInfo, String, GeneratedFile)> = stale
        .into_par_iter()
        .map(|(entity, hash)| {
            generator
                .generate(entity)
                .map(|file| (entity, hash, file))
                .with_context(|| format!("Failed to generate search predicates for '{}'", entity.name))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut files_written = 0;
    for (entity, hash, file) in &generated {
        let resolved_path = output_root.join(&file.relative_path);
        let should_write = if resolved_path.exists() {
            let existing = std::fs::read_to_string(&resolved_path)?;
            existing != file.content
        } else {
            true
        };

        if should_write {
            if let Some(parent) = resolved_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&resolved_path, &file.content)
                .with_context(|| format!("Failed to write {:?}", resolved_path))?;
            println!("  Written {:?}", resolved_path);
            files_written += 1;
        } else {
            tracing::info!("No changes for {:?}", resolved_path);
        }

        cache.set_entry(
            &entity.name,
            &entity.source_file,
            hash,
            &file.relative_path.to_string_lossy().replace('\\', "/"),
        );
    }

    if files_written == 0 {
        println!("  No changes, skipping all writes");
    }

    let live: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    cache.retain_entities(&live);
    cache.save(&cache_path)?;

    let elapsed = start.elapsed();
    println!("\n{}", "=".repeat(50));
    println!(
        "Done! Generated {} of {} entities ({} file(s) written) in {:?}",
        generated.len(),
        entities.len(),
        files_written,
        elapsed
    );

    Ok(())
}

/// Directories whose `.toml` files feed the generator, plus the config's own.
fn watch_paths(config: &Config, project_root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![project_root.to_path_buf()];
    for source in &config.sources {
        match source {
            SourceConfig::Directory { path } => paths.push(resolve_path(project_root, path)),
            SourceConfig::File { path } => {
                if let Some(parent) = resolve_path(project_root, path).parent() {
                    paths.push(parent.to_path_buf());
                }
            }
            SourceConfig::Glob { pattern } => {
                let resolved_pattern = if Path::new(pattern).is_absolute() {
                    pattern.clone()
                } else {
                    project_root.join(pattern).to_string_lossy().to_string()
                };
                if let Ok(files) = scanner::expand_glob(&resolved_pattern) {
                    for file in files {
                        if let Some(parent) = file.parent() {
                            paths.push(parent.to_path_buf());
                        }
                    }
                }
            }
        }
    }

    paths.sort();
    paths.dedup();
    paths.retain(|p| p.exists());
    paths
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Run generation once if not in watch mode
    if !cli.watch {
        run_generation(&cli)?;
        return Ok(());
    }

    // Watch mode: monitor model files for changes and regenerate
    if let Err(e) = run_generation(&cli) {
        eprintln!("Error during generation: {:#}", e);
    }

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    let watch_paths = watch_paths(&config, &project_root(&cli.config));
    if watch_paths.is_empty() {
        println!("No valid paths to watch. Exiting.");
        return Ok(());
    }

    println!("\nWatch mode enabled. Monitoring for changes...");
    println!("Press Ctrl+C to stop.\n");
    println!("Watching paths:");
    for path in &watch_paths {
        println!("  {}", path.display());
    }
    println!();

    // Create channel for file system events
    let (tx, rx) = channel();

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    tracing::error!("Failed to send file event: {}", e);
                }
            }
        },
        notify::Config::default(),
    )?;

    for path in &watch_paths {
        watcher.watch(path, RecursiveMode::Recursive)?;
    }

    // Debounce delay (in milliseconds)
    const DEBOUNCE_MS: u64 = 300;

    let mut last_change_time = Instant::now();
    let mut pending_generation = false;

    loop {
        if let Ok(event) = rx.recv_timeout(Duration::from_millis(100)) {
            if matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
            ) && event.paths.iter().any(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext == "toml")
                    .unwrap_or(false)
            }) {
                pending_generation = true;
                last_change_time = Instant::now();
            }
        }

        if pending_generation && last_change_time.elapsed() >= Duration::from_millis(DEBOUNCE_MS) {
            println!("\nChanges detected, regenerating...");
            if let Err(e) = run_generation(&cli) {
                eprintln!("Error during generation: {:#}", e);
            }
            println!("\nWatching for changes (press Ctrl+C to stop)...\n");
            pending_generation = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_with_sources(sources: &str) -> Config {
        let toml_str = format!("[project]\n\n[output]\npath = \"out\"\n{}", sources);
        toml::from_str(&toml_str).unwrap()
    }

    #[test]
    fn test_project_root_of_bare_config_name_is_current_dir() {
        assert_eq!(project_root(Path::new("qbe.config.toml")), PathBuf::from("."));
        assert_eq!(
            project_root(Path::new("clinic/qbe.config.toml")),
            PathBuf::from("clinic")
        );
    }

    #[test]
    fn test_default_config_location_is_watched_without_sources() {
        let config = config_with_sources("");
        let root = project_root(Path::new("qbe.config.toml"));

        assert_eq!(watch_paths(&config, &root), vec![PathBuf::from(".")]);
    }

    #[test]
    fn test_watch_paths_cover_model_sources() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("model")).unwrap();
        fs::create_dir(dir.path().join("extra")).unwrap();
        fs::write(dir.path().join("extra/vet.toml"), "name = \"Vet\"").unwrap();

        let config = config_with_sources(
            r#"
[[sources]]
type = "directory"
path = "model"

[[sources]]
type = "file"
path = "extra/vet.toml"

[[sources]]
type = "directory"
path = "missing"
"#,
        );

        let paths = watch_paths(&config, dir.path());
        assert_eq!(
            paths,
            vec![
                dir.path().to_path_buf(),
                dir.path().join("extra"),
                dir.path().join("model"),
            ]
        );
    }
}
