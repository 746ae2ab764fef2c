use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// target/<profile>, found by walking up from OUT_DIR
fn profile_dir() -> Option<PathBuf> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").ok()?);
    let profile = env::var("PROFILE").ok()?;
    out_dir
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}

fn copy_file(source: &Path, dest: &Path) {
    match fs::copy(source, dest) {
        Ok(_) => println!("cargo:warning=Copied {} to {}", source.display(), dest.display()),
        Err(e) => println!("cargo:warning=Cannot copy {}: {}", source.display(), e),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");
    println!("cargo:rerun-if-changed=../../migrations");

    let Some(target_dir) = profile_dir() else {
        println!("cargo:warning=Target profile directory not found, config.toml not copied");
        return;
    };
    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");

    let config = workspace_root.join("config.toml");
    if config.exists() {
        copy_file(&config, &target_dir.join("config.toml"));
    } else {
        println!("cargo:warning=config.toml not found at {:?}, using embedded defaults", config);
    }

    // migrations/ next to the binary, for the runner's first candidate path
    let migrations = workspace_root.join("migrations");
    let Ok(entries) = fs::read_dir(&migrations) else {
        return;
    };
    let dest = target_dir.join("migrations");
    if let Err(e) = fs::create_dir_all(&dest) {
        println!("cargo:warning=Cannot create {}: {}", dest.display(), e);
        return;
    }
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "sql") {
            copy_file(&path, &dest.join(entry.file_name()));
        }
    }
}
