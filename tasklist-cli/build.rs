use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct Manifest {
    package: Package,
}

#[derive(Deserialize)]
struct Package {
    metadata: Metadata,
}

#[derive(Deserialize)]
struct Metadata {
    tasklist: TasklistMetadata,
}

#[derive(Deserialize)]
struct TasklistMetadata {
    codename: String,
}

fn main() {
    let toml_str = fs::read_to_string("Cargo.toml").expect("Failed to read Cargo.toml");
    let manifest: Manifest = toml::from_str(&toml_str).expect("Failed to parse Cargo.toml");

    println!(
        "cargo:rustc-env=CODENAME={}",
        manifest.package.metadata.tasklist.codename
    );
    println!("cargo:rerun-if-changed=Cargo.toml");
}
