//! Generates the C header when the `headers` feature is enabled.

fn main() {
    println!("cargo:rerun-if-changed=src/ffi");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    #[cfg(feature = "headers")]
    generate_header();
}

#[cfg(feature = "headers")]
fn generate_header() {
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let config = cbindgen::Config::from_file(format!("{crate_dir}/cbindgen.toml")).unwrap_or_default();
    match cbindgen::generate_with_config(&crate_dir, config) {
        Ok(bindings) => {
            bindings.write_to_file(format!("{crate_dir}/include/blas_workspace.h"));
        }
        Err(e) => println!("cargo:warning=header generation failed: {e}"),
    }
}
