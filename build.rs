use std::env;
use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_FFI").is_none() {
        return;
    }

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => dir,
        Err(_) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set; skipping header generation");
            return;
        }
    };

    // 生成 C 头文件
    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("SECRAND_H")
        .with_documentation(true)
        .generate();

    let bindings = match bindings {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=cbindgen generation failed: {}", e);
            return;
        }
    };

    let header_path = Path::new(&crate_dir).join("include/secrand.h");
    if let Some(parent) = header_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            println!("cargo:warning=Failed to create include/ directory: {}", e);
            return;
        }
    }

    if !bindings.write_to_file(&header_path) {
        println!("cargo:warning=secrand.h unchanged");
    }
}
