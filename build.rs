// ohttp-rs: oblivious HTTP encapsulation core
// Copyright 2025 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

fn main() {
    #[cfg(feature = "ffi")]
    generate_header();
}

// generate_header writes the C declarations of the boundary functions into
// include/darkbio_ohttp.h.
#[cfg(feature = "ffi")]
fn generate_header() {
    use std::{env, fs, path::PathBuf};

    println!("cargo:rerun-if-changed=src/ffi");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir unset"));
    let include_dir = crate_dir.join("include");
    fs::create_dir_all(&include_dir).expect("failed to create include dir");

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        documentation_style: cbindgen::DocumentationStyle::C99,
        cpp_compat: true,
        usize_is_size_t: true,
        include_guard: Some("DARKBIO_OHTTP_H".to_owned()),
        ..Default::default()
    };
    cbindgen::generate_with_config(&crate_dir, config)
        .expect("failed to generate C header")
        .write_to_file(include_dir.join("darkbio_ohttp.h"));
}
