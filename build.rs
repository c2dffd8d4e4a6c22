use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 使用内置的 protoc，避免依赖系统安装
    let protoc = protoc_bin_vendored::protoc_bin_path().map_err(|e| format!("{e:?}"))?;
    let well_known = protoc_bin_vendored::include_path().map_err(|e| format!("{e:?}"))?;
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    println!("cargo:rerun-if-changed=proto/store/v1/store.proto");

    let mut config = prost_build::Config::new();
    config
        .protoc_executable(protoc)
        // 供 gRPC reflection 使用
        .file_descriptor_set_path(out_dir.join("store_descriptor.bin"));

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_with_config(
            config,
            &[PathBuf::from("proto/store/v1/store.proto")],
            &[PathBuf::from("proto"), well_known],
        )?;

    Ok(())
}
