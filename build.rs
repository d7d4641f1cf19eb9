use std::process::Command;

fn main() {
    // pyo3's build script resolves the interpreter; the proxy library also
    // needs libpython on the linker search path because it embeds CPython
    // instead of being loaded by it.
    println!("cargo:rerun-if-env-changed=PYO3_PYTHON");

    let python = std::env::var("PYO3_PYTHON").unwrap_or_else(|_| "python3".to_string());

    if let Ok(output) = Command::new(&python).args(["--version"]).output() {
        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:warning=Embedding {}", version.trim());
        }
    }

    if let Ok(output) = Command::new(&python)
        .args([
            "-c",
            "import sysconfig; print(sysconfig.get_config_var('LIBDIR'))",
        ])
        .output()
    {
        if output.status.success() {
            let libdir = String::from_utf8_lossy(&output.stdout);
            let libdir = libdir.trim();
            if !libdir.is_empty() && libdir != "None" {
                println!("cargo:rustc-link-search=native={libdir}");
                // Test and host binaries load the library from outside the
                // Python prefix, so record LIBDIR in the runtime search path.
                if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
                    println!("cargo:rustc-link-arg=-Wl,-rpath,{libdir}");
                }
            }
        }
    }
}
