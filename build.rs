use std::env;

fn main() {
    // Low power defaults baked into the firmware, overridable from the
    // environment at build time

    // Allowed-mode bitmap (hex, default: every mode)
    if let Ok(allowed) = env::var("LPM_ALLOWED_MODES") {
        println!("cargo:rustc-env=LPM_ALLOWED_MODES={}", allowed);
        println!(
            "cargo:warning=Using LPM_ALLOWED_MODES from environment: {}",
            allowed
        );
    } else {
        println!("cargo:rustc-env=LPM_ALLOWED_MODES=0x0F");
    }

    // Retention record magic word (hex, default: "LPM1")
    if let Ok(magic) = env::var("LPM_RETENTION_MAGIC") {
        println!("cargo:rustc-env=LPM_RETENTION_MAGIC={}", magic);
        println!(
            "cargo:warning=Using LPM_RETENTION_MAGIC from environment: {}",
            magic
        );
    } else {
        println!("cargo:rustc-env=LPM_RETENTION_MAGIC=0x4C504D31");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=LPM_ALLOWED_MODES");
    println!("cargo:rerun-if-env-changed=LPM_RETENTION_MAGIC");
}
