use std::env::vars;

use dotenvy::dotenv;

fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-env-changed=WARMWATCH_CONFIG");

    // Values from `.env` become compile-time defaults, see `option_env!` in main.rs
    let _ = dotenv();

    for (k, v,) in vars().filter(|(k, _,)| k.starts_with("WARMWATCH_",),) {
        println!("cargo:rustc-env={k}={v}");
    }
}
