use std::env;
use std::path::Path;

fn main() {
    let out_dir = env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo");
    let output = Path::new(&out_dir).join("commands.rs");
    vk_dispatch_build::generate_for_cargo("commands.toml", output)
        .expect("Failed to generate dispatch commands");
}
