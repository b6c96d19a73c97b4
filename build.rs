use vergen::{BuildBuilder, Emitter};

// VERGEN_BUILD_TIMESTAMP is logged on startup, a failing emitter only loses that line.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    let Ok(build) = BuildBuilder::default().build_timestamp(true).build() else {
        return;
    };
    if let Ok(emitter) = Emitter::default().add_instructions(&build) {
        let _ = emitter.emit();
    }
}
