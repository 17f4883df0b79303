fn main() {
    println!("cargo:rerun-if-env-changed=IRRIGATOR_CONFIG_JSON");

    // Host builds (tests, simulation) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
