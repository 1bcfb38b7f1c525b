fn main() {
    // Only the ESP-IDF build needs the sysenv exported by embuild; host
    // builds (tests, simulation binary) have nothing to generate.
    #[cfg(feature = "espidf")]
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
